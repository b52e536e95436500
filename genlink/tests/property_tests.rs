// Property-based tests for naming invariants.
//
// Two categories:
// 1. Sanitizer: length preservation, idempotence, output character set
// 2. Allocation: names from concurrent callers are pairwise distinct
//
// Uses proptest with explicit configuration to prevent CI flakiness.

use std::collections::HashSet;

use chrono::TimeZone;
use genlink::config::NamingConfig;
use genlink::naming::{is_identifier_char, sanitize, FixedClock, NameAllocator};
use proptest::prelude::*;

fn placeholder() -> impl Strategy<Value = char> {
    prop_oneof![Just('_'), Just('$'), Just('x'), Just('0')]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn sanitize_preserves_length(s in any::<String>(), p in placeholder()) {
        prop_assert_eq!(sanitize(&s, p).chars().count(), s.chars().count());
    }

    #[test]
    fn sanitize_is_idempotent(s in any::<String>(), p in placeholder()) {
        let once = sanitize(&s, p);
        prop_assert_eq!(sanitize(&once, p), once.clone());
    }

    #[test]
    fn sanitize_keeps_valid_and_replaces_invalid(s in any::<String>()) {
        let out = sanitize(&s, '_');
        for (a, b) in s.chars().zip(out.chars()) {
            if is_identifier_char(a) {
                prop_assert_eq!(a, b);
            } else {
                prop_assert_eq!(b, '_');
            }
        }
    }

    #[test]
    fn simple_name_is_identifier_safe(base in any::<String>(), suffix in proptest::option::of(any::<String>())) {
        let names = NameAllocator::new();
        let name = names.allocate(&base, suffix.as_deref());
        prop_assert!(name.simple_name().chars().all(is_identifier_char));
        prop_assert!(name.as_str().starts_with("genlink.$gen."));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn concurrent_names_are_distinct(
        threads in 1usize..8,
        per_thread in 1usize..64,
        base in "[a-z_]{0,8}",
    ) {
        let clock = FixedClock(chrono::Utc.timestamp_opt(0, 0).unwrap());
        let names = NameAllocator::with_config(NamingConfig::default())
            .unwrap()
            .with_clock(clock);

        let all: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let names = names.clone();
                    let base = base.clone();
                    s.spawn(move || {
                        (0..per_thread)
                            .map(|_| names.allocate(&base, None).to_string())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let distinct: HashSet<&String> = all.iter().collect();
        prop_assert_eq!(distinct.len(), threads * per_thread);
    }
}
