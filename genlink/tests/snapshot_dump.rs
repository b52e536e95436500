// Snapshot tests: lock the textual unit dump used in diagnostics.
//
// Snapshots are managed by `insta` and stored under `genlink/tests/snapshots/`.
// Run `cargo insta review` after intentional output changes to update baselines.

use std::sync::Arc;

use genlink::binding::{BindingId, Signature, ValueType};
use genlink::builtins::builtin;
use genlink::naming::{NameAllocator, UnitCounter};
use genlink::registry::CallSiteBinder;
use genlink::unit::{dump, UnitDescriptor};

/// Private counter so the snapshots always show `_1`.
fn names() -> NameAllocator {
    NameAllocator::new().with_counter(Arc::new(UnitCounter::new()))
}

#[test]
fn snapshot_unit_dump() {
    let names = names();
    let mut binder = CallSiteBinder::new();
    let add = binder.bind(builtin("add_i64").unwrap());
    let concat = binder.bind(builtin("concat_str").unwrap());
    let not = binder.bind(builtin("not_bool").unwrap());

    use ValueType::*;
    let mut unit = UnitDescriptor::new(names.allocate("agg_sum", Some("v1")));
    unit.add_call_site("sum", Signature::new([I64, I64], I64), add);
    unit.add_call_site("label", Signature::new([Str, Str], Str), concat);
    unit.add_call_site("negate", Signature::new([Bool], Bool), not);
    unit.add_call_site("emit", Signature::new(Vec::new(), Unit), BindingId(99));

    insta::assert_snapshot!("unit_dump", dump(&unit));
}

#[test]
fn snapshot_empty_unit_dump() {
    let names = names();
    let unit = UnitDescriptor::new(names.allocate("op<T>", Some("leaf")));
    insta::assert_snapshot!("empty_unit_dump", dump(&unit));
}
