// naming.rs — Unique, identifier-safe names for generated units
//
// A generated unit is named `<namespace>.<base>_<suffix>_<counter>`, where the
// suffix defaults to the current UTC second and the counter is a strictly
// increasing 64-bit value. The counter alone carries uniqueness; base name and
// suffix only make names readable and sortable.
//
// Preconditions: none; `NameAllocator::with_config` validates its config.
// Postconditions: no two names from allocators sharing a counter are equal.
//   Allocators draw on one process-wide counter unless given another.
// Failure modes: `with_config` rejects an invalid config; `allocate` cannot fail.
// Side effects: advances the shared counter once per allocation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use crate::config::{ConfigError, NamingConfig};

// ── Character set ───────────────────────────────────────────────────────────

/// Characters allowed in the simple part of a generated name.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Replace every non-identifier character with `placeholder`.
///
/// One output character per input character, so the result has the same
/// `chars().count()` as the input. Idempotent as long as `placeholder` is
/// itself an identifier character.
pub fn sanitize(text: &str, placeholder: char) -> String {
    text.chars()
        .map(|c| if is_identifier_char(c) { c } else { placeholder })
        .collect()
}

// ── Generated name ──────────────────────────────────────────────────────────

/// Fully-qualified name of a generated unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratedName {
    full: String,
    namespace_len: usize,
}

impl GeneratedName {
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The namespace marker, without the trailing `.`.
    pub fn namespace(&self) -> &str {
        &self.full[..self.namespace_len]
    }

    /// The sanitized part after the namespace.
    pub fn simple_name(&self) -> &str {
        &self.full[self.namespace_len + 1..]
    }
}

impl fmt::Display for GeneratedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl AsRef<str> for GeneratedName {
    fn as_ref(&self) -> &str {
        &self.full
    }
}

// ── Counter ─────────────────────────────────────────────────────────────────

/// Process-lifetime unit counter. Never reset; values are never reused.
#[derive(Debug, Default)]
pub struct UnitCounter {
    last: AtomicU64,
}

impl UnitCounter {
    /// A counter independent of every other. Names are only unique among
    /// allocators sharing the same counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The counter shared by every allocator that is not given one
    /// explicitly. Created on first use, lives until process exit.
    pub fn process() -> Arc<UnitCounter> {
        static PROCESS: OnceLock<Arc<UnitCounter>> = OnceLock::new();
        Arc::clone(PROCESS.get_or_init(|| Arc::new(UnitCounter::new())))
    }

    /// Advance and return the new value. The first call returns 1.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// The most recently handed out value (0 before the first allocation).
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

// ── Clock ───────────────────────────────────────────────────────────────────

/// Source of the default suffix timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ── Allocator ───────────────────────────────────────────────────────────────

/// Allocates generated unit names. Every allocator draws on
/// `UnitCounter::process()` unless `with_counter` says otherwise, so
/// independently built allocators never hand out the same name.
#[derive(Clone)]
pub struct NameAllocator {
    counter: Arc<UnitCounter>,
    clock: Arc<dyn Clock>,
    config: NamingConfig,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameAllocator")
            .field("counter", &self.counter.current())
            .field("config", &self.config)
            .finish()
    }
}

impl NameAllocator {
    /// Allocator with the default config, drawing on the process counter.
    pub fn new() -> Self {
        Self::build(NamingConfig::default())
    }

    /// Allocator with `config`, drawing on the process counter. Rejects
    /// configs that could produce non-identifier names or fail to format
    /// the timestamp suffix.
    pub fn with_config(config: NamingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: NamingConfig) -> Self {
        NameAllocator {
            counter: UnitCounter::process(),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Draw on `counter` instead of the process counter.
    pub fn with_counter(mut self, counter: Arc<UnitCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn counter(&self) -> &Arc<UnitCounter> {
        &self.counter
    }

    pub fn config(&self) -> &NamingConfig {
        &self.config
    }

    /// Allocate a new name from `base` and an optional suffix. Without a
    /// suffix the current UTC second is used.
    pub fn allocate(&self, base: &str, suffix: Option<&str>) -> GeneratedName {
        let suffix = match suffix {
            Some(s) => s.to_string(),
            None => self
                .clock
                .now()
                .format(&self.config.timestamp_format)
                .to_string(),
        };
        let id = self.counter.next();
        let sep = self.config.separator;
        let raw = format!("{base}{sep}{suffix}{sep}{id}");
        let simple = sanitize(&raw, self.config.placeholder);

        let name = GeneratedName {
            full: format!("{}.{}", self.config.namespace, simple),
            namespace_len: self.config.namespace.len(),
        };
        tracing::debug!(name = %name, id, "allocated generated unit name");
        name
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
