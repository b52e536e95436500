// registry.rs — Call-site binding registry
//
// The code generator hands targets to a `CallSiteBinder`, which assigns each
// one a binding id. `finish` freezes the table into a `BindingRegistry`, owned
// by the loader of the generated unit and shared read-only by every call-site
// resolution for the unit's lifetime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::binding::{BindingId, CallTarget, Signature};

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateBinding {
        id: BindingId,
        first: String,
        second: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateBinding { id, first, second } => write!(
                f,
                "duplicate binding {}: first bound to '{}', rebound to '{}'",
                id, first, second
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

// ── Binder ──────────────────────────────────────────────────────────────────

/// Generator-side builder for a unit's binding table.
#[derive(Debug, Default)]
pub struct CallSiteBinder {
    next_id: u64,
    bindings: HashMap<BindingId, CallTarget>,
}

impl CallSiteBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `target` under a fresh id. Ids are handed out in bind order,
    /// skipping any taken by `bind_with_id`.
    pub fn bind(&mut self, target: CallTarget) -> BindingId {
        let mut id = BindingId(self.next_id);
        while self.bindings.contains_key(&id) {
            id = BindingId(id.0 + 1);
        }
        self.next_id = id.0 + 1;
        self.bindings.insert(id, target);
        id
    }

    /// Bind `target` under an id chosen by the caller.
    pub fn bind_with_id(&mut self, id: BindingId, target: CallTarget) -> Result<(), RegistryError> {
        if let Some(first) = self.bindings.get(&id) {
            return Err(RegistryError::DuplicateBinding {
                id,
                first: first.name().to_string(),
                second: target.name().to_string(),
            });
        }
        self.bindings.insert(id, target);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Freeze the table. No binding can be added or changed afterwards.
    pub fn finish(self) -> Arc<BindingRegistry> {
        let registry = BindingRegistry {
            bindings: self.bindings,
        };
        tracing::debug!(
            bindings = registry.len(),
            fingerprint = %registry.fingerprint_hex(),
            "binding registry sealed"
        );
        Arc::new(registry)
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Immutable binding id → call target table of one loaded unit.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<BindingId, CallTarget>,
}

#[derive(Serialize)]
struct CanonicalBinding<'a> {
    id: BindingId,
    target: &'a str,
    signature: &'a Signature,
}

impl BindingRegistry {
    pub fn lookup(&self, id: BindingId) -> Option<&CallTarget> {
        self.bindings.get(&id)
    }

    /// Binding ids in ascending order.
    pub fn ids(&self) -> Vec<BindingId> {
        let mut ids: Vec<BindingId> = self.bindings.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Compact JSON of the table, ids ascending. Stable across runs and
    /// independent of hash map iteration order.
    pub fn canonical_json(&self) -> String {
        let entries: Vec<CanonicalBinding<'_>> = self
            .ids()
            .into_iter()
            .filter_map(|id| {
                self.bindings.get(&id).map(|t| CanonicalBinding {
                    id,
                    target: t.name(),
                    signature: t.signature(),
                })
            })
            .collect();
        // Serializing plain structs of strings and integers cannot fail.
        serde_json::to_string(&entries).unwrap_or_default()
    }

    /// SHA-256 of `canonical_json()`.
    pub fn fingerprint(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.canonical_json().as_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    pub fn fingerprint_hex(&self) -> String {
        bytes_to_hex(&self.fingerprint())
    }
}

fn bytes_to_hex(bytes: &[u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
    }
    s
}

// ── Tests ───────────────────────────────────────────────────────────────────
