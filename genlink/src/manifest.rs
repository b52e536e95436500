// manifest.rs — JSON link manifests
//
// A manifest describes one generated unit end to end: the base name to
// allocate, which builtin operator each binding id refers to, and the call
// sites to execute with their literal arguments. The CLI builds a binding
// registry and a unit descriptor from it.
//
// Preconditions: none.
// Postconditions: `build` returns a sealed registry and a descriptor whose
// call sites reference only the manifest's binding ids (dangling ids are
// kept; they fail at link time, not at build time).
// Failure modes: I/O, malformed JSON, unknown builtin, bad argument literal,
// duplicate binding id.
// Side effects: `load` reads one file; `build` advances the name counter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::binding::{BindingId, Signature, Value, ValueType};
use crate::builtins::builtin;
use crate::naming::NameAllocator;
use crate::registry::{BindingRegistry, CallSiteBinder, RegistryError};
use crate::unit::UnitDescriptor;

// ── Schema ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkManifest {
    pub unit: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
    #[serde(default)]
    pub call_sites: Vec<CallSiteEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingEntry {
    pub id: BindingId,
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallSiteEntry {
    pub name: String,
    pub binding: BindingId,
    pub signature: Signature,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

/// A manifest turned into runtime objects.
pub struct LinkPlan {
    pub unit: UnitDescriptor,
    pub registry: Arc<BindingRegistry>,
    /// Arguments per call site, in call-site order.
    pub args: Vec<Vec<Value>>,
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ManifestError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    UnknownTarget {
        id: BindingId,
        target: String,
    },
    BadArgument {
        call_site: String,
        index: usize,
        expected: ValueType,
        found: String,
    },
    Registry(RegistryError),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ManifestError::Parse(e) => write!(f, "invalid link manifest: {}", e),
            ManifestError::UnknownTarget { id, target } => {
                write!(f, "binding {}: unknown builtin '{}'", id, target)
            }
            ManifestError::BadArgument {
                call_site,
                index,
                expected,
                found,
            } => write!(
                f,
                "call site '{}' argument {}: expected {} literal, found {}",
                call_site, index, expected, found
            ),
            ManifestError::Registry(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io { source, .. } => Some(source),
            ManifestError::Parse(e) => Some(e),
            ManifestError::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for ManifestError {
    fn from(e: RegistryError) -> Self {
        ManifestError::Registry(e)
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

impl LinkManifest {
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(ManifestError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Allocate the unit name, seal the registry and convert argument
    /// literals.
    pub fn build(&self, names: &NameAllocator) -> Result<LinkPlan, ManifestError> {
        let mut binder = CallSiteBinder::new();
        for entry in &self.bindings {
            let target = builtin(&entry.target).ok_or_else(|| ManifestError::UnknownTarget {
                id: entry.id,
                target: entry.target.clone(),
            })?;
            binder.bind_with_id(entry.id, target)?;
        }

        let name = names.allocate(&self.unit, self.suffix.as_deref());
        let mut unit = UnitDescriptor::new(name);
        let mut args = Vec::with_capacity(self.call_sites.len());
        for site in &self.call_sites {
            unit.add_call_site(site.name.clone(), site.signature.clone(), site.binding);
            args.push(convert_args(site)?);
        }

        Ok(LinkPlan {
            unit,
            registry: binder.finish(),
            args,
        })
    }
}

fn convert_args(site: &CallSiteEntry) -> Result<Vec<Value>, ManifestError> {
    // Extra or missing arguments are left for the invocation arity check.
    site.args
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let expected = site.signature.params.get(index).copied();
            let value = match (expected, raw) {
                (Some(ValueType::I64), serde_json::Value::Number(n)) => n.as_i64().map(Value::I64),
                (Some(ValueType::F64), serde_json::Value::Number(n)) => n.as_f64().map(Value::F64),
                (Some(ValueType::Bool), serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
                (Some(ValueType::Str), serde_json::Value::String(s)) => Some(Value::Str(s.clone())),
                (Some(ValueType::Unit), serde_json::Value::Null) => Some(Value::Unit),
                (None, raw) => json_to_value(raw),
                _ => None,
            };
            value.ok_or_else(|| ManifestError::BadArgument {
                call_site: site.name.clone(),
                index,
                expected: expected.unwrap_or(ValueType::Unit),
                found: raw.to_string(),
            })
        })
        .collect()
}

/// Best-effort conversion for arguments beyond the declared signature.
fn json_to_value(raw: &serde_json::Value) -> Option<Value> {
    match raw {
        serde_json::Value::Null => Some(Value::Unit),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::I64)
            .or_else(|| n.as_f64().map(Value::F64)),
        serde_json::Value::String(s) => Some(Value::Str(s.clone())),
        _ => None,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
