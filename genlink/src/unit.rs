// unit.rs — Generated unit descriptors and loaded units
//
// A `UnitDescriptor` is what the code generator hands over once a unit is
// finished: its allocated name and the table of indirect call sites it
// emitted. Loading a descriptor against a binding registry yields a
// `LoadedUnit`, which owns one resolution gate per call site.
//
// Preconditions: every call site's binding id was issued by the binder whose
// registry the unit is loaded against.
// Postconditions: none (call sites resolve lazily).
// Failure modes: unknown call-site index; link or invocation errors.
// Side effects: `load` traces the unit dump.

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::binding::{BindingId, Signature, Value};
use crate::callsite::{CallError, CallSite, CallSiteState};
use crate::loader::{DynamicLoader, LoaderContext};
use crate::naming::GeneratedName;
use crate::registry::BindingRegistry;

// ── Descriptor ──────────────────────────────────────────────────────────────

/// One indirect call site as emitted by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSiteDescriptor {
    pub name: String,
    pub signature: Signature,
    pub binding_id: BindingId,
}

/// A finished generated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    pub name: GeneratedName,
    pub call_sites: Vec<CallSiteDescriptor>,
}

impl UnitDescriptor {
    pub fn new(name: GeneratedName) -> Self {
        UnitDescriptor {
            name,
            call_sites: Vec::new(),
        }
    }

    /// Append an indirect call site and return its index.
    pub fn add_call_site(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        binding_id: BindingId,
    ) -> usize {
        self.call_sites.push(CallSiteDescriptor {
            name: name.into(),
            signature,
            binding_id,
        });
        self.call_sites.len() - 1
    }
}

/// Textual dump of a unit for logs and diagnostics.
pub fn dump(unit: &UnitDescriptor) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "unit {} {{", unit.name);
    for (index, site) in unit.call_sites.iter().enumerate() {
        let _ = writeln!(
            buf,
            "    #{} {}{} -> binding {}",
            index, site.name, site.signature, site.binding_id
        );
    }
    buf.push('}');
    buf.push('\n');
    buf
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    NoSuchCallSite { unit: String, index: usize },
    Call { call_site: String, error: CallError },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::NoSuchCallSite { unit, index } => {
                write!(f, "unit '{}' has no call site #{}", unit, index)
            }
            UnitError::Call { call_site, error } => {
                write!(f, "call site '{}': {}", call_site, error)
            }
        }
    }
}

impl std::error::Error for UnitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnitError::NoSuchCallSite { .. } => None,
            UnitError::Call { error, .. } => Some(error),
        }
    }
}

// ── Loaded unit ─────────────────────────────────────────────────────────────

/// A generated unit loaded into the process, with its loader context and
/// its call sites in emission order.
pub struct LoadedUnit<L: LoaderContext = DynamicLoader> {
    descriptor: UnitDescriptor,
    loader: L,
    call_sites: Vec<CallSite>,
}

impl LoadedUnit<DynamicLoader> {
    /// Load `descriptor` with a dynamic loader owning `registry`.
    pub fn load(descriptor: UnitDescriptor, registry: Arc<BindingRegistry>) -> Self {
        let loader = DynamicLoader::new(descriptor.name.as_str(), registry);
        Self::with_loader(descriptor, loader)
    }
}

impl<L: LoaderContext> LoadedUnit<L> {
    /// Load `descriptor` through an arbitrary loader context.
    pub fn with_loader(descriptor: UnitDescriptor, loader: L) -> Self {
        tracing::trace!(loader = loader.loader_kind(), "loading unit\n{}", dump(&descriptor));
        let call_sites = descriptor
            .call_sites
            .iter()
            .map(|d| CallSite::new(d.name.clone(), d.signature.clone(), d.binding_id))
            .collect();
        LoadedUnit {
            descriptor,
            loader,
            call_sites,
        }
    }

    pub fn name(&self) -> &GeneratedName {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &UnitDescriptor {
        &self.descriptor
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn call_site(&self, index: usize) -> Option<&CallSite> {
        self.call_sites.get(index)
    }

    pub fn call_site_states(&self) -> Vec<CallSiteState> {
        self.call_sites.iter().map(CallSite::state).collect()
    }

    /// Execute call site `index` with `args`, linking it on first use.
    pub fn call(&self, index: usize, args: &[Value]) -> Result<Value, UnitError> {
        let site = self
            .call_sites
            .get(index)
            .ok_or_else(|| UnitError::NoSuchCallSite {
                unit: self.descriptor.name.to_string(),
                index,
            })?;
        site.invoke(&self.loader, args)
            .map_err(|error| UnitError::Call {
                call_site: site.name().to_string(),
                error,
            })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
