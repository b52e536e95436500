// loader.rs — Loader contexts handed to the linkage bootstrap
//
// A loader context identifies which loaded unit a call site belongs to and,
// when the unit was loaded dynamically, exposes that unit's binding registry.
// Units loaded without a registry still get a context so the bootstrap can
// report the mismatch instead of guessing.

use std::sync::Arc;

use crate::registry::BindingRegistry;

/// Capability passed explicitly to the bootstrap on first execution of a
/// call site.
pub trait LoaderContext: Send + Sync {
    /// Name of the loader type, used in configuration errors.
    fn loader_kind(&self) -> &'static str;

    /// Name of the unit this context loaded.
    fn unit_name(&self) -> &str;

    /// The binding registry, if this loader carries one.
    fn binding_registry(&self) -> Option<&BindingRegistry>;
}

/// Loader for generated units. Owns the unit's binding registry for as long
/// as the unit stays loaded.
#[derive(Debug, Clone)]
pub struct DynamicLoader {
    unit: String,
    registry: Arc<BindingRegistry>,
}

impl DynamicLoader {
    pub const KIND: &'static str = "DynamicLoader";

    pub fn new(unit: impl Into<String>, registry: Arc<BindingRegistry>) -> Self {
        DynamicLoader {
            unit: unit.into(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }
}

impl LoaderContext for DynamicLoader {
    fn loader_kind(&self) -> &'static str {
        Self::KIND
    }

    fn unit_name(&self) -> &str {
        &self.unit
    }

    fn binding_registry(&self) -> Option<&BindingRegistry> {
        Some(&self.registry)
    }
}

/// Loader for units linked ahead of time. Carries no binding registry, so
/// indirect call sites in its units cannot be bootstrapped.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    unit: String,
}

impl StaticLoader {
    pub const KIND: &'static str = "StaticLoader";

    pub fn new(unit: impl Into<String>) -> Self {
        StaticLoader { unit: unit.into() }
    }
}

impl LoaderContext for StaticLoader {
    fn loader_kind(&self) -> &'static str {
        Self::KIND
    }

    fn unit_name(&self) -> &str {
        &self.unit
    }

    fn binding_registry(&self) -> Option<&BindingRegistry> {
        None
    }
}
