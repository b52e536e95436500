// bootstrap.rs — Linkage bootstrap for indirect call sites
//
// The well-known entry point generated code calls the first time an indirect
// call site runs. It resolves the site's binding id against the registry of
// the unit's loader and returns a constant call target the execution
// environment caches for the rest of the site's life.
//
// Preconditions: the loader context carries a binding registry.
// Postconditions: the returned target is the one registered under the id.
// Failure modes: Configuration (no registry), BindingNotFound (unknown id).
// Side effects: none; the registry is only read.

use std::fmt;

use crate::binding::{BindingId, CallTarget, InvokeError, Signature, Value};
use crate::loader::{DynamicLoader, LoaderContext};

// ── Resolved target ─────────────────────────────────────────────────────────

/// Permanent resolution of one call site. Never re-resolved.
#[derive(Debug, Clone)]
pub struct ConstantCallTarget {
    target: CallTarget,
}

impl ConstantCallTarget {
    pub fn new(target: CallTarget) -> Self {
        ConstantCallTarget { target }
    }

    pub fn target(&self) -> &CallTarget {
        &self.target
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self.target.invoke(args)
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The unit's loader does not expose a binding registry.
    Configuration {
        unit: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// The call site's binding id is absent from the registry.
    BindingNotFound {
        binding_id: BindingId,
        call_site: String,
        signature: Signature,
    },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Configuration {
                unit,
                expected,
                actual,
            } => write!(
                f,
                "expected loader of unit '{}' to be of type {}, found {}",
                unit, expected, actual
            ),
            LinkError::BindingNotFound {
                binding_id,
                call_site,
                signature,
            } => write!(
                f,
                "binding {} for call site {}{} not found",
                binding_id, call_site, signature
            ),
        }
    }
}

impl std::error::Error for LinkError {}

// ── Bootstrap ───────────────────────────────────────────────────────────────

/// Shape of the bootstrap entry point referenced by generated call sites.
pub type BootstrapFn = fn(
    &dyn LoaderContext,
    &str,
    &Signature,
    BindingId,
) -> Result<ConstantCallTarget, LinkError>;

/// The bootstrap generated code links against.
pub const BOOTSTRAP: BootstrapFn = resolve;

/// Resolve `binding_id` for the call site `name`/`signature` in the unit
/// loaded by `ctx`. `name` and `signature` only feed diagnostics.
pub fn resolve(
    ctx: &dyn LoaderContext,
    name: &str,
    signature: &Signature,
    binding_id: BindingId,
) -> Result<ConstantCallTarget, LinkError> {
    let registry = ctx
        .binding_registry()
        .ok_or_else(|| LinkError::Configuration {
            unit: ctx.unit_name().to_string(),
            expected: DynamicLoader::KIND,
            actual: ctx.loader_kind(),
        })?;

    let target = registry
        .lookup(binding_id)
        .ok_or_else(|| LinkError::BindingNotFound {
            binding_id,
            call_site: name.to_string(),
            signature: signature.clone(),
        })?;

    tracing::debug!(
        unit = ctx.unit_name(),
        call_site = name,
        %binding_id,
        target = target.name(),
        "call site bound"
    );
    Ok(ConstantCallTarget::new(target.clone()))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ValueType;
    use crate::loader::StaticLoader;
    use crate::registry::CallSiteBinder;

    fn sig() -> Signature {
        Signature::new([ValueType::I64, ValueType::I64], ValueType::I64)
    }

    fn loader_with_42() -> (DynamicLoader, CallTarget) {
        let t = CallTarget::new("add", sig(), |args| match args {
            [Value::I64(a), Value::I64(b)] => Value::I64(a + b),
            _ => Value::Unit,
        });
        let mut binder = CallSiteBinder::new();
        binder.bind_with_id(BindingId(42), t.clone()).unwrap();
        (DynamicLoader::new("unit", binder.finish()), t)
    }

    #[test]
    fn resolves_registered_target() {
        let (loader, t) = loader_with_42();
        let bound = resolve(&loader, "sum", &sig(), BindingId(42)).unwrap();
        assert!(CallTarget::ptr_eq(bound.target(), &t));
        assert_eq!(
            bound.invoke(&[Value::I64(2), Value::I64(40)]).unwrap(),
            Value::I64(42)
        );
    }

    #[test]
    fn bootstrap_constant_is_resolve() {
        let (loader, t) = loader_with_42();
        let bound = BOOTSTRAP(&loader, "sum", &sig(), BindingId(42)).unwrap();
        assert!(CallTarget::ptr_eq(bound.target(), &t));
    }

    #[test]
    fn missing_binding_names_id_site_and_signature() {
        let (loader, _) = loader_with_42();
        let err = resolve(&loader, "sum", &sig(), BindingId(99)).unwrap_err();
        assert_eq!(
            err,
            LinkError::BindingNotFound {
                binding_id: BindingId(99),
                call_site: "sum".to_string(),
                signature: sig(),
            }
        );
        assert_eq!(
            err.to_string(),
            "binding 99 for call site sum(i64, i64) -> i64 not found"
        );
    }

    #[test]
    fn loader_without_registry_is_configuration_error() {
        let loader = StaticLoader::new("prelinked");
        let err = resolve(&loader, "sum", &sig(), BindingId(42)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected loader of unit 'prelinked' to be of type DynamicLoader, found StaticLoader"
        );
    }
}
