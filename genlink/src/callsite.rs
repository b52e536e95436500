// callsite.rs — Per-call-site resolution gate
//
// Each indirect call site starts Unresolved holding only its binding id. The
// first execution runs the bootstrap exactly once, even when several threads
// reach the site at the same time; every later execution reuses the memoized
// outcome. A successful resolution leaves the site Bound, a failed one leaves
// it Failed with the same error reported on every later execution.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use crate::binding::{BindingId, InvokeError, Signature, Value};
use crate::bootstrap::{BootstrapFn, ConstantCallTarget, LinkError, BOOTSTRAP};
use crate::loader::LoaderContext;

// ── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CallSiteState {
    Unresolved = 0,
    Resolving = 1,
    Bound = 2,
    Failed = 3,
}

impl CallSiteState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CallSiteState::Resolving,
            2 => CallSiteState::Bound,
            3 => CallSiteState::Failed,
            _ => CallSiteState::Unresolved,
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    Link(LinkError),
    Invoke(InvokeError),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Link(e) => write!(f, "link error: {}", e),
            CallError::Invoke(e) => write!(f, "invocation error: {}", e),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Link(e) => Some(e),
            CallError::Invoke(e) => Some(e),
        }
    }
}

impl From<LinkError> for CallError {
    fn from(e: LinkError) -> Self {
        CallError::Link(e)
    }
}

impl From<InvokeError> for CallError {
    fn from(e: InvokeError) -> Self {
        CallError::Invoke(e)
    }
}

// ── Call site ───────────────────────────────────────────────────────────────

/// One indirect call site of a loaded unit.
pub struct CallSite {
    name: String,
    signature: Signature,
    binding_id: BindingId,
    bootstrap: BootstrapFn,
    state: AtomicU8,
    outcome: OnceLock<Result<ConstantCallTarget, LinkError>>,
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("binding_id", &self.binding_id)
            .field("state", &self.state())
            .finish()
    }
}

impl CallSite {
    pub fn new(name: impl Into<String>, signature: Signature, binding_id: BindingId) -> Self {
        Self::with_bootstrap(name, signature, binding_id, BOOTSTRAP)
    }

    /// Call site linked through a bootstrap other than [`BOOTSTRAP`].
    pub fn with_bootstrap(
        name: impl Into<String>,
        signature: Signature,
        binding_id: BindingId,
        bootstrap: BootstrapFn,
    ) -> Self {
        CallSite {
            name: name.into(),
            signature,
            binding_id,
            bootstrap,
            state: AtomicU8::new(CallSiteState::Unresolved as u8),
            outcome: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn binding_id(&self) -> BindingId {
        self.binding_id
    }

    pub fn state(&self) -> CallSiteState {
        CallSiteState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Resolve on first use, then return the cached outcome. Concurrent
    /// first callers block until the single bootstrap run completes.
    pub fn link(&self, ctx: &dyn LoaderContext) -> Result<&ConstantCallTarget, LinkError> {
        let outcome = self.outcome.get_or_init(|| {
            self.state
                .store(CallSiteState::Resolving as u8, Ordering::Release);
            let result = (self.bootstrap)(ctx, &self.name, &self.signature, self.binding_id);
            let next = match &result {
                Ok(_) => CallSiteState::Bound,
                Err(e) => {
                    tracing::warn!(call_site = %self.name, error = %e, "call site failed to link");
                    CallSiteState::Failed
                }
            };
            self.state.store(next as u8, Ordering::Release);
            result
        });
        outcome.as_ref().map_err(Clone::clone)
    }

    /// Link if needed, then call the bound target.
    pub fn invoke(&self, ctx: &dyn LoaderContext, args: &[Value]) -> Result<Value, CallError> {
        let target = self.link(ctx)?;
        Ok(target.invoke(args)?)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
