// binding.rs — Binding ids, call signatures and invocable call targets
//
// A call target is a shared reference to executable code together with the
// signature it was registered under. Invocation checks arity and argument
// types against that signature before entering the code, so a mismatch
// between generator and registry surfaces as an error instead of a wrong
// result.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ── Binding id ──────────────────────────────────────────────────────────────

/// Literal operand embedded in an indirect call site. Unique within one
/// unit's binding table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BindingId(pub u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Types and values ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    I64,
    F64,
    Bool,
    Str,
    Unit,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::I64 => "i64",
            ValueType::F64 => "f64",
            ValueType::Bool => "bool",
            ValueType::Str => "str",
            ValueType::Unit => "unit",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
    Unit,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::I64(_) => ValueType::I64,
            Value::F64(_) => ValueType::F64,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::Str,
            Value::Unit => ValueType::Unit,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Unit => f.write_str("()"),
        }
    }
}

// ── Signature ───────────────────────────────────────────────────────────────

/// Calling signature of a call site or target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ValueType>,
    pub ret: ValueType,
}

impl Signature {
    pub fn new(params: impl Into<Vec<ValueType>>, ret: ValueType) -> Self {
        Signature {
            params: params.into(),
            ret,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

// ── Call target ─────────────────────────────────────────────────────────────

/// Entry point of a call target. Arguments have already been checked
/// against the target's signature.
pub type Entry = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Executable code plus its calling signature.
#[derive(Clone)]
pub struct CallTarget {
    name: String,
    signature: Signature,
    entry: Entry,
}

impl fmt::Debug for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallTarget")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl CallTarget {
    pub fn new(
        name: impl Into<String>,
        signature: Signature,
        entry: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        CallTarget {
            name: name.into(),
            signature,
            entry: Arc::new(entry),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// True when both handles refer to the same code.
    pub fn ptr_eq(a: &CallTarget, b: &CallTarget) -> bool {
        Arc::ptr_eq(&a.entry, &b.entry)
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        if args.len() != self.signature.params.len() {
            return Err(InvokeError::ArityMismatch {
                target: self.name.clone(),
                expected: self.signature.params.len(),
                found: args.len(),
            });
        }
        for (index, (arg, expected)) in args.iter().zip(&self.signature.params).enumerate() {
            if arg.value_type() != *expected {
                return Err(InvokeError::TypeMismatch {
                    target: self.name.clone(),
                    index,
                    expected: *expected,
                    found: arg.value_type(),
                });
            }
        }
        Ok((self.entry)(args))
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    ArityMismatch {
        target: String,
        expected: usize,
        found: usize,
    },
    TypeMismatch {
        target: String,
        index: usize,
        expected: ValueType,
        found: ValueType,
    },
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::ArityMismatch {
                target,
                expected,
                found,
            } => write!(
                f,
                "target '{}' expects {} argument(s), got {}",
                target, expected, found
            ),
            InvokeError::TypeMismatch {
                target,
                index,
                expected,
                found,
            } => write!(
                f,
                "target '{}' argument {} must be {}, got {}",
                target, index, expected, found
            ),
        }
    }
}

impl std::error::Error for InvokeError {}

// ── Tests ───────────────────────────────────────────────────────────────────
