// diag.rs — Diagnostics for command-line reporting
//
// Turns library errors into leveled, human-readable diagnostics with an
// optional cause chain and remediation hint.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::error::Error;
use std::fmt;

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagLevel,
    pub message: String,
    pub hint: Option<String>,
    pub cause_chain: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no hint or causes.
    pub fn new(level: DiagLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            hint: None,
            cause_chain: Vec::new(),
        }
    }

    /// Error diagnostic from `err`, with its `source()` chain as causes.
    /// Causes whose text is already part of the message are skipped.
    pub fn from_error(err: &dyn Error) -> Self {
        let mut diag = Self::new(DiagLevel::Error, err.to_string());
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !diag.message.contains(&text) {
                diag = diag.with_cause(text);
            }
            source = cause.source();
        }
        diag
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach a cause record to the chain.
    pub fn with_cause(mut self, message: impl Into<String>) -> Self {
        self.cause_chain.push(message.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)?;
        for cause in &self.cause_chain {
            write!(f, "\n  caused by: {}", cause)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}
