// config.rs — Naming configuration for generated units
//
// Controls the namespace marker, placeholder, separator and timestamp layout
// used by the name allocator. Loadable from a JSON file; every field is
// optional and falls back to the built-in default.
//
// Preconditions: none.
// Postconditions: a config returned by `from_json`/`load` has passed `validate`.
// Failure modes: I/O errors, malformed JSON, invalid field values.
// Side effects: `load` reads one file.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::naming::is_identifier_char;

// ── Defaults ────────────────────────────────────────────────────────────────

/// Namespace reserved for generated code. User-authored names never start with it.
pub const DEFAULT_NAMESPACE: &str = "genlink.$gen";

/// Replacement for characters that are not identifier-safe.
pub const DEFAULT_PLACEHOLDER: char = '_';

/// Joins base name, suffix and counter value.
pub const DEFAULT_SEPARATOR: char = '_';

/// UTC layout substituted when no suffix is supplied (second granularity).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub namespace: String,
    pub placeholder: char,
    pub separator: char,
    pub timestamp_format: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            namespace: DEFAULT_NAMESPACE.to_string(),
            placeholder: DEFAULT_PLACEHOLDER,
            separator: DEFAULT_SEPARATOR,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl NamingConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: NamingConfig = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Check that names built with this config stay identifier-safe and that
    /// sanitizing them twice is a no-op.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier_char(self.placeholder) {
            return Err(ConfigError::invalid(
                "placeholder",
                format!("'{}' is not an identifier character", self.placeholder),
            ));
        }
        if !is_identifier_char(self.separator) {
            return Err(ConfigError::invalid(
                "separator",
                format!("'{}' is not an identifier character", self.separator),
            ));
        }
        if self.namespace.is_empty() {
            return Err(ConfigError::invalid("namespace", "must not be empty"));
        }
        for segment in self.namespace.split('.') {
            if segment.is_empty() || !segment.chars().all(is_identifier_char) {
                return Err(ConfigError::invalid(
                    "namespace",
                    format!("segment '{}' of '{}' is not an identifier", segment, self.namespace),
                ));
            }
        }
        if self.timestamp_format.is_empty() {
            return Err(ConfigError::invalid("timestamp_format", "must not be empty"));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::invalid(
                "timestamp_format",
                format!("'{}' is not a valid strftime layout", self.timestamp_format),
            ));
        }
        Ok(())
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ConfigError::Parse(e) => write!(f, "invalid naming config: {}", e),
            ConfigError::Invalid { field, message } => {
                write!(f, "invalid naming config field '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
