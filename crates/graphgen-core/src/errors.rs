//! Structured error types shared across graphgen crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GraphGenError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (parameter values, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the graphgen engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GraphGenError {
    /// Parameters are infeasible before any sampling starts.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// A bounded retry stage exhausted its budget.
    #[error("convergence error: {0}")]
    Convergence(ErrorInfo),
    /// Edge list and weight shapes disagree at an adapter boundary.
    #[error("dimension error: {0}")]
    Dimension(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl GraphGenError {
    /// Shorthand for a [`GraphGenError::Configuration`] error.
    pub fn configuration(code: impl Into<String>, message: impl Into<String>) -> Self {
        GraphGenError::Configuration(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`GraphGenError::Convergence`] error.
    pub fn convergence(code: impl Into<String>, message: impl Into<String>) -> Self {
        GraphGenError::Convergence(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GraphGenError::Configuration(info)
            | GraphGenError::Convergence(info)
            | GraphGenError::Dimension(info)
            | GraphGenError::Serde(info) => info,
        }
    }

    /// Adds a context entry to the payload of any variant.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.map_info(|info| info.with_context(key, value))
    }

    /// Sets the remediation hint of any variant.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        self.map_info(|info| info.with_hint(hint))
    }

    fn map_info(self, f: impl FnOnce(ErrorInfo) -> ErrorInfo) -> Self {
        match self {
            GraphGenError::Configuration(info) => GraphGenError::Configuration(f(info)),
            GraphGenError::Convergence(info) => GraphGenError::Convergence(f(info)),
            GraphGenError::Dimension(info) => GraphGenError::Dimension(f(info)),
            GraphGenError::Serde(info) => GraphGenError::Serde(f(info)),
        }
    }
}
