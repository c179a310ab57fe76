//! Structured error types shared across volsim crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`VolError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (property names, sizes, paths, etc.).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the volsim engine.
///
/// Every failure propagates to the caller unchanged; nothing in the engine
/// retries or substitutes defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum VolError {
    /// A property was defined with both or neither of distribution and equation.
    #[error("invalid property definition: {0}")]
    InvalidPropertyDefinition(ErrorInfo),
    /// A bulk update or deserialization referenced a field that does not exist.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(ErrorInfo),
    /// Supplied data has the wrong shape.
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// A persisted artefact could not be found.
    #[error("file not found: {0}")]
    FileNotFound(ErrorInfo),
    /// Risking was requested with a probability outside the open interval (0, 1).
    #[error("invalid probability range: {0}")]
    InvalidProbabilityRange(ErrorInfo),
    /// Equation text is malformed or references unknown identifiers.
    #[error("evaluation error: {0}")]
    Evaluation(ErrorInfo),
    /// Unknown distribution family or invalid family parameters.
    #[error("distribution error: {0}")]
    Distribution(ErrorInfo),
    /// Dependency ordering failures within a region.
    #[error("dependency error: {0}")]
    Dependency(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors other than a missing path.
    #[error("io error: {0}")]
    Io(ErrorInfo),
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

impl VolError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            VolError::InvalidPropertyDefinition(info)
            | VolError::UnknownAttribute(info)
            | VolError::InvalidInput(info)
            | VolError::FileNotFound(info)
            | VolError::InvalidProbabilityRange(info)
            | VolError::Evaluation(info)
            | VolError::Distribution(info)
            | VolError::Dependency(info)
            | VolError::Serde(info)
            | VolError::Io(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            VolError::InvalidPropertyDefinition(info)
            | VolError::UnknownAttribute(info)
            | VolError::InvalidInput(info)
            | VolError::FileNotFound(info)
            | VolError::InvalidProbabilityRange(info)
            | VolError::Evaluation(info)
            | VolError::Distribution(info)
            | VolError::Dependency(info)
            | VolError::Serde(info)
            | VolError::Io(info) => info,
        }
    }

    /// Adds a context entry while keeping the variant, e.g. the region a failure surfaced in.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut().context.insert(key.into(), value.into());
        self
    }

    /// Maps an I/O failure on `path`, turning a missing path into [`VolError::FileNotFound`].
    pub fn from_io(code: &str, err: std::io::Error, path: &Path) -> Self {
        let info = ErrorInfo::new(code, err.to_string())
            .with_context("path", path.display().to_string());
        if err.kind() == std::io::ErrorKind::NotFound {
            VolError::FileNotFound(info)
        } else {
            VolError::Io(info)
        }
    }
}
