//! Structured error types shared across the dimer crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`TilingError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (cell coordinates, counts, epoch numbers).
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

/// Canonical error type for the dimer sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum TilingError {
    /// The region admits no perfect matching.
    #[error("infeasible region: {0}")]
    InfeasibleRegion(ErrorInfo),
    /// No local rerouting realises the requested winding change.
    #[error("winding unreachable: {0}")]
    WindingUnreachable(ErrorInfo),
    /// A region edit cannot be repaired locally.
    #[error("repair impossible: {0}")]
    RepairImpossible(ErrorInfo),
    /// Coupling from the past ran out of its epoch budget.
    #[error("epoch budget exceeded: {0}")]
    EpochBudgetExceeded(ErrorInfo),
    /// Malformed caller input (cells, bias tables, dimer lists).
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// The caller requested cancellation at a checkpoint.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
    /// Serialization and adapter I/O errors.
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

impl TilingError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            TilingError::InfeasibleRegion(info)
            | TilingError::WindingUnreachable(info)
            | TilingError::RepairImpossible(info)
            | TilingError::EpochBudgetExceeded(info)
            | TilingError::InvalidInput(info)
            | TilingError::Cancelled(info)
            | TilingError::Serde(info) => info,
        }
    }

    /// Whether the caller may retry (possibly after a fallback) without editing the region.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            TilingError::WindingUnreachable(_)
                | TilingError::RepairImpossible(_)
                | TilingError::EpochBudgetExceeded(_)
                | TilingError::Cancelled(_)
        )
    }

    /// Shorthand for an [`TilingError::InvalidInput`] error.
    pub fn invalid(code: &str, message: impl Into<String>) -> Self {
        TilingError::InvalidInput(ErrorInfo::new(code, message))
    }
}
