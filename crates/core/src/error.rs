//! Input errors raised before anything reaches storage.

use thiserror::Error;

/// Rejected input: a bad request field or an unparseable identifier.
///
/// Storage and authorization failures have their own types in the crates
/// that raise them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} {reason}")]
    Validation { field: String, reason: String },

    #[error("invalid {kind}: {reason}")]
    InvalidId { kind: &'static str, reason: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
