//! Domain error model.

use thiserror::Error;

use crate::validate::FieldViolation;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// One variant per caller-visible failure kind. Repositories never swallow
/// errors and never retry internally; retry policy belongs to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A path-supplied resource id is missing, non-numeric, or non-positive.
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// One or more structural field rules were violated.
    #[error("validation failed ({} violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),

    /// The targeted resource does not exist, or exists outside the caller's
    /// ownership chain. The two causes are deliberately indistinguishable.
    #[error("not found")]
    NotFound,

    /// An optimistic-concurrency precondition did not match current state.
    /// The caller should re-fetch and retry with the fresh version.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A backend-level constraint rejected a write that passed validation.
    /// Indicates validator/backend drift; treated as an internal error.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The backing store could not be reached or the wait budget elapsed.
    /// Transient; safe for the caller to retry with backoff.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl DomainError {
    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation(violations)
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
