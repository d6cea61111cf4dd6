//! Domain error taxonomy.
//!
//! Every business failure is a structured value; human-readable text lives
//! only in the `#[error]` attributes and is rendered at the boundary.

use thiserror::Error;

/// Errors raised by domain rules and workflow preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required parameter is missing or has an invalid value.
    #[error("{message}")]
    Validation { message: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A status precondition was not met at transaction time.
    #[error("{entity} is {current}, {action} requires {required}")]
    StateConflict {
        entity: &'static str,
        action: &'static str,
        current: String,
        required: String,
    },

    /// A unique business key is already taken.
    #[error("{field} already registered: {value}")]
    Duplicate { field: &'static str, value: String },

    /// The payment was already confirmed; confirming again is rejected.
    #[error("payment already confirmed")]
    PaymentAlreadyConfirmed,

    /// The payment was cancelled; a cancelled payment cannot be confirmed.
    #[error("payment already cancelled, cannot confirm")]
    PaymentAlreadyCancelled,

    /// A unique ledger number could not be allocated.
    #[error("could not allocate a unique {kind} number after {attempts} attempts")]
    NumberExhausted { kind: &'static str, attempts: u32 },
}

impl DomainError {
    /// Creates a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
        }
    }

    /// Creates a not-found error for an entity.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
