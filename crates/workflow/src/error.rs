//! Workflow error type.

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by workflow operations.
///
/// Business failures carry the domain taxonomy; everything else is a store
/// failure. Either way the transaction the operation opened is rolled back
/// before the error reaches the caller.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A business rule or precondition failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            // A concurrent insert can slip past the in-transaction phone
            // check; surface it as the same duplicate error the check gives.
            StoreError::UniqueViolation {
                constraint: "customers_phone_key",
                value,
            } => WorkflowError::Domain(DomainError::Duplicate {
                field: "phone",
                value,
            }),
            other => WorkflowError::Store(other),
        }
    }
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
