use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was violated.
    #[error("unique constraint {constraint} violated by value {value}")]
    UniqueViolation {
        constraint: &'static str,
        value: String,
    },

    /// An update targeted a row that no longer exists.
    #[error("{entity} row vanished during transaction")]
    MissingRow { entity: &'static str },

    /// A stored value could not be decoded into its domain type.
    #[error("corrupt row: {0}")]
    Decode(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
