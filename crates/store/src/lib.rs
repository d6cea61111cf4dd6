//! Storage layer: the repository/transaction abstraction plus its in-memory
//! and PostgreSQL implementations.
//!
//! Workflow operations are generic over [`Store`]; every business action
//! runs inside a single [`StoreTransaction`] so its cross-entity effects are
//! all-or-nothing. Rollback and connection release ride on `Drop`.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{Store, StoreTransaction};
