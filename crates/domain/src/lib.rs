//! Domain layer for the renovation ERP workflow core.
//!
//! This crate is pure: entities, closed status enums with a central
//! transition table, the derived-total recalculation rules, ledger number
//! generation, the customer mirror policy, and the typed error taxonomy.
//! Persistence and composition live in the `store` and `workflow` crates.

pub mod customer;
pub mod error;
pub mod mirror;
pub mod numbers;
pub mod order;
pub mod payment;
pub mod product;
pub mod recalc;

pub use customer::{Customer, CustomerFollow, CustomerStatus, FollowType};
pub use error::DomainError;
pub use mirror::{MirrorPolicy, OrderMilestone};
pub use order::{Order, OrderAction, OrderMaterial, OrderStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus, PaymentType};
pub use product::{Product, ProductMaterial};
