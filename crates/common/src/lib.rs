//! Shared building blocks for the renovation ERP core.
//!
//! Provides the typed UUID identifiers used across entities and the
//! integer-cents `Money` type used for every monetary field.

pub mod ids;
pub mod money;

pub use ids::{
    CustomerId, FollowId, OrderId, OrderMaterialId, PaymentId, ProductId, ProductMaterialId,
    UserId,
};
pub use money::Money;
