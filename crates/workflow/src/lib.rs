//! Atomic business operations for the renovation ERP.
//!
//! Each operation opens one store transaction, checks its preconditions on
//! fresh in-transaction reads, applies every related mutation, and commits.
//! Any failure before the commit rolls the whole unit back.

mod customers;
mod error;
mod orders;
mod outcome;
mod payments;
mod service;

pub use customers::CreateCustomer;
pub use error::{Result, WorkflowError};
pub use orders::{
    CompleteOrder, CreateOrderFromProduct, SignOrder, StartOrder, UpdateOrderMaterial,
};
pub use outcome::{
    CustomerCreated, MaterialUpdated, OrderCreated, OrderSigned, Outcome, PaymentConfirmed,
};
pub use payments::ConfirmPayment;
pub use service::WorkflowService;
