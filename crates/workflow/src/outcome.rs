//! Structured operation results.
//!
//! Operations return typed data; the human-readable message is for the host
//! runtime to present or log. The `{success, data, message}` envelope the
//! host expects is rendered at the API boundary.

use common::{CustomerId, Money, OrderId};
use serde::Serialize;

/// A successful operation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub data: T,
    pub message: String,
}

impl<T> Outcome<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
        }
    }
}

/// Result data of `create_customer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerCreated {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub phone: String,
}

/// Result data of `create_order_from_product`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub order_no: String,
    pub total_amount: Money,
}

/// Result data of `sign_order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSigned {
    /// Ledger number of the deposit, when one was recorded.
    pub payment_no: Option<String>,
}

/// Result data of `update_order_material`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialUpdated {
    /// The line item's new derived amount.
    pub amount: Money,
    /// The order's recomputed total.
    pub total_amount: Money,
}

/// Result data of `confirm_payment`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentConfirmed {
    pub paid_amount: Money,
    pub total_amount: Money,
    /// `total − paid`; negative when the order is overpaid.
    pub unpaid_amount: Money,
}
