//! Derived-total recalculation rules.
//!
//! Both rules run inside the transaction that changed the inputs:
//! - the order total is always a full recomputation over the current line
//!   items, trading a little work for immunity to drift;
//! - the paid amount is incremented exactly once per payment, at the moment
//!   the payment becomes confirmed (the payment's one-shot terminal rule
//!   guarantees the "exactly once").

use common::Money;

use crate::order::{Order, OrderMaterial};
use crate::payment::Payment;

/// Recomputes an order's total as the sum of its line item amounts.
pub fn order_total(materials: &[OrderMaterial]) -> Money {
    materials.iter().map(|m| m.amount).sum()
}

/// Applies a freshly confirmed payment to the order's running paid amount.
///
/// No cap is enforced against the order total; overpayment drives the
/// unpaid amount negative.
pub fn apply_confirmed_payment(order: &mut Order, payment: &Payment) {
    order.paid_amount += payment.amount;
}
