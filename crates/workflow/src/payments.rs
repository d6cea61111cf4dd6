//! Payment confirmation.

use chrono::{DateTime, Utc};
use common::PaymentId;
use domain::{DomainError, recalc};
use store::{Store, StoreTransaction};

use crate::error::Result;
use crate::outcome::{Outcome, PaymentConfirmed};
use crate::service::WorkflowService;

/// Parameters for confirming a pending payment.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPayment {
    pub payment_id: PaymentId,
    /// When the money was received. Defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
}

impl<S: Store> WorkflowService<S> {
    /// Confirms a pending payment and applies its amount to the owning
    /// order's paid total, in one transaction.
    ///
    /// Confirmation is one-shot: a second call fails and leaves the paid
    /// total untouched. The resulting unpaid amount is not clamped and goes
    /// negative when the order is overpaid.
    #[tracing::instrument(skip(self, params), fields(payment_id = %params.payment_id))]
    pub async fn confirm_payment(&self, params: ConfirmPayment) -> Result<Outcome<PaymentConfirmed>> {
        metrics::counter!("workflow_operations_total", "operation" => "confirm_payment")
            .increment(1);

        let mut tx = self.store.begin().await?;

        let mut payment = tx
            .payment(params.payment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("payment", params.payment_id))?;
        payment.confirm(params.paid_at.unwrap_or_else(Utc::now))?;
        tx.update_payment(&payment).await?;

        let mut order = tx
            .order(payment.order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", payment.order_id))?;
        recalc::apply_confirmed_payment(&mut order, &payment);
        tx.update_order(&order).await?;
        tx.commit().await?;

        tracing::info!(
            payment_no = %payment.payment_no,
            paid = %order.paid_amount,
            unpaid = %order.unpaid_amount(),
            "payment confirmed"
        );
        Ok(Outcome::new(
            PaymentConfirmed {
                paid_amount: order.paid_amount,
                total_amount: order.total_amount,
                unpaid_amount: order.unpaid_amount(),
            },
            "payment confirmed",
        ))
    }
}
