//! The workflow service and its shared helpers.

use common::CustomerId;
use domain::{DomainError, MirrorPolicy, OrderMilestone, numbers};
use store::{Store, StoreTransaction};

use crate::error::Result;

/// Executes the named business operations of the ERP.
///
/// One service is shared across all callers; each operation acquires its own
/// transaction from the store, so operations are independent units of work.
pub struct WorkflowService<S: Store> {
    pub(crate) store: S,
    pub(crate) mirror: MirrorPolicy,
}

impl<S: Store> WorkflowService<S> {
    /// Creates a service with the standard customer mirror policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            mirror: MirrorPolicy::standard(),
        }
    }

    /// Creates a service with a custom mirror policy.
    pub fn with_mirror_policy(store: S, mirror: MirrorPolicy) -> Self {
        Self { store, mirror }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Draws order numbers until one is free, bounded by
    /// [`numbers::GENERATION_ATTEMPTS`]. The store's unique constraint
    /// remains the final arbiter against a concurrent allocation.
    pub(crate) async fn allocate_order_no(tx: &mut S::Tx) -> Result<String> {
        Self::allocate_order_no_with(tx, numbers::order_no).await
    }

    /// [`Self::allocate_order_no`] with an explicit candidate source.
    pub(crate) async fn allocate_order_no_with(
        tx: &mut S::Tx,
        mut draw: impl FnMut() -> String + Send,
    ) -> Result<String> {
        for _ in 0..numbers::GENERATION_ATTEMPTS {
            let candidate = draw();
            if !tx.order_no_taken(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::NumberExhausted {
            kind: "order",
            attempts: numbers::GENERATION_ATTEMPTS,
        }
        .into())
    }

    /// Same as [`Self::allocate_order_no`], for payment ledger numbers.
    pub(crate) async fn allocate_payment_no(tx: &mut S::Tx) -> Result<String> {
        Self::allocate_payment_no_with(tx, numbers::payment_no).await
    }

    /// [`Self::allocate_payment_no`] with an explicit candidate source.
    pub(crate) async fn allocate_payment_no_with(
        tx: &mut S::Tx,
        mut draw: impl FnMut() -> String + Send,
    ) -> Result<String> {
        for _ in 0..numbers::GENERATION_ATTEMPTS {
            let candidate = draw();
            if !tx.payment_no_taken(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::NumberExhausted {
            kind: "payment",
            attempts: numbers::GENERATION_ATTEMPTS,
        }
        .into())
    }

    /// Mirrors an order milestone onto the linked customer, forward-only.
    pub(crate) async fn apply_mirror(
        &self,
        tx: &mut S::Tx,
        customer_id: CustomerId,
        milestone: OrderMilestone,
    ) -> Result<()> {
        let Some(target) = self.mirror.target_for(milestone) else {
            return Ok(());
        };
        let mut customer = tx
            .customer(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer", customer_id))?;
        if customer.advance_status(target) {
            tx.update_customer(&customer).await?;
            tracing::debug!(%customer_id, status = %customer.status, "customer status mirrored");
        }
        Ok(())
    }
}
