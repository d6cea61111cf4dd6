//! Order lifecycle operations.

use chrono::Utc;
use common::{CustomerId, Money, OrderId, OrderMaterialId, ProductId, UserId};
use domain::{
    DomainError, Order, OrderMaterial, OrderMilestone, Payment, PaymentMethod, PaymentType, recalc,
};
use store::{Store, StoreTransaction};

use crate::error::Result;
use crate::outcome::{MaterialUpdated, OrderCreated, OrderSigned, Outcome};
use crate::service::WorkflowService;

/// Parameters for creating an order from a product template.
#[derive(Debug, Clone)]
pub struct CreateOrderFromProduct {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub remark: Option<String>,
    pub user: UserId,
}

/// Parameters for repricing an order line item.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOrderMaterial {
    pub material_id: OrderMaterialId,
    pub quantity: u32,
    pub price: Money,
}

/// Parameters for signing an order.
///
/// A positive `deposit_amount` records a pending deposit ledger entry in the
/// same transaction; `None` or zero signs without one.
#[derive(Debug, Clone)]
pub struct SignOrder {
    pub order_id: OrderId,
    pub deposit_amount: Option<Money>,
    pub method: Option<PaymentMethod>,
    pub user: UserId,
}

/// Parameters for starting work on an order.
#[derive(Debug, Clone, Copy)]
pub struct StartOrder {
    pub order_id: OrderId,
    pub foreman_id: Option<UserId>,
}

/// Parameters for completing an order.
#[derive(Debug, Clone, Copy)]
pub struct CompleteOrder {
    pub order_id: OrderId,
}

impl<S: Store> WorkflowService<S> {
    /// Creates a draft order seeded from a product template.
    ///
    /// Every template line item is copied onto the order, and the order
    /// total is the sum of the copied amounts. The customer's status is
    /// mirrored per the service's policy.
    #[tracing::instrument(skip(self, params), fields(product_id = %params.product_id))]
    pub async fn create_order_from_product(
        &self,
        params: CreateOrderFromProduct,
    ) -> Result<Outcome<OrderCreated>> {
        metrics::counter!("workflow_operations_total", "operation" => "create_order")
            .increment(1);

        let mut tx = self.store.begin().await?;

        let product = tx
            .product(params.product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", params.product_id))?;
        let template = tx.product_materials(params.product_id).await?;
        if template.is_empty() {
            return Err(
                DomainError::validation("product template has no materials to copy").into(),
            );
        }
        tx.customer(params.customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer", params.customer_id))?;

        let order_no = Self::allocate_order_no(&mut tx).await?;
        let order_id = OrderId::new();
        let materials: Vec<OrderMaterial> = template
            .iter()
            .map(|m| {
                OrderMaterial::new(
                    order_id,
                    m.material_id.clone(),
                    m.material_name.clone(),
                    m.category.clone(),
                    m.quantity,
                    m.unit.clone(),
                    m.price,
                )
            })
            .collect();

        let mut order = Order::draft(
            order_no,
            params.customer_id,
            recalc::order_total(&materials),
            product.cost_price,
            params.remark.unwrap_or_default(),
        );
        order.id = order_id;

        tx.insert_order(&order).await?;
        for material in &materials {
            tx.insert_order_material(material).await?;
        }
        self.apply_mirror(&mut tx, params.customer_id, OrderMilestone::Created)
            .await?;
        tx.commit().await?;

        tracing::info!(%order_id, order_no = %order.order_no, "order created");
        Ok(Outcome::new(
            OrderCreated {
                order_id,
                order_no: order.order_no,
                total_amount: order.total_amount,
            },
            "order created",
        ))
    }

    /// Reprices one line item and recomputes the owning order's total.
    #[tracing::instrument(skip(self, params), fields(material_id = %params.material_id))]
    pub async fn update_order_material(
        &self,
        params: UpdateOrderMaterial,
    ) -> Result<Outcome<MaterialUpdated>> {
        metrics::counter!("workflow_operations_total", "operation" => "update_order_material")
            .increment(1);

        // Reject bad input before touching the store.
        if params.quantity == 0 {
            return Err(DomainError::validation("quantity must be greater than 0").into());
        }
        if params.price.is_negative() {
            return Err(DomainError::validation("price must not be negative").into());
        }

        let mut tx = self.store.begin().await?;

        let mut material = tx
            .order_material(params.material_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order material", params.material_id))?;
        material.reprice(params.quantity, params.price)?;
        tx.update_order_material(&material).await?;

        let mut order = tx
            .order(material.order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", material.order_id))?;
        let materials = tx.order_materials(material.order_id).await?;
        order.total_amount = recalc::order_total(&materials);
        tx.update_order(&order).await?;
        tx.commit().await?;

        Ok(Outcome::new(
            MaterialUpdated {
                amount: material.amount,
                total_amount: order.total_amount,
            },
            "material updated",
        ))
    }

    /// Signs a pending order, optionally recording a deposit ledger entry,
    /// and mirrors the milestone onto the customer.
    #[tracing::instrument(skip(self, params), fields(order_id = %params.order_id))]
    pub async fn sign_order(&self, params: SignOrder) -> Result<Outcome<OrderSigned>> {
        metrics::counter!("workflow_operations_total", "operation" => "sign_order").increment(1);

        if let Some(deposit) = params.deposit_amount
            && deposit.is_negative()
        {
            return Err(DomainError::validation("deposit amount must not be negative").into());
        }

        let mut tx = self.store.begin().await?;

        let mut order = tx
            .order(params.order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", params.order_id))?;
        order.sign(Utc::now())?;
        tx.update_order(&order).await?;

        let mut payment_no = None;
        if let Some(deposit) = params.deposit_amount
            && deposit.is_positive()
        {
            let payment = Payment::pending(
                Self::allocate_payment_no(&mut tx).await?,
                order.id,
                PaymentType::Deposit,
                deposit,
                params.method.unwrap_or_default(),
                params.user,
            );
            tx.insert_payment(&payment).await?;
            tracing::debug!(payment_no = %payment.payment_no, "deposit recorded");
            payment_no = Some(payment.payment_no);
        }

        self.apply_mirror(&mut tx, order.customer_id, OrderMilestone::Signed)
            .await?;
        tx.commit().await?;

        tracing::info!(order_no = %order.order_no, "order signed");
        Ok(Outcome::new(OrderSigned { payment_no }, "order signed"))
    }

    /// Starts work on a signed order, assigning the foreman if given.
    #[tracing::instrument(skip(self, params), fields(order_id = %params.order_id))]
    pub async fn start_order(&self, params: StartOrder) -> Result<Outcome<()>> {
        metrics::counter!("workflow_operations_total", "operation" => "start_order").increment(1);

        let mut tx = self.store.begin().await?;

        let mut order = tx
            .order(params.order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", params.order_id))?;
        order.start(params.foreman_id, Utc::now())?;
        tx.update_order(&order).await?;
        tx.commit().await?;

        tracing::info!(order_no = %order.order_no, "order started");
        Ok(Outcome::new((), "order started"))
    }

    /// Completes an in-progress order and mirrors the milestone onto the
    /// customer.
    #[tracing::instrument(skip(self, params), fields(order_id = %params.order_id))]
    pub async fn complete_order(&self, params: CompleteOrder) -> Result<Outcome<()>> {
        metrics::counter!("workflow_operations_total", "operation" => "complete_order")
            .increment(1);

        let mut tx = self.store.begin().await?;

        let mut order = tx
            .order(params.order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", params.order_id))?;
        order.complete(Utc::now())?;
        tx.update_order(&order).await?;

        self.apply_mirror(&mut tx, order.customer_id, OrderMilestone::Completed)
            .await?;
        tx.commit().await?;

        tracing::info!(order_no = %order.order_no, "order completed");
        Ok(Outcome::new((), "order completed"))
    }
}
