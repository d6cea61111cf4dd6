//! The repository/transaction abstraction.
//!
//! A [`Store`] hands out [`StoreTransaction`]s: one connection, one atomic
//! scope. All reads a workflow operation uses to check preconditions go
//! through the transaction, so they see live state under the store's
//! isolation rather than a value the caller captured earlier.

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderMaterialId, PaymentId, ProductId};
use domain::{
    Customer, CustomerFollow, Order, OrderMaterial, Payment, Product, ProductMaterial,
};

use crate::error::Result;

/// A transactional store for the ERP entities.
///
/// Implementations must be cheap to clone and thread-safe; one store is
/// shared across all concurrently running workflow operations.
#[async_trait]
pub trait Store: Send + Sync {
    /// The transaction type this store produces.
    type Tx: StoreTransaction;

    /// Acquires a connection and starts a transaction on it.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// One atomic unit of multi-entity mutation.
///
/// Effects become externally visible only on [`commit`]; dropping the
/// transaction rolls everything back and releases the connection, on every
/// exit path. Mutation failures leave the transaction unusable by
/// convention: callers propagate the error and drop.
///
/// [`commit`]: StoreTransaction::commit
#[async_trait]
pub trait StoreTransaction: Send {
    // -- customers --

    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>>;
    async fn customer_by_phone(&mut self, phone: &str) -> Result<Option<Customer>>;
    async fn insert_customer(&mut self, customer: &Customer) -> Result<()>;
    async fn update_customer(&mut self, customer: &Customer) -> Result<()>;

    // -- customer follow-ups --

    async fn insert_follow(&mut self, follow: &CustomerFollow) -> Result<()>;
    async fn follows_for_customer(&mut self, id: CustomerId) -> Result<Vec<CustomerFollow>>;

    // -- product templates (reference data) --

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>>;
    async fn product_materials(&mut self, id: ProductId) -> Result<Vec<ProductMaterial>>;
    async fn insert_product(&mut self, product: &Product) -> Result<()>;
    async fn insert_product_material(&mut self, material: &ProductMaterial) -> Result<()>;

    // -- orders --

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>>;
    async fn order_no_taken(&mut self, order_no: &str) -> Result<bool>;
    async fn insert_order(&mut self, order: &Order) -> Result<()>;
    async fn update_order(&mut self, order: &Order) -> Result<()>;

    // -- order line items --

    async fn order_material(&mut self, id: OrderMaterialId) -> Result<Option<OrderMaterial>>;
    async fn order_materials(&mut self, order_id: OrderId) -> Result<Vec<OrderMaterial>>;
    async fn insert_order_material(&mut self, material: &OrderMaterial) -> Result<()>;
    async fn update_order_material(&mut self, material: &OrderMaterial) -> Result<()>;

    // -- payments --

    async fn payment(&mut self, id: PaymentId) -> Result<Option<Payment>>;
    async fn payments_for_order(&mut self, order_id: OrderId) -> Result<Vec<Payment>>;
    async fn payment_no_taken(&mut self, payment_no: &str) -> Result<bool>;
    async fn insert_payment(&mut self, payment: &Payment) -> Result<()>;
    async fn update_payment(&mut self, payment: &Payment) -> Result<()>;

    /// Durably applies every effect queued in this transaction.
    async fn commit(self) -> Result<()>;

    /// Explicitly discards every effect since `begin`.
    ///
    /// Dropping the transaction has the same effect; this exists for call
    /// sites that want the rollback to be visible in the code.
    async fn rollback(self) -> Result<()>;
}
