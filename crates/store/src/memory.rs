//! In-memory store implementation for tests and development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderMaterialId, PaymentId, ProductId};
use domain::{
    Customer, CustomerFollow, Order, OrderMaterial, Payment, Product, ProductMaterial,
};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::{Result, StoreError};
use crate::store::{Store, StoreTransaction};

#[derive(Clone, Default)]
struct Tables {
    customers: HashMap<CustomerId, Customer>,
    follows: Vec<CustomerFollow>,
    products: HashMap<ProductId, Product>,
    product_materials: Vec<ProductMaterial>,
    orders: HashMap<OrderId, Order>,
    order_materials: Vec<OrderMaterial>,
    payments: HashMap<PaymentId, Payment>,
}

/// In-memory store backed by a single set of tables.
///
/// A transaction takes the exclusive write lock for its whole lifetime and
/// mutates a working copy that is swapped in on commit, so concurrent
/// readers observe either all of a transaction's effects or none, and a
/// dropped transaction is a rollback. Unique constraints (customer phone,
/// order and payment numbers) are simulated at insert time.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every table.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }

    /// Returns the number of persisted customers.
    pub async fn customer_count(&self) -> usize {
        self.tables.read().await.customers.len()
    }

    /// Returns the number of persisted follow records.
    pub async fn follow_count(&self) -> usize {
        self.tables.read().await.follows.len()
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the number of persisted order line items.
    pub async fn order_material_count(&self) -> usize {
        self.tables.read().await.order_materials.len()
    }

    /// Returns the number of persisted payments.
    pub async fn payment_count(&self) -> usize {
        self.tables.read().await.payments.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        let guard = Arc::clone(&self.tables).write_owned().await;
        let work = guard.clone();
        Ok(MemoryTransaction { guard, work })
    }
}

/// A transaction over the in-memory tables.
pub struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<Tables>,
    work: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.work.customers.get(&id).cloned())
    }

    async fn customer_by_phone(&mut self, phone: &str) -> Result<Option<Customer>> {
        Ok(self
            .work
            .customers
            .values()
            .find(|c| c.phone == phone)
            .cloned())
    }

    async fn insert_customer(&mut self, customer: &Customer) -> Result<()> {
        if self
            .work
            .customers
            .values()
            .any(|c| c.phone == customer.phone)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "customers_phone_key",
                value: customer.phone.clone(),
            });
        }
        self.work.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<()> {
        match self.work.customers.get_mut(&customer.id) {
            Some(slot) => {
                *slot = customer.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow { entity: "customer" }),
        }
    }

    async fn insert_follow(&mut self, follow: &CustomerFollow) -> Result<()> {
        self.work.follows.push(follow.clone());
        Ok(())
    }

    async fn follows_for_customer(&mut self, id: CustomerId) -> Result<Vec<CustomerFollow>> {
        Ok(self
            .work
            .follows
            .iter()
            .filter(|f| f.customer_id == id)
            .cloned()
            .collect())
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.work.products.get(&id).cloned())
    }

    async fn product_materials(&mut self, id: ProductId) -> Result<Vec<ProductMaterial>> {
        Ok(self
            .work
            .product_materials
            .iter()
            .filter(|m| m.product_id == id)
            .cloned()
            .collect())
    }

    async fn insert_product(&mut self, product: &Product) -> Result<()> {
        self.work.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn insert_product_material(&mut self, material: &ProductMaterial) -> Result<()> {
        self.work.product_materials.push(material.clone());
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn order_no_taken(&mut self, order_no: &str) -> Result<bool> {
        Ok(self.work.orders.values().any(|o| o.order_no == order_no))
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        if self
            .work
            .orders
            .values()
            .any(|o| o.order_no == order.order_no)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "orders_order_no_key",
                value: order.order_no.clone(),
            });
        }
        self.work.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_order(&mut self, order: &Order) -> Result<()> {
        match self.work.orders.get_mut(&order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow { entity: "order" }),
        }
    }

    async fn order_material(&mut self, id: OrderMaterialId) -> Result<Option<OrderMaterial>> {
        Ok(self
            .work
            .order_materials
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn order_materials(&mut self, order_id: OrderId) -> Result<Vec<OrderMaterial>> {
        Ok(self
            .work
            .order_materials
            .iter()
            .filter(|m| m.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn insert_order_material(&mut self, material: &OrderMaterial) -> Result<()> {
        self.work.order_materials.push(material.clone());
        Ok(())
    }

    async fn update_order_material(&mut self, material: &OrderMaterial) -> Result<()> {
        match self
            .work
            .order_materials
            .iter_mut()
            .find(|m| m.id == material.id)
        {
            Some(slot) => {
                *slot = material.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow {
                entity: "order material",
            }),
        }
    }

    async fn payment(&mut self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.work.payments.get(&id).cloned())
    }

    async fn payments_for_order(&mut self, order_id: OrderId) -> Result<Vec<Payment>> {
        let mut payments: Vec<_> = self
            .work
            .payments
            .values()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }

    async fn payment_no_taken(&mut self, payment_no: &str) -> Result<bool> {
        Ok(self
            .work
            .payments
            .values()
            .any(|p| p.payment_no == payment_no))
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()> {
        if self
            .work
            .payments
            .values()
            .any(|p| p.payment_no == payment.payment_no)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "payments_payment_no_key",
                value: payment.payment_no.clone(),
            });
        }
        self.work.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        match self.work.payments.get_mut(&payment.id) {
            Some(slot) => {
                *slot = payment.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow { entity: "payment" }),
        }
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.work;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        // Dropping the guard discards the working copy.
        Ok(())
    }
}
