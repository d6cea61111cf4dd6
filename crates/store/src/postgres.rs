//! PostgreSQL-backed store implementation.

use async_trait::async_trait;
use common::{
    CustomerId, FollowId, OrderId, OrderMaterialId, PaymentId, ProductId, ProductMaterialId,
    Money, UserId,
};
use domain::{
    Customer, CustomerFollow, Order, OrderMaterial, Payment, Product, ProductMaterial,
};
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{Store, StoreTransaction};

/// PostgreSQL store. Transactions map 1:1 onto database transactions, so
/// atomicity and isolation come from the database itself.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        let tx = self.pool.begin().await?;
        tracing::trace!("transaction started");
        Ok(PostgresTransaction { tx })
    }
}

/// A transaction bound to one pooled connection. Dropping it without
/// commit rolls the database transaction back and returns the connection
/// to the pool.
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

fn parse_field<T>(value: String, what: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| StoreError::Decode(format!("{what}: {e}")))
}

fn map_unique(e: sqlx::Error, constraint: &'static str, value: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.constraint() == Some(constraint)
    {
        return StoreError::UniqueViolation {
            constraint,
            value: value.to_string(),
        };
    }
    StoreError::Database(e)
}

fn ensure_updated(result: sqlx::postgres::PgQueryResult, entity: &'static str) -> Result<()> {
    if result.rows_affected() == 0 {
        Err(StoreError::MissingRow { entity })
    } else {
        Ok(())
    }
}

fn row_to_customer(row: PgRow) -> Result<Customer> {
    Ok(Customer {
        id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        contact: row.try_get("contact")?,
        source: row.try_get("source")?,
        address: row.try_get("address")?,
        status: parse_field(row.try_get("status")?, "customer status")?,
        created_by: UserId::from_uuid(row.try_get::<Uuid, _>("created_by")?),
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_follow(row: PgRow) -> Result<CustomerFollow> {
    Ok(CustomerFollow {
        id: FollowId::from_uuid(row.try_get::<Uuid, _>("id")?),
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        customer_name: row.try_get("customer_name")?,
        follow_type: parse_field(row.try_get("follow_type")?, "follow type")?,
        content: row.try_get("content")?,
        follow_by: UserId::from_uuid(row.try_get::<Uuid, _>("follow_by")?),
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        sale_price: Money::from_cents(row.try_get("sale_price")?),
        cost_price: Money::from_cents(row.try_get("cost_price")?),
    })
}

fn row_to_product_material(row: PgRow) -> Result<ProductMaterial> {
    Ok(ProductMaterial {
        id: ProductMaterialId::from_uuid(row.try_get::<Uuid, _>("id")?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
        material_id: row.try_get("material_id")?,
        material_name: row.try_get("material_name")?,
        category: row.try_get("category")?,
        quantity: row.try_get::<i32, _>("quantity")? as u32,
        unit: row.try_get("unit")?,
        price: Money::from_cents(row.try_get("price")?),
        amount: Money::from_cents(row.try_get("amount")?),
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        order_no: row.try_get("order_no")?,
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        total_amount: Money::from_cents(row.try_get("total_amount")?),
        cost_amount: Money::from_cents(row.try_get("cost_amount")?),
        paid_amount: Money::from_cents(row.try_get("paid_amount")?),
        status: parse_field(row.try_get("status")?, "order status")?,
        foreman_id: row
            .try_get::<Option<Uuid>, _>("foreman_id")?
            .map(UserId::from_uuid),
        remark: row.try_get("remark")?,
        signed_at: row.try_get("signed_at")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order_material(row: PgRow) -> Result<OrderMaterial> {
    Ok(OrderMaterial {
        id: OrderMaterialId::from_uuid(row.try_get::<Uuid, _>("id")?),
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        material_id: row.try_get("material_id")?,
        material_name: row.try_get("material_name")?,
        category: row.try_get("category")?,
        quantity: row.try_get::<i32, _>("quantity")? as u32,
        unit: row.try_get("unit")?,
        price: Money::from_cents(row.try_get("price")?),
        amount: Money::from_cents(row.try_get("amount")?),
    })
}

fn row_to_payment(row: PgRow) -> Result<Payment> {
    Ok(Payment {
        id: PaymentId::from_uuid(row.try_get::<Uuid, _>("id")?),
        payment_no: row.try_get("payment_no")?,
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        payment_type: parse_field(row.try_get("payment_type")?, "payment type")?,
        amount: Money::from_cents(row.try_get("amount")?),
        method: parse_field(row.try_get("method")?, "payment method")?,
        status: parse_field(row.try_get("status")?, "payment status")?,
        paid_at: row.try_get("paid_at")?,
        created_by: UserId::from_uuid(row.try_get::<Uuid, _>("created_by")?),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_customer).transpose()
    }

    async fn customer_by_phone(&mut self, phone: &str) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_customer).transpose()
    }

    async fn insert_customer(&mut self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, contact, source, address, status, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.contact)
        .bind(&customer.source)
        .bind(&customer.address)
        .bind(customer.status.as_str())
        .bind(customer.created_by.as_uuid())
        .bind(customer.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, "customers_phone_key", &customer.phone))?;
        Ok(())
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, phone = $3, contact = $4, source = $5, address = $6, status = $7
            WHERE id = $1
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.contact)
        .bind(&customer.source)
        .bind(&customer.address)
        .bind(customer.status.as_str())
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result, "customer")
    }

    async fn insert_follow(&mut self, follow: &CustomerFollow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customer_follows (id, customer_id, customer_name, follow_type, content, follow_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(follow.id.as_uuid())
        .bind(follow.customer_id.as_uuid())
        .bind(&follow.customer_name)
        .bind(follow.follow_type.as_str())
        .bind(&follow.content)
        .bind(follow.follow_by.as_uuid())
        .bind(follow.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn follows_for_customer(&mut self, id: CustomerId) -> Result<Vec<CustomerFollow>> {
        let rows = sqlx::query(
            "SELECT * FROM customer_follows WHERE customer_id = $1 ORDER BY created_at",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(row_to_follow).collect()
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_product).transpose()
    }

    async fn product_materials(&mut self, id: ProductId) -> Result<Vec<ProductMaterial>> {
        let rows = sqlx::query("SELECT * FROM product_materials WHERE product_id = $1")
            .bind(id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(row_to_product_material).collect()
    }

    async fn insert_product(&mut self, product: &Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO products (id, name, sale_price, cost_price) VALUES ($1, $2, $3, $4)",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.sale_price.cents())
        .bind(product.cost_price.cents())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_product_material(&mut self, material: &ProductMaterial) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO product_materials (id, product_id, material_id, material_name, category, quantity, unit, price, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(material.id.as_uuid())
        .bind(material.product_id.as_uuid())
        .bind(&material.material_id)
        .bind(&material.material_name)
        .bind(&material.category)
        .bind(material.quantity as i32)
        .bind(&material.unit)
        .bind(material.price.cents())
        .bind(material.amount.cents())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_order).transpose()
    }

    async fn order_no_taken(&mut self, order_no: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_no = $1")
            .bind(order_no)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count > 0)
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, order_no, customer_id, total_amount, cost_amount, paid_amount,
                                status, foreman_id, remark, signed_at, started_at, completed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_no)
        .bind(order.customer_id.as_uuid())
        .bind(order.total_amount.cents())
        .bind(order.cost_amount.cents())
        .bind(order.paid_amount.cents())
        .bind(order.status.as_str())
        .bind(order.foreman_id.map(|u| u.as_uuid()))
        .bind(&order.remark)
        .bind(order.signed_at)
        .bind(order.started_at)
        .bind(order.completed_at)
        .bind(order.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, "orders_order_no_key", &order.order_no))?;
        Ok(())
    }

    async fn update_order(&mut self, order: &Order) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET total_amount = $2, cost_amount = $3, paid_amount = $4, status = $5,
                foreman_id = $6, remark = $7, signed_at = $8, started_at = $9, completed_at = $10
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.total_amount.cents())
        .bind(order.cost_amount.cents())
        .bind(order.paid_amount.cents())
        .bind(order.status.as_str())
        .bind(order.foreman_id.map(|u| u.as_uuid()))
        .bind(&order.remark)
        .bind(order.signed_at)
        .bind(order.started_at)
        .bind(order.completed_at)
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result, "order")
    }

    async fn order_material(&mut self, id: OrderMaterialId) -> Result<Option<OrderMaterial>> {
        let row = sqlx::query("SELECT * FROM order_materials WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_order_material).transpose()
    }

    async fn order_materials(&mut self, order_id: OrderId) -> Result<Vec<OrderMaterial>> {
        let rows = sqlx::query("SELECT * FROM order_materials WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(row_to_order_material).collect()
    }

    async fn insert_order_material(&mut self, material: &OrderMaterial) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_materials (id, order_id, material_id, material_name, category, quantity, unit, price, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(material.id.as_uuid())
        .bind(material.order_id.as_uuid())
        .bind(&material.material_id)
        .bind(&material.material_name)
        .bind(&material.category)
        .bind(material.quantity as i32)
        .bind(&material.unit)
        .bind(material.price.cents())
        .bind(material.amount.cents())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_order_material(&mut self, material: &OrderMaterial) -> Result<()> {
        let result = sqlx::query(
            "UPDATE order_materials SET quantity = $2, price = $3, amount = $4 WHERE id = $1",
        )
        .bind(material.id.as_uuid())
        .bind(material.quantity as i32)
        .bind(material.price.cents())
        .bind(material.amount.cents())
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result, "order material")
    }

    async fn payment(&mut self, id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query("SELECT * FROM payments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_payment).transpose()
    }

    async fn payments_for_order(&mut self, order_id: OrderId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(row_to_payment).collect()
    }

    async fn payment_no_taken(&mut self, payment_no: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE payment_no = $1")
                .bind(payment_no)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(count > 0)
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, payment_no, order_id, payment_type, amount, method, status, paid_at, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(&payment.payment_no)
        .bind(payment.order_id.as_uuid())
        .bind(payment.payment_type.as_str())
        .bind(payment.amount.cents())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.paid_at)
        .bind(payment.created_by.as_uuid())
        .bind(payment.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, "payments_payment_no_key", &payment.payment_no))?;
        Ok(())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        let result = sqlx::query(
            "UPDATE payments SET status = $2, paid_at = $3 WHERE id = $1",
        )
        .bind(payment.id.as_uuid())
        .bind(payment.status.as_str())
        .bind(payment.paid_at)
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result, "payment")
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
