//! Customer intake.

use common::UserId;
use domain::{Customer, CustomerFollow, DomainError};
use store::{Store, StoreTransaction};

use crate::error::Result;
use crate::outcome::{CustomerCreated, Outcome};
use crate::service::WorkflowService;

/// Parameters for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    pub contact: Option<String>,
    pub source: Option<String>,
    pub address: Option<String>,
    pub user: UserId,
}

impl CreateCustomer {
    /// Creates params with only the required fields set.
    pub fn new(name: impl Into<String>, phone: impl Into<String>, user: UserId) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            contact: None,
            source: None,
            address: None,
            user,
        }
    }
}

impl<S: Store> WorkflowService<S> {
    /// Creates a customer together with its initial follow-up record.
    ///
    /// The phone uniqueness check runs against the transaction's own read,
    /// and the store's unique constraint catches the remaining race.
    #[tracing::instrument(skip(self, params), fields(phone = %params.phone))]
    pub async fn create_customer(&self, params: CreateCustomer) -> Result<Outcome<CustomerCreated>> {
        metrics::counter!("workflow_operations_total", "operation" => "create_customer")
            .increment(1);

        if params.name.trim().is_empty() {
            return Err(DomainError::validation("customer name must not be empty").into());
        }
        if params.phone.trim().is_empty() {
            return Err(DomainError::validation("customer phone must not be empty").into());
        }

        let mut tx = self.store.begin().await?;

        if tx.customer_by_phone(&params.phone).await?.is_some() {
            return Err(DomainError::Duplicate {
                field: "phone",
                value: params.phone,
            }
            .into());
        }

        let customer = Customer::new(
            params.name,
            params.phone,
            params.contact,
            params.source,
            params.address,
            params.user,
        );
        let follow = CustomerFollow::init(&customer, params.user);

        tx.insert_customer(&customer).await?;
        tx.insert_follow(&follow).await?;
        tx.commit().await?;

        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(Outcome::new(
            CustomerCreated {
                customer_id: customer.id,
                customer_name: customer.name,
                phone: customer.phone,
            },
            "customer created",
        ))
    }
}
