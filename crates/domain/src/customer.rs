//! Customer entity and the append-only follow-up log.

use chrono::{DateTime, Utc};
use common::{CustomerId, FollowId, UserId};
use serde::{Deserialize, Serialize};

/// The status of a customer, mirrored from their order's milestones.
///
/// The variants are ordered; a customer's status only ever moves forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    /// A lead that has not been quoted yet.
    #[default]
    Prospect,

    /// At least one order has been drafted for this customer.
    Quoted,

    /// An order contract has been signed.
    Signed,

    /// Work for this customer has been completed.
    Completed,
}

impl CustomerStatus {
    /// Returns the status name as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Prospect => "prospect",
            CustomerStatus::Quoted => "quoted",
            CustomerStatus::Signed => "signed",
            CustomerStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prospect" => Ok(CustomerStatus::Prospect),
            "quoted" => Ok(CustomerStatus::Quoted),
            "signed" => Ok(CustomerStatus::Signed),
            "completed" => Ok(CustomerStatus::Completed),
            other => Err(format!("unknown customer status: {other}")),
        }
    }
}

/// A customer of the renovation business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Unique business key among customers.
    pub phone: String,
    pub contact: String,
    pub source: String,
    pub address: String,
    pub status: CustomerStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new prospect, applying the intake defaults: contact falls
    /// back to the customer name, source to "other", address to empty.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        contact: Option<String>,
        source: Option<String>,
        address: Option<String>,
        created_by: UserId,
    ) -> Self {
        let name = name.into();
        Self {
            id: CustomerId::new(),
            contact: contact.unwrap_or_else(|| name.clone()),
            name,
            phone: phone.into(),
            source: source.unwrap_or_else(|| "other".to_string()),
            address: address.unwrap_or_default(),
            status: CustomerStatus::Prospect,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Moves the status forward to `target`, ignoring regressions.
    ///
    /// Returns true if the status changed.
    pub fn advance_status(&mut self, target: CustomerStatus) -> bool {
        if target > self.status {
            self.status = target;
            true
        } else {
            false
        }
    }
}

/// The kind of a follow-up record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowType {
    /// Written automatically when the customer is created.
    Init,
    Phone,
    Visit,
    Remark,
}

impl FollowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowType::Init => "init",
            FollowType::Phone => "phone",
            FollowType::Visit => "visit",
            FollowType::Remark => "remark",
        }
    }
}

impl std::str::FromStr for FollowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(FollowType::Init),
            "phone" => Ok(FollowType::Phone),
            "visit" => Ok(FollowType::Visit),
            "remark" => Ok(FollowType::Remark),
            other => Err(format!("unknown follow type: {other}")),
        }
    }
}

/// An append-only follow-up entry on a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFollow {
    pub id: FollowId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub follow_type: FollowType,
    pub content: String,
    pub follow_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl CustomerFollow {
    /// Creates the initial follow record written alongside a new customer.
    pub fn init(customer: &Customer, follow_by: UserId) -> Self {
        Self {
            id: FollowId::new(),
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            follow_type: FollowType::Init,
            content: "customer created".to_string(),
            follow_by,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_defaults() {
        let customer = Customer::new("张三", "13800000000", None, None, None, UserId::new());
        assert_eq!(customer.contact, "张三");
        assert_eq!(customer.source, "other");
        assert_eq!(customer.address, "");
        assert_eq!(customer.status, CustomerStatus::Prospect);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let customer = Customer::new(
            "李四",
            "13900000000",
            Some("王经理".to_string()),
            Some("referral".to_string()),
            Some("幸福路1号".to_string()),
            UserId::new(),
        );
        assert_eq!(customer.contact, "王经理");
        assert_eq!(customer.source, "referral");
        assert_eq!(customer.address, "幸福路1号");
    }

    #[test]
    fn status_advances_forward_only() {
        let mut customer = Customer::new("张三", "13800000000", None, None, None, UserId::new());

        assert!(customer.advance_status(CustomerStatus::Quoted));
        assert_eq!(customer.status, CustomerStatus::Quoted);

        assert!(customer.advance_status(CustomerStatus::Completed));

        // A later order drafting must not regress a completed customer.
        assert!(!customer.advance_status(CustomerStatus::Quoted));
        assert_eq!(customer.status, CustomerStatus::Completed);

        // Same status is a no-op.
        assert!(!customer.advance_status(CustomerStatus::Completed));
    }

    #[test]
    fn status_ordering_matches_lifecycle() {
        assert!(CustomerStatus::Prospect < CustomerStatus::Quoted);
        assert!(CustomerStatus::Quoted < CustomerStatus::Signed);
        assert!(CustomerStatus::Signed < CustomerStatus::Completed);
    }

    #[test]
    fn init_follow_references_the_customer() {
        let customer = Customer::new("张三", "13800000000", None, None, None, UserId::new());
        let user = UserId::new();
        let follow = CustomerFollow::init(&customer, user);

        assert_eq!(follow.customer_id, customer.id);
        assert_eq!(follow.customer_name, "张三");
        assert_eq!(follow.follow_type, FollowType::Init);
        assert_eq!(follow.follow_by, user);
    }
}
