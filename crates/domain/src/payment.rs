//! Payment ledger entries.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, PaymentId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The status of a payment. `Confirmed` and `Cancelled` are terminal; a
/// payment leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl PaymentStatus {
    /// Returns true if no further transition is defined.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed | PaymentStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// What a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Deposit collected at signing.
    Deposit,
    /// Progress payment during the work.
    Progress,
    /// Final settlement.
    Final,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Deposit => "deposit",
            PaymentType::Progress => "progress",
            PaymentType::Final => "final",
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(PaymentType::Deposit),
            "progress" => Ok(PaymentType::Progress),
            "final" => Ok(PaymentType::Final),
            other => Err(format!("unknown payment type: {other}")),
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Transfer,
    Wechat,
    Alipay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Wechat => "wechat",
            PaymentMethod::Alipay => "alipay",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "wechat" => Ok(PaymentMethod::Wechat),
            "alipay" => Ok(PaymentMethod::Alipay),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// A payment ledger entry owned by an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Unique generated ledger number ("SK" + date + suffix).
    pub payment_no: String,
    pub order_id: OrderId,
    pub payment_type: PaymentType,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending ledger entry.
    pub fn pending(
        payment_no: impl Into<String>,
        order_id: OrderId,
        payment_type: PaymentType,
        amount: Money,
        method: PaymentMethod,
        created_by: UserId,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            payment_no: payment_no.into(),
            order_id,
            payment_type,
            amount,
            method,
            status: PaymentStatus::Pending,
            paid_at: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Confirms the payment, the one-shot exit from `Pending`.
    ///
    /// The caller is responsible for applying the confirmed amount to the
    /// owning order's paid total inside the same transaction.
    pub fn confirm(&mut self, paid_at: DateTime<Utc>) -> Result<(), DomainError> {
        match self.status {
            PaymentStatus::Confirmed => Err(DomainError::PaymentAlreadyConfirmed),
            PaymentStatus::Cancelled => Err(DomainError::PaymentAlreadyCancelled),
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Confirmed;
                self.paid_at = Some(paid_at);
                Ok(())
            }
        }
    }
}
