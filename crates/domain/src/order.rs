//! Order entity, line items, and the order lifecycle state machine.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, OrderMaterialId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The status of an order in its lifecycle.
///
/// Transitions are forward-only:
/// ```text
/// Draft ──► Pending ──► Signed ──► InProgress ──► Completed
/// ```
/// Order creation always yields `Draft`. The draft→pending step is owned by
/// an external collaborator and has no operation in this core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created from a product template, line items still editable.
    #[default]
    Draft,

    /// Quoted and awaiting the customer's signature.
    Pending,

    /// Contract signed, optionally with a deposit payment recorded.
    Signed,

    /// Work has started on site.
    InProgress,

    /// Work finished (terminal state).
    Completed,
}

impl OrderStatus {
    /// Returns true if the order can be signed in this status.
    pub fn can_sign(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if work can start in this status.
    pub fn can_start(&self) -> bool {
        matches!(self, OrderStatus::Signed)
    }

    /// Returns true if the order can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::InProgress)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// Returns the status name as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Signed => "signed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }

    /// Validates an action against this status and returns the next status.
    ///
    /// This is the single transition table for the order lifecycle; callers
    /// must apply it to a status read inside the owning transaction, never
    /// to one captured earlier.
    pub fn apply(self, action: OrderAction) -> Result<OrderStatus, DomainError> {
        if self == action.required() {
            Ok(action.target())
        } else {
            Err(DomainError::StateConflict {
                entity: "order",
                action: action.verb(),
                current: self.as_str().to_string(),
                required: action.required().as_str().to_string(),
            })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OrderStatus::Draft),
            "pending" => Ok(OrderStatus::Pending),
            "signed" => Ok(OrderStatus::Signed),
            "in_progress" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// A lifecycle action on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    /// pending → signed
    Sign,
    /// signed → in_progress
    Start,
    /// in_progress → completed
    Complete,
}

impl OrderAction {
    /// The status an order must be in for this action.
    pub fn required(&self) -> OrderStatus {
        match self {
            OrderAction::Sign => OrderStatus::Pending,
            OrderAction::Start => OrderStatus::Signed,
            OrderAction::Complete => OrderStatus::InProgress,
        }
    }

    /// The status this action transitions into.
    pub fn target(&self) -> OrderStatus {
        match self {
            OrderAction::Sign => OrderStatus::Signed,
            OrderAction::Start => OrderStatus::InProgress,
            OrderAction::Complete => OrderStatus::Completed,
        }
    }

    /// The action name used in error messages and logs.
    pub fn verb(&self) -> &'static str {
        match self {
            OrderAction::Sign => "sign",
            OrderAction::Start => "start",
            OrderAction::Complete => "complete",
        }
    }
}

/// An order for renovation work, created from a product template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Unique generated order number ("DD" + date + suffix).
    pub order_no: String,
    pub customer_id: CustomerId,
    /// Always equals the sum of this order's material amounts.
    pub total_amount: Money,
    pub cost_amount: Money,
    /// Running sum of confirmed payments. Not capped at `total_amount`.
    pub paid_amount: Money,
    pub status: OrderStatus,
    pub foreman_id: Option<UserId>,
    pub remark: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new draft order with nothing paid yet.
    pub fn draft(
        order_no: impl Into<String>,
        customer_id: CustomerId,
        total_amount: Money,
        cost_amount: Money,
        remark: impl Into<String>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            order_no: order_no.into(),
            customer_id,
            total_amount,
            cost_amount,
            paid_amount: Money::zero(),
            status: OrderStatus::Draft,
            foreman_id: None,
            remark: remark.into(),
            signed_at: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Signs the order, stamping the signature time.
    pub fn sign(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.apply(OrderAction::Sign)?;
        self.signed_at = Some(at);
        Ok(())
    }

    /// Starts work, optionally assigning a foreman.
    pub fn start(&mut self, foreman_id: Option<UserId>, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.apply(OrderAction::Start)?;
        self.foreman_id = foreman_id;
        self.started_at = Some(at);
        Ok(())
    }

    /// Completes the order.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.apply(OrderAction::Complete)?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Returns the amount still owed. Negative when overpaid.
    pub fn unpaid_amount(&self) -> Money {
        self.total_amount - self.paid_amount
    }
}

/// A line item on an order. `amount` is always `quantity × price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMaterial {
    pub id: OrderMaterialId,
    pub order_id: OrderId,
    /// Catalog code of the material.
    pub material_id: String,
    pub material_name: String,
    pub category: String,
    pub quantity: u32,
    pub unit: String,
    pub price: Money,
    pub amount: Money,
}

impl OrderMaterial {
    /// Creates a line item, deriving the amount.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        material_id: impl Into<String>,
        material_name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        unit: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id: OrderMaterialId::new(),
            order_id,
            material_id: material_id.into(),
            material_name: material_name.into(),
            category: category.into(),
            quantity,
            unit: unit.into(),
            price,
            amount: price.multiply(quantity),
        }
    }

    /// Updates quantity and unit price, re-deriving the amount.
    pub fn reprice(&mut self, quantity: u32, price: Money) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be greater than 0"));
        }
        if price.is_negative() {
            return Err(DomainError::validation("price must not be negative"));
        }
        // Derive the amount first so a failure leaves the line item untouched.
        let amount = price
            .checked_multiply(quantity)
            .ok_or_else(|| DomainError::validation("amount exceeds the representable range"))?;
        self.quantity = quantity;
        self.price = price;
        self.amount = amount;
        Ok(())
    }
}
