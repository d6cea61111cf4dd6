//! Customer status mirroring policy.
//!
//! Order milestones pull the linked customer's status along. The mapping is
//! an explicit policy value rather than inline side effects, and the
//! workflow applies it forward-only via [`Customer::advance_status`], so a
//! second concurrent order can never regress a customer.
//!
//! [`Customer::advance_status`]: crate::customer::Customer::advance_status

use serde::{Deserialize, Serialize};

use crate::customer::CustomerStatus;

/// An order lifecycle milestone that may move the customer's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderMilestone {
    /// An order was drafted for the customer.
    Created,
    /// An order contract was signed.
    Signed,
    /// An order's work was completed.
    Completed,
}

/// Maps order milestones to target customer statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorPolicy {
    pub on_created: Option<CustomerStatus>,
    pub on_signed: Option<CustomerStatus>,
    pub on_completed: Option<CustomerStatus>,
}

impl MirrorPolicy {
    /// The stock policy: creation → quoted, signing → signed,
    /// completion → completed.
    pub fn standard() -> Self {
        Self {
            on_created: Some(CustomerStatus::Quoted),
            on_signed: Some(CustomerStatus::Signed),
            on_completed: Some(CustomerStatus::Completed),
        }
    }

    /// A policy that never touches the customer.
    pub fn disabled() -> Self {
        Self {
            on_created: None,
            on_signed: None,
            on_completed: None,
        }
    }

    /// Returns the target customer status for a milestone, if any.
    pub fn target_for(&self, milestone: OrderMilestone) -> Option<CustomerStatus> {
        match milestone {
            OrderMilestone::Created => self.on_created,
            OrderMilestone::Signed => self.on_signed,
            OrderMilestone::Completed => self.on_completed,
        }
    }
}

impl Default for MirrorPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
