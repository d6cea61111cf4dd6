//! Ledger number generation.
//!
//! Numbers follow the house format `<prefix><YYYYMMDD><4-digit suffix>`,
//! e.g. `DD202501290042`. The suffix is drawn from a v4 UUID, so a single
//! draw is only probabilistically unique; callers re-draw on collision
//! (bounded by [`GENERATION_ATTEMPTS`]) and the store's unique constraint
//! is the final arbiter.

use chrono::Utc;
use uuid::Uuid;

/// Prefix for order numbers.
pub const ORDER_PREFIX: &str = "DD";

/// Prefix for payment ledger numbers.
pub const PAYMENT_PREFIX: &str = "SK";

/// How many draws a caller should attempt before giving up.
pub const GENERATION_ATTEMPTS: u32 = 5;

/// Generates a candidate order number.
pub fn order_no() -> String {
    generate(ORDER_PREFIX)
}

/// Generates a candidate payment ledger number.
pub fn payment_no() -> String {
    generate(PAYMENT_PREFIX)
}

fn generate(prefix: &str) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = (Uuid::new_v4().as_u128() % 10_000) as u16;
    format!("{prefix}{date}{suffix:04}")
}
