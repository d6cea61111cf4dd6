//! Typed entity identifiers.
//!
//! Every entity gets its own UUID newtype so a `PaymentId` can never be
//! passed where an `OrderId` is expected. All wrappers share the same API
//! surface, generated by `entity_id!`.

/// Declares a UUID-backed identifier newtype.
macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier for a customer.
    CustomerId
);
entity_id!(
    /// Identifier for an order.
    OrderId
);
entity_id!(
    /// Identifier for an order line item.
    OrderMaterialId
);
entity_id!(
    /// Identifier for a payment ledger entry.
    PaymentId
);
entity_id!(
    /// Identifier for a customer follow-up record.
    FollowId
);
entity_id!(
    /// Identifier for a product template.
    ProductId
);
entity_id!(
    /// Identifier for a product template line item.
    ProductMaterialId
);
entity_id!(
    /// Identifier for an acting user (ERP account).
    UserId
);
