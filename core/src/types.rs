//! Shared primitive types and well-known names used across the order store.

/// Identifier of any legacy-store entity. Orders and their refund records
/// share the same id space.
pub type OrderId = i64;

/// Identifier of an order line item.
pub type ItemId = i64;

/// Base entity type for a live order.
pub const TYPE_ORDER: &str = "order";

/// Base entity type for a refund record hanging off an order.
pub const TYPE_ORDER_REFUND: &str = "order_refund";

/// Entity types recognized as orders by scanners and listings.
pub const ORDER_TYPES: &[&str] = &[TYPE_ORDER, TYPE_ORDER_REFUND];

/// Status of an order still awaiting payment.
pub const STATUS_PENDING: &str = "pending";

/// Attribute key of the composite billing address search index.
pub const BILLING_ADDRESS_INDEX: &str = "_billing_address_index";

/// Attribute key of the composite shipping address search index.
pub const SHIPPING_ADDRESS_INDEX: &str = "_shipping_address_index";

/// Attribute key carrying a refund record's monetary amount.
pub const REFUND_AMOUNT_KEY: &str = "_refund_amount";
