//! Idempotency flags for one-time order side effects.
//!
//! Callers check the flag before performing the effect and set it after;
//! this store's only job is reliable per-order boolean storage. Flags live
//! in the attribute store as "yes"/"no" strings and default to unset=false.

use crate::error::StoreResult;
use crate::storage::AttributeStore;
use crate::types::OrderId;

pub const DOWNLOAD_PERMISSIONS_GRANTED: &str = "_download_permissions_granted";
pub const RECORDED_SALES: &str = "_recorded_sales";
pub const RECORDED_COUPON_USAGE_COUNTS: &str = "_recorded_coupon_usage_counts";
pub const STOCK_REDUCED: &str = "_order_stock_reduced";

pub struct LifecycleFlags<'a> {
    attributes: &'a dyn AttributeStore,
}

impl<'a> LifecycleFlags<'a> {
    pub fn new(attributes: &'a dyn AttributeStore) -> Self {
        Self { attributes }
    }

    /// Whether download permissions were already generated for the order.
    /// Accepts an order handle or a raw id.
    pub fn download_permissions_granted(&self, order: impl Into<OrderId>) -> StoreResult<bool> {
        self.get(order.into(), DOWNLOAD_PERMISSIONS_GRANTED)
    }

    pub fn set_download_permissions_granted(
        &self,
        order: impl Into<OrderId>,
        set: bool,
    ) -> StoreResult<()> {
        self.set(order.into(), DOWNLOAD_PERMISSIONS_GRANTED, set)
    }

    /// Whether the order's sale was already recorded against reporting.
    pub fn recorded_sales(&self, order: impl Into<OrderId>) -> StoreResult<bool> {
        self.get(order.into(), RECORDED_SALES)
    }

    pub fn set_recorded_sales(&self, order: impl Into<OrderId>, set: bool) -> StoreResult<()> {
        self.set(order.into(), RECORDED_SALES, set)
    }

    /// Whether coupon usage counts were already incremented.
    pub fn recorded_coupon_usage_counts(&self, order: impl Into<OrderId>) -> StoreResult<bool> {
        self.get(order.into(), RECORDED_COUPON_USAGE_COUNTS)
    }

    pub fn set_recorded_coupon_usage_counts(
        &self,
        order: impl Into<OrderId>,
        set: bool,
    ) -> StoreResult<()> {
        self.set(order.into(), RECORDED_COUPON_USAGE_COUNTS, set)
    }

    /// Whether stock was already reduced for the order's items.
    pub fn stock_reduced(&self, order: impl Into<OrderId>) -> StoreResult<bool> {
        self.get(order.into(), STOCK_REDUCED)
    }

    pub fn set_stock_reduced(&self, order: impl Into<OrderId>, set: bool) -> StoreResult<()> {
        self.set(order.into(), STOCK_REDUCED, set)
    }

    fn get(&self, id: OrderId, key: &str) -> StoreResult<bool> {
        Ok(self
            .attributes
            .get_attribute(id, key)?
            .is_some_and(|v| string_to_bool(&v)))
    }

    fn set(&self, id: OrderId, key: &str, set: bool) -> StoreResult<()> {
        self.attributes.set_attribute(id, key, bool_to_string(set))
    }
}

fn string_to_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("yes") || raw == "1" || raw.eq_ignore_ascii_case("true")
}

fn bool_to_string(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
