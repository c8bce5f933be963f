//! Refund aggregates, derived at read time from refund records and their
//! line items. Never stored on the order itself.

use rusqlite::params;

use super::SqliteStore;
use crate::error::StoreResult;
use crate::types::{OrderId, REFUND_AMOUNT_KEY, TYPE_ORDER_REFUND};

impl SqliteStore {
    /// Amount already refunded: sum of refund amounts across all refund
    /// records whose parent is the order. Zero when none exist.
    pub fn total_refunded(&self, order_id: OrderId) -> StoreResult<f64> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(CAST(a.attr_value AS REAL)), 0.0)
             FROM attributes a
             JOIN entities refunds ON refunds.entity_id = a.entity_id
                AND refunds.entity_type = ?2
                AND refunds.parent_id = ?1
             WHERE a.attr_key = ?3",
            params![order_id, TYPE_ORDER_REFUND, REFUND_AMOUNT_KEY],
            |r| r.get(0),
        )?;
        Ok(total)
    }

    /// Total tax refunded: tax_amount plus shipping_tax_amount over line
    /// items of type "tax" belonging to the order's refund records. The
    /// stored sub-amounts are negative; the aggregate is reported as a
    /// positive magnitude.
    pub fn total_tax_refunded(&self, order_id: OrderId) -> StoreResult<f64> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(CAST(ia.attr_value AS REAL)), 0.0)
             FROM item_attributes ia
             JOIN order_items items ON items.item_id = ia.item_id
                AND items.item_type = 'tax'
             JOIN entities refunds ON refunds.entity_id = items.order_id
                AND refunds.entity_type = ?2
                AND refunds.parent_id = ?1
             WHERE ia.attr_key IN ('tax_amount', 'shipping_tax_amount')",
            params![order_id, TYPE_ORDER_REFUND],
            |r| r.get(0),
        )?;
        Ok(total.abs())
    }

    /// Total shipping refunded: "cost" over line items of type "shipping"
    /// belonging to the order's refund records, as a positive magnitude.
    pub fn total_shipping_refunded(&self, order_id: OrderId) -> StoreResult<f64> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(CAST(ia.attr_value AS REAL)), 0.0)
             FROM item_attributes ia
             JOIN order_items items ON items.item_id = ia.item_id
                AND items.item_type = 'shipping'
             JOIN entities refunds ON refunds.entity_id = items.order_id
                AND refunds.entity_type = ?2
                AND refunds.parent_id = ?1
             WHERE ia.attr_key = 'cost'",
            params![order_id, TYPE_ORDER_REFUND],
            |r| r.get(0),
        )?;
        Ok(total.abs())
    }
}
