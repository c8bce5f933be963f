//! Substring search primitives and the unpaid-order scan.

use chrono::{DateTime, Utc};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use super::SqliteStore;
use crate::error::StoreResult;
use crate::types::{OrderId, ORDER_TYPES, STATUS_PENDING};

/// Escape LIKE wildcards in a user term and wrap it for substring match.
pub(super) fn like_pattern(term: &str) -> String {
    let escaped: String = term
        .chars()
        .flat_map(|c| match c {
            '%' | '_' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    format!("%{escaped}%")
}

impl SqliteStore {
    /// Ids of entities whose listed attribute fields contain the term,
    /// case-insensitively.
    pub(crate) fn order_ids_with_attribute_like(
        &self,
        keys: &[String],
        term: &str,
    ) -> StoreResult<Vec<OrderId>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let marks: Vec<String> = (2..=keys.len() + 1).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT DISTINCT entity_id FROM attributes
             WHERE attr_value LIKE ?1 ESCAPE '\\' AND attr_key IN ({})",
            marks.join(", ")
        );

        let mut values: Vec<Value> = Vec::with_capacity(keys.len() + 1);
        values.push(Value::Text(like_pattern(term)));
        values.extend(keys.iter().map(|k| Value::Text(k.clone())));

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(values), |r| r.get(0))?
            .collect::<Result<Vec<OrderId>, _>>()?;
        Ok(ids)
    }

    /// Ids of orders owning a line item whose name contains the term.
    pub(crate) fn order_ids_with_item_name_like(&self, term: &str) -> StoreResult<Vec<OrderId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT order_id FROM order_items
             WHERE item_name LIKE ?1 ESCAPE '\\'",
        )?;
        let ids = stmt
            .query_map([like_pattern(term)], |r| r.get(0))?
            .collect::<Result<Vec<OrderId>, _>>()?;
        Ok(ids)
    }

    /// Orders of a recognized order type, still awaiting payment, whose last
    /// modification is strictly before the cutoff. Feeds the stale-order
    /// cleanup job.
    pub fn unpaid_order_ids(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<OrderId>> {
        let marks: Vec<String> = (3..=ORDER_TYPES.len() + 2).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT entity_id FROM entities
             WHERE status = ?1 AND modified_at < ?2 AND entity_type IN ({})
             ORDER BY entity_id ASC",
            marks.join(", ")
        );

        let mut values: Vec<Value> = Vec::with_capacity(ORDER_TYPES.len() + 2);
        values.push(Value::Text(STATUS_PENDING.to_string()));
        values.push(Value::Integer(cutoff.timestamp()));
        values.extend(ORDER_TYPES.iter().map(|t| Value::Text(t.to_string())));

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(values), |r| r.get(0))?
            .collect::<Result<Vec<OrderId>, _>>()?;
        Ok(ids)
    }
}
