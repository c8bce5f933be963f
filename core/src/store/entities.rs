//! Legacy-store tables: base entities, attribute bags, and order line items.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::SqliteStore;
use crate::error::{StoreError, StoreResult};
use crate::storage::{AttributeStore, EntityRecord, EntityStore};
use crate::types::{ItemId, OrderId, TYPE_ORDER};

pub(super) fn epoch(ts: Option<DateTime<Utc>>) -> Option<i64> {
    ts.map(|t| t.timestamp())
}

pub(super) fn from_epoch(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

impl SqliteStore {
    // ── Factory and lookups ───────────────────────────────────────

    /// Insert a new base entity and return its assigned id. This is the
    /// factory path; the repository only ever updates existing entities.
    pub fn create_entity(
        &self,
        entity_type: &str,
        status: &str,
        parent_id: OrderId,
        modified_at: Option<DateTime<Utc>>,
    ) -> StoreResult<OrderId> {
        self.conn.execute(
            "INSERT INTO entities (entity_type, status, parent_id, excerpt, created_at, modified_at)
             VALUES (?1, ?2, ?3, '', ?4, ?4)",
            params![entity_type, status, parent_id, epoch(modified_at)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Entity type behind an id, or `None` for an unknown id.
    pub fn entity_type(&self, id: OrderId) -> StoreResult<Option<String>> {
        let t = self
            .conn
            .query_row(
                "SELECT entity_type FROM entities WHERE entity_id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(t)
    }

    /// Count of orders with the given status.
    pub fn order_count(&self, status: &str) -> StoreResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE entity_type = ?1 AND status = ?2",
            params![TYPE_ORDER, status],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    /// Resolve an order key to an order id. Promoted rows take precedence;
    /// orders that predate the table still resolve through their attribute.
    pub fn order_id_by_key(&self, order_key: &str) -> StoreResult<Option<OrderId>> {
        let promoted: Option<OrderId> = self
            .conn
            .query_row(
                "SELECT order_id FROM orders WHERE order_key = ?1",
                params![order_key],
                |r| r.get(0),
            )
            .optional()?;
        if promoted.is_some() {
            return Ok(promoted);
        }
        let legacy = self
            .conn
            .query_row(
                "SELECT entity_id FROM attributes WHERE attr_key = '_order_key' AND attr_value = ?1",
                params![order_key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(legacy)
    }

    // ── Line items ────────────────────────────────────────────────

    /// Append a line item to an order and return the item id.
    pub fn add_order_item(
        &self,
        order_id: OrderId,
        item_name: &str,
        item_type: &str,
    ) -> StoreResult<ItemId> {
        self.conn.execute(
            "INSERT INTO order_items (order_id, item_name, item_type) VALUES (?1, ?2, ?3)",
            params![order_id, item_name, item_type],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn set_item_attribute(&self, item_id: ItemId, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO item_attributes (item_id, attr_key, attr_value) VALUES (?1, ?2, ?3)
             ON CONFLICT (item_id, attr_key) DO UPDATE SET attr_value = excluded.attr_value",
            params![item_id, key, value],
        )?;
        Ok(())
    }
}

impl EntityStore for SqliteStore {
    fn load_entity(&self, id: OrderId) -> StoreResult<Option<EntityRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT entity_id, entity_type, status, parent_id, excerpt, created_at, modified_at
                 FROM entities WHERE entity_id = ?1",
                params![id],
                |r| {
                    Ok(EntityRecord {
                        id: r.get(0)?,
                        entity_type: r.get(1)?,
                        status: r.get(2)?,
                        parent_id: r.get(3)?,
                        excerpt: r.get(4)?,
                        created_at: from_epoch(r.get(5)?),
                        modified_at: from_epoch(r.get(6)?),
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn save_entity(&self, record: &EntityRecord) -> StoreResult<()> {
        let updated = self.conn.execute(
            "UPDATE entities SET entity_type = ?1, status = ?2, excerpt = ?3, modified_at = ?4
             WHERE entity_id = ?5",
            params![
                record.entity_type,
                record.status,
                record.excerpt,
                epoch(record.modified_at),
                record.id,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::EntityNotFound { id: record.id });
        }
        Ok(())
    }
}

impl AttributeStore for SqliteStore {
    fn get_attribute(&self, id: OrderId, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT attr_value FROM attributes WHERE entity_id = ?1 AND attr_key = ?2",
                params![id, key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_attribute(&self, id: OrderId, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO attributes (entity_id, attr_key, attr_value) VALUES (?1, ?2, ?3)
             ON CONFLICT (entity_id, attr_key) DO UPDATE SET attr_value = excluded.attr_value",
            params![id, key, value],
        )?;
        Ok(())
    }
}
