//! Boundary contracts between the repository and its storage collaborators.
//!
//! RULE: the repository never executes SQL. It talks to these capability
//! traits; the SQLite backend in `store` is one implementation, test fakes
//! and spies are another.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use crate::error::StoreResult;
use crate::order::OrderProps;
use crate::types::OrderId;

/// One column of an order-row write: `(column name, bound value)`.
pub type ColumnValue = (&'static str, Value);

/// A legacy-store base entity row.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: OrderId,
    pub entity_type: String,
    pub status: String,
    pub parent_id: OrderId,
    /// Free-text excerpt; orders keep the customer note here.
    pub excerpt: String,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Base entity load/save, keyed by entity id.
pub trait EntityStore {
    fn load_entity(&self, id: OrderId) -> StoreResult<Option<EntityRecord>>;

    /// Update the mutable base fields of an existing entity. Entity creation
    /// is the factory's job, not the repository's.
    fn save_entity(&self, record: &EntityRecord) -> StoreResult<()>;
}

/// The legacy schema-less attribute bag, reduced to a closed interface of
/// scalar get/set keyed by entity id.
pub trait AttributeStore {
    fn get_attribute(&self, id: OrderId, key: &str) -> StoreResult<Option<String>>;

    fn set_attribute(&self, id: OrderId, key: &str, value: &str) -> StoreResult<()>;
}

/// The promoted order table. Exactly one row per order id, keyed on the
/// primary key.
pub trait OrderRowStore {
    fn select_row(&self, id: OrderId) -> StoreResult<Option<OrderProps>>;

    /// Insert a new row. A second insert for the same id must fail with
    /// `StoreError::DuplicateOrder`, never succeed silently.
    fn insert_row(&self, id: OrderId, columns: &[ColumnValue]) -> StoreResult<()>;

    /// Update the listed columns only. Updating an id with no row is a
    /// no-op, matching the not-yet-promoted state.
    fn update_row(&self, id: OrderId, columns: &[ColumnValue]) -> StoreResult<()>;
}

/// Downstream owner of downloadable-content permissions. Invoked after a
/// write that changed the order's customer identity so existing permissions
/// follow the new owner.
pub trait CustomerDownloads {
    fn reassign_by_order(
        &self,
        order_id: OrderId,
        customer_id: i64,
        billing_email: &str,
    ) -> StoreResult<()>;
}

/// Reassigner that does nothing. For deployments without downloadable goods.
pub struct NoopCustomerDownloads;

impl CustomerDownloads for NoopCustomerDownloads {
    fn reassign_by_order(
        &self,
        _order_id: OrderId,
        _customer_id: i64,
        _billing_email: &str,
    ) -> StoreResult<()> {
        Ok(())
    }
}
