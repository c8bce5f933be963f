//! Dual-store order persistence.
//!
//! Orders historically lived in a schema-less per-entity attribute store.
//! This crate reconciles that store with a dedicated relational table of
//! typed columns: reads merge both stores, writes persist only what changed,
//! and the read-only services (customer match trees, refund aggregates,
//! search, the unpaid-order scan, lifecycle flags) cover the query needs of
//! order-listing callers.
//!
//! Concurrency: one synchronous operation per call, no internal locking.
//! Concurrent writers to the same order are last-write-wins at the column
//! level; the changed-columns-only update discipline narrows the race
//! window but does not close it.

pub mod error;
pub mod event;
pub mod flags;
pub mod order;
pub mod query;
pub mod repository;
pub mod search;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use event::{NotificationSink, NullSink, StoreEvent};
pub use flags::LifecycleFlags;
pub use order::{new_order_key, BillingAddress, Order, OrderProps, PromotedField, ShippingAddress};
pub use query::{build_customer_match, CustomerField, CustomerMatchNode, CustomerTerm, MatchRelation};
pub use repository::{OrderRepository, WriteMode};
pub use search::{OrderSearch, DEFAULT_SEARCH_FIELDS};
pub use storage::{
    AttributeStore, ColumnValue, CustomerDownloads, EntityRecord, EntityStore,
    NoopCustomerDownloads, OrderRowStore,
};
pub use store::{OrderListArgs, OrderPage, SqliteStore};
pub use types::{ItemId, OrderId};
