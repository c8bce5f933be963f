//! Free-text / numeric order search.
//!
//! Exhaustive substring search over every attribute would not scale, so the
//! searchable field list defaults to the composite address indexes plus the
//! two identity fields staff actually paste into the search box, and is
//! overridable per call site.

use crate::error::StoreResult;
use crate::store::SqliteStore;
use crate::types::{OrderId, BILLING_ADDRESS_INDEX, SHIPPING_ADDRESS_INDEX};

/// Attribute fields consulted by default.
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    BILLING_ADDRESS_INDEX,
    SHIPPING_ADDRESS_INDEX,
    "_billing_last_name",
    "_billing_email",
];

pub struct OrderSearch<'a> {
    store: &'a SqliteStore,
    fields: Vec<String>,
}

impl<'a> OrderSearch<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self {
            store,
            fields: DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Replace the indexed attribute fields consulted by [`search`].
    ///
    /// [`search`]: OrderSearch::search
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Resolve a term to a deduplicated set of order ids.
    ///
    /// A term that parses as a non-negative integer seeds the result with
    /// that literal id whether or not such an order exists; filtering false
    /// positives is the caller's job. Attribute and line-item-name substring
    /// matches are unioned in on top.
    pub fn search(&self, term: &str) -> StoreResult<Vec<OrderId>> {
        let mut ids: Vec<OrderId> = Vec::new();

        if let Ok(n) = term.trim().parse::<u64>() {
            if let Ok(id) = OrderId::try_from(n) {
                ids.push(id);
            }
        }

        ids.extend(self.store.order_ids_with_attribute_like(&self.fields, term)?);
        ids.extend(self.store.order_ids_with_item_name_like(term)?);

        ids.sort_unstable();
        ids.dedup();
        log::debug!("search {term:?}: {} order ids", ids.len());
        Ok(ids)
    }
}
