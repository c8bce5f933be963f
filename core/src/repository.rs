//! The dual-store order repository.
//!
//! Reads merge the legacy attribute store with the promoted table; writes
//! save the base entity plus legacy-only attributes, then insert or update
//! the promoted row. Lifecycle mode is an explicit argument to `write`, so
//! repository instances hold no per-order state and are safe to share.

use crate::error::{StoreError, StoreResult};
use crate::event::{NotificationSink, NullSink, StoreEvent};
use crate::order::{new_order_key, Order, OrderProps, PromotedField, ShippingAddress};
use crate::storage::{
    AttributeStore, ColumnValue, CustomerDownloads, EntityRecord, EntityStore,
    NoopCustomerDownloads, OrderRowStore,
};
use crate::types::{BILLING_ADDRESS_INDEX, SHIPPING_ADDRESS_INDEX};

/// Whether `write` is the first persistence of this order's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// First persistence: insert the full promoted payload.
    Create,
    /// Subsequent persistence: update only the changed columns.
    Update,
}

static NOOP_DOWNLOADS: NoopCustomerDownloads = NoopCustomerDownloads;
static NULL_SINK: NullSink = NullSink;

pub struct OrderRepository<'a> {
    entities: &'a dyn EntityStore,
    attributes: &'a dyn AttributeStore,
    rows: &'a dyn OrderRowStore,
    downloads: &'a dyn CustomerDownloads,
    sink: &'a dyn NotificationSink,
}

impl<'a> OrderRepository<'a> {
    /// Wire a repository over its storage backends, with no-op download
    /// reassignment and notifications.
    pub fn new(
        entities: &'a dyn EntityStore,
        attributes: &'a dyn AttributeStore,
        rows: &'a dyn OrderRowStore,
    ) -> Self {
        Self {
            entities,
            attributes,
            rows,
            downloads: &NOOP_DOWNLOADS,
            sink: &NULL_SINK,
        }
    }

    pub fn with_downloads(mut self, downloads: &'a dyn CustomerDownloads) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn with_sink(mut self, sink: &'a dyn NotificationSink) -> Self {
        self.sink = sink;
        self
    }

    /// Hydrate an order shell carrying only its id.
    ///
    /// Base entity first, then promoted props from legacy attributes. When a
    /// promoted row exists it overwrites every promoted field; an absent row
    /// is not an error, since orders created before table promotion keep
    /// their attribute-derived values.
    pub fn read(&self, order: &mut Order) -> StoreResult<()> {
        let id = order.id();

        let entity = self
            .entities
            .load_entity(id)?
            .ok_or(StoreError::EntityNotFound { id })?;
        order.entity_type = entity.entity_type;
        order.status = entity.status;
        order.date_modified = entity.modified_at;
        order.customer_note = entity.excerpt;

        let mut props = OrderProps::default();
        for field in PromotedField::ALL {
            if let Some(raw) = self.attributes.get_attribute(id, field.attribute_key())? {
                props.set_from_attribute(field, &raw);
            }
        }
        for key in ShippingAddress::ATTRIBUTE_KEYS {
            if let Some(raw) = self.attributes.get_attribute(id, key)? {
                order.shipping.apply_attribute(key, &raw);
            }
        }

        if let Some(row) = self.rows.select_row(id)? {
            props = row;
        } else {
            log::debug!("order {id}: no promoted row, keeping attribute values");
        }

        order.replace_props(props);
        order.mark_committed();
        Ok(())
    }

    /// Persist an order.
    ///
    /// The base-entity save and the promoted-row write are two separate
    /// storage calls with no shared transaction across the trait boundary;
    /// a failure between them leaves the stores inconsistent. Known
    /// weakness, inherited from the system this replaces (see DESIGN.md).
    pub fn write(&self, order: &mut Order, mode: WriteMode) -> StoreResult<()> {
        let id = order.id();

        if mode == WriteMode::Create && order.props().order_key.is_empty() {
            order.props_mut().order_key = new_order_key();
        }

        self.entities.save_entity(&EntityRecord {
            id,
            entity_type: order.entity_type.clone(),
            status: order.status.clone(),
            parent_id: 0,
            excerpt: order.customer_note.clone(),
            created_at: None,
            modified_at: order.date_modified,
        })?;

        // Legacy-only fields and the composite search indexes stay in the
        // attribute store.
        for (key, value) in order.shipping.attribute_pairs() {
            self.attributes.set_attribute(id, key, &value)?;
        }
        self.attributes
            .set_attribute(id, BILLING_ADDRESS_INDEX, &order.props().billing.search_index())?;
        self.attributes
            .set_attribute(id, SHIPPING_ADDRESS_INDEX, &order.shipping.search_index())?;

        // A new order's change set is the full promoted field set.
        let changed: Vec<PromotedField> = match mode {
            WriteMode::Create => PromotedField::ALL.to_vec(),
            WriteMode::Update => order.changed_fields(),
        };
        let payload: Vec<ColumnValue> = changed
            .iter()
            .map(|f| (f.column(), order.props().column_value(*f)))
            .collect();

        match mode {
            WriteMode::Create => self.rows.insert_row(id, &payload)?,
            WriteMode::Update if payload.is_empty() => {
                log::debug!("order {id}: no promoted columns changed, skipping row update");
            }
            WriteMode::Update => self.rows.update_row(id, &payload)?,
        }

        // Customer identity moved: existing download permissions follow it.
        if changed.contains(&PromotedField::CustomerId)
            || changed.contains(&PromotedField::BillingEmail)
        {
            self.downloads.reassign_by_order(
                id,
                order.props().customer_id,
                &order.props().billing.email,
            )?;
        }

        self.sink.notify(&StoreEvent::OrderPropsUpdated {
            order_id: id,
            changed: changed.iter().map(|f| f.column().to_string()).collect(),
            props: order.props().clone(),
        });

        order.mark_committed();
        log::debug!("order {id}: wrote {} promoted columns ({mode:?})", payload.len());
        Ok(())
    }
}
