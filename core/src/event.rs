//! Post-write notifications for external subscribers (analytics, webhooks).
//!
//! RULE: sinks are fire-and-forget. The repository never consults a return
//! value and never lets a subscriber failure poison a completed write.

use serde::{Deserialize, Serialize};

use crate::order::OrderProps;
use crate::types::OrderId;

/// Events emitted by the order repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Fired after every successful write, carrying the written order state
    /// and the promoted column names that were touched.
    OrderPropsUpdated {
        order_id: OrderId,
        changed: Vec<String>,
        props: OrderProps,
    },
}

pub trait NotificationSink {
    fn notify(&self, event: &StoreEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: &StoreEvent) {}
}
