//! Lifecycle flags: unset-means-false defaults, set/get round trips, and
//! per-order independence.

use chrono::DateTime;

use ordertable_core::types::{STATUS_PENDING, TYPE_ORDER};
use ordertable_core::{LifecycleFlags, Order, OrderId, SqliteStore};

fn new_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn seed_order(store: &SqliteStore) -> OrderId {
    store
        .create_entity(TYPE_ORDER, STATUS_PENDING, 0, DateTime::from_timestamp(1_700_000_000, 0))
        .unwrap()
}

/// Every flag reads false before any set.
#[test]
fn flags_default_to_false() {
    let store = new_store();
    let id = seed_order(&store);
    let flags = LifecycleFlags::new(&store);

    assert!(!flags.download_permissions_granted(id).unwrap());
    assert!(!flags.recorded_sales(id).unwrap());
    assert!(!flags.recorded_coupon_usage_counts(id).unwrap());
    assert!(!flags.stock_reduced(id).unwrap());
}

#[test]
fn set_then_get_round_trips() {
    let store = new_store();
    let id = seed_order(&store);
    let flags = LifecycleFlags::new(&store);

    flags.set_download_permissions_granted(id, true).unwrap();
    assert!(flags.download_permissions_granted(id).unwrap());

    flags.set_download_permissions_granted(id, false).unwrap();
    assert!(!flags.download_permissions_granted(id).unwrap());
}

/// The four flags are independent of each other on the same order.
#[test]
fn flags_are_independent_per_key() {
    let store = new_store();
    let id = seed_order(&store);
    let flags = LifecycleFlags::new(&store);

    flags.set_recorded_sales(id, true).unwrap();

    assert!(flags.recorded_sales(id).unwrap());
    assert!(!flags.download_permissions_granted(id).unwrap());
    assert!(!flags.recorded_coupon_usage_counts(id).unwrap());
    assert!(!flags.stock_reduced(id).unwrap());
}

/// Setting a flag on order A leaves order B untouched.
#[test]
fn flags_are_independent_per_order() {
    let store = new_store();
    let a = seed_order(&store);
    let b = seed_order(&store);
    let flags = LifecycleFlags::new(&store);

    flags.set_stock_reduced(a, true).unwrap();

    assert!(flags.stock_reduced(a).unwrap());
    assert!(!flags.stock_reduced(b).unwrap());
}

/// The store is addressed through the order's identifier whether the caller
/// passes a handle or a raw id.
#[test]
fn order_handles_and_raw_ids_address_the_same_flag() {
    let store = new_store();
    let id = seed_order(&store);
    let flags = LifecycleFlags::new(&store);

    let order = Order::new(id);
    flags.set_recorded_coupon_usage_counts(&order, true).unwrap();

    assert!(flags.recorded_coupon_usage_counts(id).unwrap());
    assert!(flags.recorded_coupon_usage_counts(&order).unwrap());
}
