//! Bulk listing: status/type filters, customer predicate trees resolved
//! against both stores, exclusion, pagination, and the order-key lookup.

use chrono::{DateTime, Duration, Utc};

use ordertable_core::types::{STATUS_PENDING, TYPE_ORDER, TYPE_ORDER_REFUND};
use ordertable_core::{
    build_customer_match, AttributeStore, CustomerTerm, MatchRelation, Order, OrderId,
    OrderListArgs, OrderRepository, SqliteStore, WriteMode,
};

fn new_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

fn seed_order(store: &SqliteStore, status: &str, modified: DateTime<Utc>) -> OrderId {
    store.create_entity(TYPE_ORDER, status, 0, Some(modified)).unwrap()
}

/// Create a promoted order with the given customer identity through the
/// repository path.
fn seed_promoted(store: &SqliteStore, customer_id: i64, email: &str) -> OrderId {
    let id = seed_order(store, STATUS_PENDING, ts(1_700_000_000));
    let repo = OrderRepository::new(store, store, store);
    let mut order = Order::new(id);
    order.props_mut().customer_id = customer_id;
    order.props_mut().billing.email = email.to_string();
    repo.write(&mut order, WriteMode::Create).unwrap();
    id
}

/// Default listing returns live orders only, newest id first.
#[test]
fn listing_defaults_to_live_orders() {
    let store = new_store();
    let a = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    let b = seed_order(&store, "completed", ts(1_700_000_000));
    store
        .create_entity(TYPE_ORDER_REFUND, "completed", a, Some(ts(1_700_000_000)))
        .unwrap();

    let page = store.list_orders(&OrderListArgs::default()).unwrap();
    assert_eq!(page.ids, vec![b, a]);
    assert_eq!(page.total, None);
}

#[test]
fn status_filter_narrows_the_listing() {
    let store = new_store();
    let pending = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    seed_order(&store, "completed", ts(1_700_000_000));

    let page = store
        .list_orders(&OrderListArgs {
            status: Some(STATUS_PENDING.to_string()),
            ..OrderListArgs::default()
        })
        .unwrap();
    assert_eq!(page.ids, vec![pending]);
}

/// A customer predicate matches orders still living in the attribute store
/// and orders already promoted to the table.
#[test]
fn customer_tree_matches_across_both_stores() {
    let store = new_store();

    let legacy = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    store.set_attribute(legacy, "_customer_user", "7").unwrap();

    let promoted = seed_promoted(&store, 7, "seven@example.com");
    seed_promoted(&store, 8, "eight@example.com");

    let tree = build_customer_match(&[CustomerTerm::Id(7)], MatchRelation::Or);
    let page = store
        .list_orders(&OrderListArgs {
            customer: tree,
            ..OrderListArgs::default()
        })
        .unwrap();

    let mut ids = page.ids.clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![legacy, promoted]);
}

/// OR across an email leaf and an id leaf unions the matches.
#[test]
fn customer_tree_or_unions_buckets() {
    let store = new_store();
    let by_id = seed_promoted(&store, 7, "seven@example.com");
    let by_email = seed_promoted(&store, 8, "eight@example.com");
    seed_promoted(&store, 9, "nine@example.com");

    let tree = build_customer_match(
        &[
            CustomerTerm::Id(7),
            CustomerTerm::Email("eight@example.com".into()),
        ],
        MatchRelation::Or,
    );
    let page = store
        .list_orders(&OrderListArgs {
            customer: tree,
            ..OrderListArgs::default()
        })
        .unwrap();

    let mut ids = page.ids.clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![by_id, by_email]);
}

/// A nested group tightens the match: id AND email must both hold.
#[test]
fn nested_customer_group_intersects() {
    let store = new_store();
    let both = seed_promoted(&store, 7, "seven@example.com");
    seed_promoted(&store, 7, "other@example.com");
    seed_promoted(&store, 8, "seven@example.com");

    let tree = build_customer_match(
        &[CustomerTerm::Group(vec![
            CustomerTerm::Id(7),
            CustomerTerm::Email("seven@example.com".into()),
        ])],
        MatchRelation::Or,
    );
    let page = store
        .list_orders(&OrderListArgs {
            customer: tree,
            ..OrderListArgs::default()
        })
        .unwrap();
    assert_eq!(page.ids, vec![both]);
}

#[test]
fn exclusion_list_drops_ids() {
    let store = new_store();
    let a = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    let b = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));

    let page = store
        .list_orders(&OrderListArgs {
            exclude: vec![a],
            ..OrderListArgs::default()
        })
        .unwrap();
    assert_eq!(page.ids, vec![b]);
}

/// Pagination slices the ids but reports the full match count.
#[test]
fn pagination_reports_the_total() {
    let store = new_store();
    for _ in 0..5 {
        seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    }

    let page = store
        .list_orders(&OrderListArgs {
            limit: Some(2),
            offset: Some(1),
            paginate: true,
            ..OrderListArgs::default()
        })
        .unwrap();
    assert_eq!(page.ids, vec![4, 3]);
    assert_eq!(page.total, Some(5));
}

#[test]
fn date_filters_bound_the_listing() {
    let store = new_store();
    let old = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    let new = seed_order(&store, STATUS_PENDING, ts(1_700_000_000) + Duration::days(5));

    let before = store
        .list_orders(&OrderListArgs {
            modified_before: Some(ts(1_700_000_000) + Duration::days(1)),
            ..OrderListArgs::default()
        })
        .unwrap();
    assert_eq!(before.ids, vec![old]);

    let after = store
        .list_orders(&OrderListArgs {
            modified_after: Some(ts(1_700_000_000) + Duration::days(1)),
            ..OrderListArgs::default()
        })
        .unwrap();
    assert_eq!(after.ids, vec![new]);
}

// ── Supplemental lookups ──────────────────────────────────────────

/// Order keys resolve through the promoted table, and through the legacy
/// attribute for orders that predate it.
#[test]
fn order_key_resolves_in_both_stores() {
    let store = new_store();

    let legacy = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    store.set_attribute(legacy, "_order_key", "order_legacy1").unwrap();

    let promoted = seed_promoted(&store, 7, "seven@example.com");
    let repo = OrderRepository::new(&store, &store, &store);
    let mut order = Order::new(promoted);
    repo.read(&mut order).unwrap();

    assert_eq!(store.order_id_by_key("order_legacy1").unwrap(), Some(legacy));
    assert_eq!(
        store.order_id_by_key(&order.props().order_key).unwrap(),
        Some(promoted)
    );
    assert_eq!(store.order_id_by_key("order_missing").unwrap(), None);
}

#[test]
fn order_count_counts_by_status() {
    let store = new_store();
    seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    let order = seed_order(&store, "completed", ts(1_700_000_000));
    // Refunds share the entity table but are not orders.
    store
        .create_entity(TYPE_ORDER_REFUND, STATUS_PENDING, order, Some(ts(1_700_000_000)))
        .unwrap();

    assert_eq!(store.order_count(STATUS_PENDING).unwrap(), 2);
    assert_eq!(store.order_count("completed").unwrap(), 1);
}

#[test]
fn entity_type_resolves_known_ids() {
    let store = new_store();
    let order = seed_order(&store, STATUS_PENDING, ts(1_700_000_000));
    let refund = store
        .create_entity(TYPE_ORDER_REFUND, "completed", order, Some(ts(1_700_000_000)))
        .unwrap();

    assert_eq!(store.entity_type(order).unwrap().as_deref(), Some(TYPE_ORDER));
    assert_eq!(store.entity_type(refund).unwrap().as_deref(), Some(TYPE_ORDER_REFUND));
    assert_eq!(store.entity_type(999).unwrap(), None);
}
