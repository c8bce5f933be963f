//! Order search: literal id seeding, indexed-field substring matches,
//! line-item-name matches, deduplication, and the overridable field list.

use chrono::{DateTime, Utc};

use ordertable_core::types::{STATUS_PENDING, TYPE_ORDER};
use ordertable_core::{AttributeStore, OrderId, OrderSearch, SqliteStore};

fn new_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn seed_order(store: &SqliteStore) -> OrderId {
    store
        .create_entity(TYPE_ORDER, STATUS_PENDING, 0, DateTime::<Utc>::from_timestamp(1_700_000_000, 0))
        .unwrap()
}

/// A numeric term is both a literal id hit and a substring needle; an order
/// matched through both routes appears once.
#[test]
fn numeric_term_matches_id_and_fields_deduplicated() {
    let store = new_store();
    // Burn ids 1-4 so the interesting order lands on id 5.
    for _ in 0..4 {
        seed_order(&store);
    }
    let five = seed_order(&store);
    assert_eq!(five, 5);
    store
        .set_attribute(five, "_billing_email", "shopper5@example.com")
        .unwrap();
    store.set_attribute(five, "_billing_last_name", "Number5").unwrap();

    let ids = OrderSearch::new(&store).search("5").unwrap();
    assert_eq!(ids, vec![5]);
}

/// The literal id is seeded whether or not such an order exists; false
/// positives are the caller's problem.
#[test]
fn numeric_term_seeds_nonexistent_id() {
    let store = new_store();
    let ids = OrderSearch::new(&store).search("12345").unwrap();
    assert_eq!(ids, vec![12345]);
}

/// Two orders matched through different fields both come back.
#[test]
fn term_unions_across_orders() {
    let store = new_store();
    let a = seed_order(&store);
    let b = seed_order(&store);
    store
        .set_attribute(a, "_billing_address_index", "Ada Lovelace 12 Analytical Row London")
        .unwrap();
    store
        .set_attribute(b, "_billing_last_name", "Lovelace")
        .unwrap();

    let mut ids = OrderSearch::new(&store).search("Lovelace").unwrap();
    ids.sort_unstable();
    assert_eq!(ids, vec![a, b]);
}

/// Substring match is case-insensitive.
#[test]
fn field_match_is_case_insensitive() {
    let store = new_store();
    let id = seed_order(&store);
    store
        .set_attribute(id, "_billing_last_name", "Dijkstra")
        .unwrap();

    assert_eq!(OrderSearch::new(&store).search("dijkstra").unwrap(), vec![id]);
}

/// Line-item names are searched on top of the indexed fields.
#[test]
fn term_matches_line_item_names() {
    let store = new_store();
    let id = seed_order(&store);
    store.add_order_item(id, "Walnut Desk", "line_item").unwrap();

    assert_eq!(OrderSearch::new(&store).search("Desk").unwrap(), vec![id]);
    assert!(OrderSearch::new(&store).search("Lamp").unwrap().is_empty());
}

/// LIKE wildcards in the term are literals, not wildcards.
#[test]
fn wildcards_in_terms_are_escaped() {
    let store = new_store();
    let id = seed_order(&store);
    store
        .set_attribute(id, "_billing_last_name", "OnePercent")
        .unwrap();

    assert!(OrderSearch::new(&store).search("%").unwrap().is_empty());
    assert!(OrderSearch::new(&store).search("___").unwrap().is_empty());
}

/// The indexed-field list is an extension point: a field outside the
/// default list only matches after overriding.
#[test]
fn field_list_is_overridable() {
    let store = new_store();
    let id = seed_order(&store);
    store.set_attribute(id, "_billing_city", "Rotterdam").unwrap();

    assert!(OrderSearch::new(&store).search("Rotterdam").unwrap().is_empty());

    let ids = OrderSearch::new(&store)
        .with_fields(vec!["_billing_city".to_string()])
        .search("Rotterdam")
        .unwrap();
    assert_eq!(ids, vec![id]);
}

/// An empty override list disables field search entirely.
#[test]
fn empty_field_list_searches_nothing_but_items_and_ids() {
    let store = new_store();
    let id = seed_order(&store);
    store
        .set_attribute(id, "_billing_email", "ada@example.com")
        .unwrap();

    let ids = OrderSearch::new(&store)
        .with_fields(Vec::new())
        .search("ada")
        .unwrap();
    assert!(ids.is_empty());
}
