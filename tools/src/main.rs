//! store-runner: headless exerciser for the dual-store order repository.
//!
//! Seeds a deterministic demo data set, walks the create -> read -> mutate
//! -> update cycle, then runs every read-only service and prints a summary.
//!
//! Usage:
//!   store-runner --db orders.db --seed 42 --orders 25
//!   store-runner --unpaid-days 3

use std::env;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use ordertable_core::types::{STATUS_PENDING, TYPE_ORDER, TYPE_ORDER_REFUND};
use ordertable_core::{
    build_customer_match, AttributeStore, CustomerTerm, LifecycleFlags, MatchRelation,
    NotificationSink, Order, OrderId, OrderListArgs, OrderRepository, OrderSearch, SqliteStore,
    StoreEvent, WriteMode,
};

const FIRST_NAMES: &[&str] = &["Ada", "Grace", "Edsger", "Barbara", "Tony", "Nik"];
const LAST_NAMES: &[&str] = &["Lovelace", "Hopper", "Dijkstra", "Liskov", "Hoare", "Wirth"];
const CITIES: &[&str] = &["Portland", "Leeds", "Rotterdam", "Boston", "Oxford", "Zurich"];
const PAYMENT_METHODS: &[(&str, &str)] = &[
    ("card", "Credit card"),
    ("bank_transfer", "Bank transfer"),
    ("cod", "Cash on delivery"),
];
const ITEM_NAMES: &[&str] = &["Blue Widget", "Red Widget", "Walnut Desk", "Brass Lamp"];
const STATUSES: &[&str] = &[STATUS_PENDING, "processing", "completed"];

/// Sink that logs every post-write event as JSON.
struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, event: &StoreEvent) {
        match serde_json::to_string(event) {
            Ok(json) => log::info!("event: {json}"),
            Err(e) => log::warn!("event serialization failed: {e}"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let order_count = parse_arg(&args, "--orders", 25usize);
    let unpaid_days = parse_arg(&args, "--unpaid-days", 3i64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");

    println!("store-runner");
    println!("  db:      {db}");
    println!("  seed:    {seed}");
    println!("  orders:  {order_count}");
    println!();

    let store = if db == ":memory:" {
        SqliteStore::in_memory()?
    } else {
        SqliteStore::open(db)?
    };
    store.migrate()?;

    let sink = LogSink;
    let repo = OrderRepository::new(&store, &store, &store).with_sink(&sink);

    let epoch = Utc
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid epoch"))?;

    let mut rng = Pcg64::seed_from_u64(seed);
    let ids = seed_orders(&store, &repo, &mut rng, order_count, epoch)?;
    let first = *ids.first().ok_or_else(|| anyhow::anyhow!("no orders seeded"))?;

    // Refund fixture against the first order: 12.50 with a 2.00 tax part.
    let refund = store.create_entity(TYPE_ORDER_REFUND, "completed", first, Some(epoch))?;
    store.set_attribute(refund, "_refund_amount", "12.50")?;
    let tax_item = store.add_order_item(refund, "Tax refund", "tax")?;
    store.set_item_attribute(tax_item, "tax_amount", "-2.00")?;

    // Read-modify-write cycle on the first order.
    let mut order = Order::new(first);
    repo.read(&mut order)?;
    let old_email = order.props().billing.email.clone();
    order.props_mut().billing.email = "updated@example.com".into();
    order.props_mut().transaction_id = "txn-rerun-001".into();
    repo.write(&mut order, WriteMode::Update)?;
    println!("order {first}: billing email {old_email} -> updated@example.com");

    // Lifecycle flags round trip.
    let flags = LifecycleFlags::new(&store);
    flags.set_recorded_sales(&order, true)?;
    println!("order {first}: recorded_sales = {}", flags.recorded_sales(first)?);

    // Read-only services.
    let hits = OrderSearch::new(&store).search("Widget")?;
    println!("search \"Widget\": {} orders", hits.len());

    let cutoff = epoch + Duration::days(unpaid_days);
    let unpaid = store.unpaid_order_ids(cutoff)?;
    println!("unpaid orders older than {cutoff}: {}", unpaid.len());

    let tree = build_customer_match(
        &[CustomerTerm::Email("updated@example.com".into()), CustomerTerm::Id(1)],
        MatchRelation::Or,
    );
    let page = store.list_orders(&OrderListArgs {
        customer: tree,
        paginate: true,
        limit: Some(10),
        ..OrderListArgs::default()
    })?;
    println!(
        "customer listing: {} of {} matching orders",
        page.ids.len(),
        page.total.unwrap_or(0)
    );

    println!();
    println!("refunds for order {first}:");
    println!("  total:    {:.2}", store.total_refunded(first)?);
    println!("  tax:      {:.2}", store.total_tax_refunded(first)?);
    println!("  shipping: {:.2}", store.total_shipping_refunded(first)?);
    println!();
    println!(
        "order counts: {} pending / {} processing / {} completed",
        store.order_count(STATUS_PENDING)?,
        store.order_count("processing")?,
        store.order_count("completed")?,
    );

    Ok(())
}

/// Create `count` demo orders through the factory + repository path and
/// return their ids.
fn seed_orders(
    store: &SqliteStore,
    repo: &OrderRepository<'_>,
    rng: &mut Pcg64,
    count: usize,
    epoch: DateTime<Utc>,
) -> Result<Vec<OrderId>> {
    let mut ids = Vec::with_capacity(count);

    for i in 0..count {
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];
        let modified = epoch + Duration::days(i as i64 % 7);
        let id = store.create_entity(TYPE_ORDER, status, 0, Some(modified))?;

        let mut order = Order::new(id);
        order.status = status.to_string();
        order.date_modified = Some(modified);

        let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        let (method, method_title) = PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())];

        let props = order.props_mut();
        props.customer_id = rng.gen_range(1..=8);
        props.payment_method = method.to_string();
        props.payment_method_title = method_title.to_string();
        props.created_via = "store-runner".to_string();
        props.billing.first_name = first.to_string();
        props.billing.last_name = last.to_string();
        props.billing.city = CITIES[rng.gen_range(0..CITIES.len())].to_string();
        props.billing.country = "US".to_string();
        props.billing.email = format!("{}.{}@example.com", first.to_lowercase(), i);
        if status == "completed" {
            props.date_paid = Some(modified);
            props.date_completed = Some(modified);
        }

        repo.write(&mut order, WriteMode::Create)?;

        let item = ITEM_NAMES[rng.gen_range(0..ITEM_NAMES.len())];
        store.add_order_item(id, item, "line_item")?;

        ids.push(id);
    }

    log::info!("seeded {count} demo orders");
    Ok(ids)
}

fn parse_arg<T: FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
