//! The order aggregate and its promoted-column change tracking.
//!
//! RULE: the change set is computed by fieldwise comparison of the current
//! props against the committed snapshot taken at hydrate/persist time.
//! No per-setter bookkeeping, no runtime introspection.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{OrderId, STATUS_PENDING, TYPE_ORDER};

/// Billing address block. Eleven of the promoted columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl BillingAddress {
    /// Space-joined non-empty fields, written to the billing address search
    /// index attribute so substring search hits any address component.
    pub fn search_index(&self) -> String {
        join_non_empty(&[
            &self.first_name,
            &self.last_name,
            &self.company,
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.postcode,
            &self.country,
            &self.email,
            &self.phone,
        ])
    }
}

/// Shipping address block. Never promoted; lives in the attribute store only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl ShippingAddress {
    /// Attribute keys the shipping fields are stored under, in field order.
    pub const ATTRIBUTE_KEYS: [&'static str; 9] = [
        "_shipping_first_name",
        "_shipping_last_name",
        "_shipping_company",
        "_shipping_address_1",
        "_shipping_address_2",
        "_shipping_city",
        "_shipping_state",
        "_shipping_postcode",
        "_shipping_country",
    ];

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "_shipping_first_name" => Some(&mut self.first_name),
            "_shipping_last_name" => Some(&mut self.last_name),
            "_shipping_company" => Some(&mut self.company),
            "_shipping_address_1" => Some(&mut self.address_1),
            "_shipping_address_2" => Some(&mut self.address_2),
            "_shipping_city" => Some(&mut self.city),
            "_shipping_state" => Some(&mut self.state),
            "_shipping_postcode" => Some(&mut self.postcode),
            "_shipping_country" => Some(&mut self.country),
            _ => None,
        }
    }

    /// Hydrate one field from its legacy attribute. Unknown keys are ignored.
    pub fn apply_attribute(&mut self, key: &str, value: &str) {
        if let Some(field) = self.field_mut(key) {
            *field = value.to_string();
        }
    }

    /// `(attribute key, value)` pairs for persisting back to the legacy store.
    pub fn attribute_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("_shipping_first_name", self.first_name.clone()),
            ("_shipping_last_name", self.last_name.clone()),
            ("_shipping_company", self.company.clone()),
            ("_shipping_address_1", self.address_1.clone()),
            ("_shipping_address_2", self.address_2.clone()),
            ("_shipping_city", self.city.clone()),
            ("_shipping_state", self.state.clone()),
            ("_shipping_postcode", self.postcode.clone()),
            ("_shipping_country", self.country.clone()),
        ]
    }

    pub fn search_index(&self) -> String {
        join_non_empty(&[
            &self.first_name,
            &self.last_name,
            &self.company,
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.postcode,
            &self.country,
        ])
    }
}

fn join_non_empty(parts: &[&String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The promoted order columns, exactly the relational table's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderProps {
    pub order_key: String,
    pub customer_id: i64,
    pub payment_method: String,
    pub payment_method_title: String,
    pub transaction_id: String,
    pub customer_ip_address: String,
    pub customer_user_agent: String,
    pub created_via: String,
    pub date_completed: Option<DateTime<Utc>>,
    pub date_paid: Option<DateTime<Utc>>,
    pub cart_hash: String,
    pub billing: BillingAddress,
}

/// Every promoted field, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotedField {
    OrderKey,
    CustomerId,
    PaymentMethod,
    PaymentMethodTitle,
    TransactionId,
    CustomerIpAddress,
    CustomerUserAgent,
    CreatedVia,
    DateCompleted,
    DatePaid,
    CartHash,
    BillingFirstName,
    BillingLastName,
    BillingCompany,
    BillingAddress1,
    BillingAddress2,
    BillingCity,
    BillingState,
    BillingPostcode,
    BillingCountry,
    BillingEmail,
    BillingPhone,
}

impl PromotedField {
    pub const ALL: [PromotedField; 22] = [
        PromotedField::OrderKey,
        PromotedField::CustomerId,
        PromotedField::PaymentMethod,
        PromotedField::PaymentMethodTitle,
        PromotedField::TransactionId,
        PromotedField::CustomerIpAddress,
        PromotedField::CustomerUserAgent,
        PromotedField::CreatedVia,
        PromotedField::DateCompleted,
        PromotedField::DatePaid,
        PromotedField::CartHash,
        PromotedField::BillingFirstName,
        PromotedField::BillingLastName,
        PromotedField::BillingCompany,
        PromotedField::BillingAddress1,
        PromotedField::BillingAddress2,
        PromotedField::BillingCity,
        PromotedField::BillingState,
        PromotedField::BillingPostcode,
        PromotedField::BillingCountry,
        PromotedField::BillingEmail,
        PromotedField::BillingPhone,
    ];

    /// Column name in the promoted order table.
    pub fn column(self) -> &'static str {
        match self {
            PromotedField::OrderKey => "order_key",
            PromotedField::CustomerId => "customer_id",
            PromotedField::PaymentMethod => "payment_method",
            PromotedField::PaymentMethodTitle => "payment_method_title",
            PromotedField::TransactionId => "transaction_id",
            PromotedField::CustomerIpAddress => "customer_ip_address",
            PromotedField::CustomerUserAgent => "customer_user_agent",
            PromotedField::CreatedVia => "created_via",
            PromotedField::DateCompleted => "date_completed",
            PromotedField::DatePaid => "date_paid",
            PromotedField::CartHash => "cart_hash",
            PromotedField::BillingFirstName => "billing_first_name",
            PromotedField::BillingLastName => "billing_last_name",
            PromotedField::BillingCompany => "billing_company",
            PromotedField::BillingAddress1 => "billing_address_1",
            PromotedField::BillingAddress2 => "billing_address_2",
            PromotedField::BillingCity => "billing_city",
            PromotedField::BillingState => "billing_state",
            PromotedField::BillingPostcode => "billing_postcode",
            PromotedField::BillingCountry => "billing_country",
            PromotedField::BillingEmail => "billing_email",
            PromotedField::BillingPhone => "billing_phone",
        }
    }

    /// Attribute key the field lived under before promotion. Read during
    /// hydration of orders that predate the promoted table.
    pub fn attribute_key(self) -> &'static str {
        match self {
            PromotedField::OrderKey => "_order_key",
            PromotedField::CustomerId => "_customer_user",
            PromotedField::PaymentMethod => "_payment_method",
            PromotedField::PaymentMethodTitle => "_payment_method_title",
            PromotedField::TransactionId => "_transaction_id",
            PromotedField::CustomerIpAddress => "_customer_ip_address",
            PromotedField::CustomerUserAgent => "_customer_user_agent",
            PromotedField::CreatedVia => "_created_via",
            PromotedField::DateCompleted => "_date_completed",
            PromotedField::DatePaid => "_date_paid",
            PromotedField::CartHash => "_cart_hash",
            PromotedField::BillingFirstName => "_billing_first_name",
            PromotedField::BillingLastName => "_billing_last_name",
            PromotedField::BillingCompany => "_billing_company",
            PromotedField::BillingAddress1 => "_billing_address_1",
            PromotedField::BillingAddress2 => "_billing_address_2",
            PromotedField::BillingCity => "_billing_city",
            PromotedField::BillingState => "_billing_state",
            PromotedField::BillingPostcode => "_billing_postcode",
            PromotedField::BillingCountry => "_billing_country",
            PromotedField::BillingEmail => "_billing_email",
            PromotedField::BillingPhone => "_billing_phone",
        }
    }
}

impl OrderProps {
    /// Current value of a field as it binds to its table column.
    pub fn column_value(&self, field: PromotedField) -> Value {
        match field {
            PromotedField::OrderKey => Value::Text(self.order_key.clone()),
            PromotedField::CustomerId => Value::Integer(self.customer_id),
            PromotedField::PaymentMethod => Value::Text(self.payment_method.clone()),
            PromotedField::PaymentMethodTitle => Value::Text(self.payment_method_title.clone()),
            PromotedField::TransactionId => Value::Text(self.transaction_id.clone()),
            PromotedField::CustomerIpAddress => Value::Text(self.customer_ip_address.clone()),
            PromotedField::CustomerUserAgent => Value::Text(self.customer_user_agent.clone()),
            PromotedField::CreatedVia => Value::Text(self.created_via.clone()),
            PromotedField::DateCompleted => epoch_value(self.date_completed),
            PromotedField::DatePaid => epoch_value(self.date_paid),
            PromotedField::CartHash => Value::Text(self.cart_hash.clone()),
            PromotedField::BillingFirstName => Value::Text(self.billing.first_name.clone()),
            PromotedField::BillingLastName => Value::Text(self.billing.last_name.clone()),
            PromotedField::BillingCompany => Value::Text(self.billing.company.clone()),
            PromotedField::BillingAddress1 => Value::Text(self.billing.address_1.clone()),
            PromotedField::BillingAddress2 => Value::Text(self.billing.address_2.clone()),
            PromotedField::BillingCity => Value::Text(self.billing.city.clone()),
            PromotedField::BillingState => Value::Text(self.billing.state.clone()),
            PromotedField::BillingPostcode => Value::Text(self.billing.postcode.clone()),
            PromotedField::BillingCountry => Value::Text(self.billing.country.clone()),
            PromotedField::BillingEmail => Value::Text(self.billing.email.clone()),
            PromotedField::BillingPhone => Value::Text(self.billing.phone.clone()),
        }
    }

    /// Hydrate one field from its pre-promotion attribute value.
    pub fn set_from_attribute(&mut self, field: PromotedField, raw: &str) {
        match field {
            PromotedField::OrderKey => self.order_key = raw.to_string(),
            PromotedField::CustomerId => self.customer_id = raw.parse().unwrap_or(0),
            PromotedField::PaymentMethod => self.payment_method = raw.to_string(),
            PromotedField::PaymentMethodTitle => self.payment_method_title = raw.to_string(),
            PromotedField::TransactionId => self.transaction_id = raw.to_string(),
            PromotedField::CustomerIpAddress => self.customer_ip_address = raw.to_string(),
            PromotedField::CustomerUserAgent => self.customer_user_agent = raw.to_string(),
            PromotedField::CreatedVia => self.created_via = raw.to_string(),
            PromotedField::DateCompleted => self.date_completed = parse_epoch(raw),
            PromotedField::DatePaid => self.date_paid = parse_epoch(raw),
            PromotedField::CartHash => self.cart_hash = raw.to_string(),
            PromotedField::BillingFirstName => self.billing.first_name = raw.to_string(),
            PromotedField::BillingLastName => self.billing.last_name = raw.to_string(),
            PromotedField::BillingCompany => self.billing.company = raw.to_string(),
            PromotedField::BillingAddress1 => self.billing.address_1 = raw.to_string(),
            PromotedField::BillingAddress2 => self.billing.address_2 = raw.to_string(),
            PromotedField::BillingCity => self.billing.city = raw.to_string(),
            PromotedField::BillingState => self.billing.state = raw.to_string(),
            PromotedField::BillingPostcode => self.billing.postcode = raw.to_string(),
            PromotedField::BillingCountry => self.billing.country = raw.to_string(),
            PromotedField::BillingEmail => self.billing.email = raw.to_string(),
            PromotedField::BillingPhone => self.billing.phone = raw.to_string(),
        }
    }

    /// Fields whose values differ from the given baseline.
    pub fn diff(&self, baseline: &OrderProps) -> Vec<PromotedField> {
        PromotedField::ALL
            .iter()
            .copied()
            .filter(|f| self.column_value(*f) != baseline.column_value(*f))
            .collect()
    }
}

fn epoch_value(ts: Option<DateTime<Utc>>) -> Value {
    match ts {
        Some(t) => Value::Integer(t.timestamp()),
        None => Value::Null,
    }
}

fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<i64>().ok().and_then(|s| DateTime::from_timestamp(s, 0))
}

/// An order mid read-modify-write cycle. The repository hydrates it, callers
/// mutate `props_mut()`, and the repository persists the difference.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    pub entity_type: String,
    pub status: String,
    pub date_modified: Option<DateTime<Utc>>,
    pub customer_note: String,
    pub shipping: ShippingAddress,
    props: OrderProps,
    committed: OrderProps,
}

impl Order {
    /// A fresh order shell carrying only its id. Hydrate via the repository
    /// or fill `props_mut()` before a create-mode write.
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            entity_type: TYPE_ORDER.to_string(),
            status: STATUS_PENDING.to_string(),
            date_modified: None,
            customer_note: String::new(),
            shipping: ShippingAddress::default(),
            props: OrderProps::default(),
            committed: OrderProps::default(),
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn props(&self) -> &OrderProps {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut OrderProps {
        &mut self.props
    }

    /// Replace the current promoted values wholesale (hydration path).
    pub fn replace_props(&mut self, props: OrderProps) {
        self.props = props;
    }

    /// Promoted fields mutated since the last hydrate/persist.
    pub fn changed_fields(&self) -> Vec<PromotedField> {
        self.props.diff(&self.committed)
    }

    /// Snapshot the current values as the new baseline, emptying the
    /// change set.
    pub fn mark_committed(&mut self) {
        self.committed = self.props.clone();
    }
}

impl From<&Order> for OrderId {
    fn from(order: &Order) -> OrderId {
        order.id()
    }
}

/// Generate a fresh opaque order key, assigned on first persistence.
pub fn new_order_key() -> String {
    format!("order_{}", Uuid::new_v4().simple())
}
