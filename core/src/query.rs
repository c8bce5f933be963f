//! Composable boolean-match queries over customer identity.
//!
//! Callers hand in tagged terms (id, email, or a nested group); the builder
//! partitions them into per-field IN leaves and assembles the minimal
//! predicate tree that still expresses the match. The listing engine
//! translates the tree into an actual filter.

use serde::{Deserialize, Serialize};

/// A customer match term, tagged by the caller. Classification happens at
/// the edge via [`CustomerTerm::parse`], never inside the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CustomerTerm {
    Id(i64),
    Email(String),
    /// A nested list. Its own buckets are combined with AND, supporting
    /// "(customer A OR customer B) AND (email X)" compositions.
    Group(Vec<CustomerTerm>),
}

impl CustomerTerm {
    /// Classify a raw string the way listing callers hand them in.
    ///
    /// Email shape wins over numeric parsability: the local part of
    /// "5@example.com" is numeric, but the value is an email. Everything
    /// that is not email-shaped is coerced to a non-negative id, with
    /// unparseable input collapsing to id 0.
    pub fn parse(raw: &str) -> CustomerTerm {
        let raw = raw.trim();
        if is_email(raw) {
            CustomerTerm::Email(raw.to_string())
        } else {
            CustomerTerm::Id(raw.parse::<i64>().map(i64::abs).unwrap_or(0))
        }
    }
}

/// Minimal email shape test: one '@', a non-empty local part, and a dotted
/// domain. Deliverability is not this layer's problem.
fn is_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || raw.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRelation {
    And,
    Or,
}

/// The order field a leaf matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    BillingEmail,
    CustomerId,
}

impl CustomerField {
    /// Legacy attribute key for orders that predate the promoted table.
    pub fn attribute_key(self) -> &'static str {
        match self {
            CustomerField::BillingEmail => "_billing_email",
            CustomerField::CustomerId => "_customer_user",
        }
    }

    /// Promoted table column for orders that have one.
    pub fn column(self) -> &'static str {
        match self {
            CustomerField::BillingEmail => "billing_email",
            CustomerField::CustomerId => "customer_id",
        }
    }
}

/// A node of the recursive boolean predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum CustomerMatchNode {
    /// `field IN (values)`. Never carries an empty value list.
    In {
        field: CustomerField,
        values: Vec<String>,
    },
    /// Boolean combinator over two or more live children.
    Group {
        relation: MatchRelation,
        nodes: Vec<CustomerMatchNode>,
    },
}

/// Build the minimal predicate tree matching any of `terms`, related to the
/// caller's surrounding context by `relation`.
///
/// Empty leaves are elided entirely rather than emitted as impossible
/// predicates, and a combinator with fewer than two live children
/// degenerates to its single child or to `None`.
pub fn build_customer_match(
    terms: &[CustomerTerm],
    relation: MatchRelation,
) -> Option<CustomerMatchNode> {
    let mut emails: Vec<String> = Vec::new();
    let mut ids: Vec<String> = Vec::new();
    let mut nested: Vec<CustomerMatchNode> = Vec::new();

    for term in terms {
        match term {
            CustomerTerm::Email(email) => emails.push(email.clone()),
            CustomerTerm::Id(id) => ids.push((*id).max(0).to_string()),
            // Nested lists always tighten: their buckets AND together.
            CustomerTerm::Group(inner) => {
                if let Some(node) = build_customer_match(inner, MatchRelation::And) {
                    nested.push(node);
                }
            }
        }
    }

    let mut nodes: Vec<CustomerMatchNode> = Vec::new();
    if !emails.is_empty() {
        nodes.push(CustomerMatchNode::In {
            field: CustomerField::BillingEmail,
            values: emails,
        });
    }
    if !ids.is_empty() {
        nodes.push(CustomerMatchNode::In {
            field: CustomerField::CustomerId,
            values: ids,
        });
    }
    nodes.extend(nested);

    match nodes.len() {
        0 => None,
        1 => nodes.into_iter().next(),
        _ => Some(CustomerMatchNode::Group { relation, nodes }),
    }
}
