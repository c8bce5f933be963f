//! Bulk order listing: status/type/date filters, customer predicate trees,
//! exclusion lists, and optional pagination with a total count.

use chrono::{DateTime, Utc};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use super::SqliteStore;
use crate::error::StoreResult;
use crate::query::{CustomerMatchNode, MatchRelation};
use crate::types::{OrderId, TYPE_ORDER};

#[derive(Debug, Clone, Default)]
pub struct OrderListArgs {
    /// Entity type to list; defaults to live orders.
    pub entity_type: Option<String>,
    pub status: Option<String>,
    /// Customer identity predicate from `query::build_customer_match`.
    pub customer: Option<CustomerMatchNode>,
    pub exclude: Vec<OrderId>,
    pub modified_before: Option<DateTime<Utc>>,
    pub modified_after: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// When set, the result carries the total match count ignoring
    /// limit/offset.
    pub paginate: bool,
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub ids: Vec<OrderId>,
    pub total: Option<i64>,
}

impl SqliteStore {
    pub fn list_orders(&self, args: &OrderListArgs) -> StoreResult<OrderPage> {
        let mut clauses: Vec<String> = vec!["entity_type = ?".to_string()];
        let mut binds: Vec<Value> = vec![Value::Text(
            args.entity_type.clone().unwrap_or_else(|| TYPE_ORDER.to_string()),
        )];

        if let Some(status) = &args.status {
            clauses.push("status = ?".to_string());
            binds.push(Value::Text(status.clone()));
        }
        if let Some(node) = &args.customer {
            clauses.push(node_sql(node, &mut binds));
        }
        if !args.exclude.is_empty() {
            let marks = vec!["?"; args.exclude.len()].join(", ");
            clauses.push(format!("entity_id NOT IN ({marks})"));
            binds.extend(args.exclude.iter().map(|id| Value::Integer(*id)));
        }
        if let Some(before) = args.modified_before {
            clauses.push("modified_at < ?".to_string());
            binds.push(Value::Integer(before.timestamp()));
        }
        if let Some(after) = args.modified_after {
            clauses.push("modified_at > ?".to_string());
            binds.push(Value::Integer(after.timestamp()));
        }

        let where_sql = clauses.join(" AND ");

        let total = if args.paginate {
            let count_sql = format!("SELECT COUNT(*) FROM entities WHERE {where_sql}");
            let n: i64 = self.conn.query_row(
                &count_sql,
                params_from_iter(binds.clone()),
                |r| r.get(0),
            )?;
            Some(n)
        } else {
            None
        };

        let tail = match (args.limit, args.offset) {
            (Some(limit), Some(offset)) => format!(" LIMIT {limit} OFFSET {offset}"),
            (Some(limit), None) => format!(" LIMIT {limit}"),
            (None, Some(offset)) => format!(" LIMIT -1 OFFSET {offset}"),
            (None, None) => String::new(),
        };
        let sql = format!(
            "SELECT entity_id FROM entities WHERE {where_sql} ORDER BY entity_id DESC{tail}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(binds), |r| r.get(0))?
            .collect::<Result<Vec<OrderId>, _>>()?;

        Ok(OrderPage { ids, total })
    }
}

/// Render a predicate node as a WHERE fragment over `entities`, appending
/// its bound values.
///
/// Promoted orders no longer carry the legacy identity attributes, so a leaf
/// matches the promoted column as well as the attribute key.
fn node_sql(node: &CustomerMatchNode, binds: &mut Vec<Value>) -> String {
    match node {
        CustomerMatchNode::In { field, values } => {
            let marks = vec!["?"; values.len()].join(", ");
            let fragment = format!(
                "(entity_id IN (SELECT entity_id FROM attributes
                    WHERE attr_key = ? AND attr_value IN ({marks}))
                  OR entity_id IN (SELECT order_id FROM orders
                    WHERE {column} IN ({marks})))",
                column = field.column(),
            );
            binds.push(Value::Text(field.attribute_key().to_string()));
            binds.extend(values.iter().map(|v| Value::Text(v.clone())));
            binds.extend(values.iter().map(|v| Value::Text(v.clone())));
            fragment
        }
        CustomerMatchNode::Group { relation, nodes } => {
            let glue = match relation {
                MatchRelation::And => " AND ",
                MatchRelation::Or => " OR ",
            };
            let parts: Vec<String> = nodes.iter().map(|n| node_sql(n, binds)).collect();
            format!("({})", parts.join(glue))
        }
    }
}
