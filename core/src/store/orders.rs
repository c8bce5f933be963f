//! The promoted order table: row reads and column-scoped writes.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, ErrorCode, OptionalExtension};

use super::entities::from_epoch;
use super::SqliteStore;
use crate::error::{StoreError, StoreResult};
use crate::order::{BillingAddress, OrderProps};
use crate::storage::{ColumnValue, OrderRowStore};
use crate::types::OrderId;

impl OrderRowStore for SqliteStore {
    fn select_row(&self, id: OrderId) -> StoreResult<Option<OrderProps>> {
        let row = self
            .conn
            .query_row(
                "SELECT order_key, customer_id, payment_method, payment_method_title,
                        transaction_id, customer_ip_address, customer_user_agent, created_via,
                        date_completed, date_paid, cart_hash,
                        billing_first_name, billing_last_name, billing_company,
                        billing_address_1, billing_address_2, billing_city, billing_state,
                        billing_postcode, billing_country, billing_email, billing_phone
                 FROM orders WHERE order_id = ?1",
                params![id],
                |r| {
                    Ok(OrderProps {
                        order_key: r.get(0)?,
                        customer_id: r.get(1)?,
                        payment_method: r.get(2)?,
                        payment_method_title: r.get(3)?,
                        transaction_id: r.get(4)?,
                        customer_ip_address: r.get(5)?,
                        customer_user_agent: r.get(6)?,
                        created_via: r.get(7)?,
                        date_completed: from_epoch(r.get(8)?),
                        date_paid: from_epoch(r.get(9)?),
                        cart_hash: r.get(10)?,
                        billing: BillingAddress {
                            first_name: r.get(11)?,
                            last_name: r.get(12)?,
                            company: r.get(13)?,
                            address_1: r.get(14)?,
                            address_2: r.get(15)?,
                            city: r.get(16)?,
                            state: r.get(17)?,
                            postcode: r.get(18)?,
                            country: r.get(19)?,
                            email: r.get(20)?,
                            phone: r.get(21)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn insert_row(&self, id: OrderId, columns: &[ColumnValue]) -> StoreResult<()> {
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let marks: Vec<String> = (2..=columns.len() + 1).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO orders (order_id, {}) VALUES (?1, {})",
            names.join(", "),
            marks.join(", ")
        );

        let mut values: Vec<Value> = Vec::with_capacity(columns.len() + 1);
        values.push(Value::Integer(id));
        values.extend(columns.iter().map(|(_, v)| v.clone()));

        self.conn
            .execute(&sql, params_from_iter(values))
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    StoreError::DuplicateOrder { id }
                }
                other => StoreError::Database(other),
            })?;
        Ok(())
    }

    fn update_row(&self, id: OrderId, columns: &[ColumnValue]) -> StoreResult<()> {
        if columns.is_empty() {
            return Ok(());
        }
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{name} = ?{}", i + 2))
            .collect();
        let sql = format!(
            "UPDATE orders SET {} WHERE order_id = ?1",
            assignments.join(", ")
        );

        let mut values: Vec<Value> = Vec::with_capacity(columns.len() + 1);
        values.push(Value::Integer(id));
        values.extend(columns.iter().map(|(_, v)| v.clone()));

        // Zero rows affected means the order was never promoted; the
        // attribute store remains its source of truth.
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }
}
