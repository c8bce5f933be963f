//! SQLite reference backend.
//!
//! RULE: only this module and its submodules execute SQL. The repository
//! and the read-only services go through the boundary traits in `storage`
//! or the query methods defined here.

mod entities;
mod listing;
mod orders;
mod refunds;
mod search;

pub use listing::{OrderListArgs, OrderPage};

use rusqlite::Connection;

use crate::error::StoreResult;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_legacy_entities.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_order_table.sql"))?;
        Ok(())
    }
}
