use thiserror::Error;

use crate::types::OrderId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A second create for an id that already has a promoted row. Surfaced,
    /// never swallowed.
    #[error("Order {id} already has a promoted row")]
    DuplicateOrder { id: OrderId },

    /// The base entity behind an order id does not exist. Distinct from a
    /// missing promoted row, which is a valid not-yet-promoted state.
    #[error("No base entity with id {id}")]
    EntityNotFound { id: OrderId },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
