//! Cart errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("product not found")]
    ProductNotFound,

    #[error("item not in cart")]
    ItemNotFound,

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

/// Failure of the local cart storage backend.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage unavailable")]
    Io(#[from] io::Error),
}

/// Failure to mirror a cart to its server-side record.
#[derive(Debug, Error)]
pub enum CartMirrorError {
    #[error("failed to encode cart")]
    Encode(#[from] serde_json::Error),

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
