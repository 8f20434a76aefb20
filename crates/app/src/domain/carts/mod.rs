//! Carts

pub mod errors;
pub mod mirror;
pub mod models;
pub mod service;
pub mod storage;
pub mod store;
pub mod validation;

pub use errors::{CartMirrorError, CartStorageError, CartsServiceError};
pub use mirror::*;
pub use service::*;
pub use storage::*;
pub use store::*;
