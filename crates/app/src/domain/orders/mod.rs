//! Orders

pub mod creation;
pub mod errors;
pub mod models;
mod repository;
pub mod submission;

pub use creation::OrderCreationService;
pub use errors::{AuthorizationError, OrderCreationError, OrdersServiceError};
pub use repository::*;
pub use submission::*;
