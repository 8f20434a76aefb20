//! Restaurant ordering domain: carts, checkout and the order lifecycle.

pub mod clock;
pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
