//! Larder Domain Concerns

pub mod carts;
pub mod checkout;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod profiles;
