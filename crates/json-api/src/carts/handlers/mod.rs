//! Cart Handlers

pub(crate) mod checkout;
pub(crate) mod clear;
pub(crate) mod get;
