//! Test support shared by unit tests across the crate.

mod clock;
mod helpers;
mod orders;

pub(crate) use clock::FixedClock;
pub(crate) use helpers::*;
pub(crate) use orders::InMemoryOrdersRepository;
