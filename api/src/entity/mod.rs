//! SeaORM entity models
//!
//! One module per table. Domain conversions live next to the repositories
//! in `adapters::postgres`.

pub mod prelude;

pub mod dogs;
pub mod ratings;
pub mod reservations;
pub mod slots;
pub mod walker_services;
pub mod walkers;
