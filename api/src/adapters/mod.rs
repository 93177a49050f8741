//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;

#[allow(unused_imports)]
pub use postgres::PostgresUnitOfWork;
pub use postgres::{PostgresCatalogRepository, PostgresStore};
