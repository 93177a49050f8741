//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.
//! Slot, reservation and rating repositories are implemented on the unit of
//! work itself, so every query runs inside the open transaction.

mod errors;
pub mod catalog_repo;
pub mod rating_repo;
pub mod reservation_repo;
pub mod slot_repo;
pub mod store;


pub use catalog_repo::PostgresCatalogRepository;
pub use store::{PostgresStore, PostgresUnitOfWork};
