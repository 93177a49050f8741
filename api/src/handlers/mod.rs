//! HTTP handlers
//!
//! Axum request handlers for the API endpoints. Handlers only translate
//! between HTTP and booking commands; every rule lives in `app`.

pub mod ratings;
pub mod reservations;
pub mod slots;

pub use ratings::{submit_rating, walker_rating};
pub use reservations::{
    cancel_reservation, complete_reservation, confirm_reservation, create_reservation,
    get_reservation, list_customer_reservations, list_walker_reservations,
};
pub use slots::{create_slots, delete_slot, get_slot, list_slots};
