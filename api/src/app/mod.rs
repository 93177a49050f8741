//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports; every write
//! runs inside a unit of work handed out by the transaction coordinator.

pub mod commands;
pub mod coordinator;
pub mod rating_feedback;
pub mod reservation_engine;
pub mod slot_store;
pub mod validation;

pub use commands::{
    BookingCommands, CreateReservationCommand, CreateSlotsCommand, ReservationCommand,
    SubmitRatingCommand,
};
pub use coordinator::TransactionCoordinator;
#[allow(unused_imports)]
pub use rating_feedback::RatingFeedback;
#[allow(unused_imports)]
pub use reservation_engine::{ReservationEngine, ReservationRequest};
#[allow(unused_imports)]
pub use slot_store::SlotStore;
#[allow(unused_imports)]
pub use validation::{Check, DeclaredConstraints, NotInPast, Rule, ValidationPipeline};
