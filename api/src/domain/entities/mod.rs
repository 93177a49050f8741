//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub mod actor;
pub mod catalog;
pub mod rating;
pub mod reservation;
pub mod slot;

pub use actor::{Actor, Role};
pub use catalog::{CustomerId, Dog, DogId, ServiceId, ServiceQuote, WalkerId};
pub use rating::{NewRating, Rating, RatingDirection, RatingId, RatingSummary};
pub use reservation::{
    NewReservation, Reservation, ReservationAction, ReservationId, ReservationStatus,
};
pub use slot::{NewSlot, Slot, SlotClaim, SlotId, SlotStatus};
