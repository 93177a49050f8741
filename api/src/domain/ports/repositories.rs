//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).
//!
//! Slot, reservation and rating access only happens inside a [`UnitOfWork`],
//! so every read is fresh and every write belongs to exactly one atomic unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    CustomerId, Dog, DogId, NewRating, NewReservation, NewSlot, Rating, RatingDirection,
    Reservation, ReservationId, ReservationStatus, ServiceId, ServiceQuote, Slot, SlotId,
    SlotStatus, WalkerId,
};
use crate::error::DomainError;

/// Slot persistence, scoped to a unit of work
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Insert a batch of available slots
    ///
    /// Fails with `SlotConflict` if the walker already has a slot at any of
    /// the given start times.
    async fn insert_slots(&self, slots: &[NewSlot]) -> Result<Vec<Slot>, DomainError>;

    /// Find a slot by ID
    async fn find_slot(&self, id: &SlotId) -> Result<Option<Slot>, DomainError>;

    /// Slots of a walker starting in `[from, to)`, ordered by start time
    async fn find_slots_by_walker(
        &self,
        walker_id: &WalkerId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Slot>, DomainError>;

    /// Compare-and-set the slot status
    ///
    /// Returns the updated slot, or `None` when the slot is missing or not in
    /// `from`. Concurrent callers on the same slot are serialised by the store.
    async fn transition_slot(
        &self,
        id: &SlotId,
        from: SlotStatus,
        to: SlotStatus,
    ) -> Result<Option<Slot>, DomainError>;

    /// Delete a slot only if it is still available; returns whether a row was removed.
    ///
    /// Fails with `InvalidState` when any reservation, cancelled ones
    /// included, references the slot.
    async fn delete_available_slot(&self, id: &SlotId) -> Result<bool, DomainError>;
}

/// Reservation persistence, scoped to a unit of work
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new pending reservation
    ///
    /// Fails with `SlotUnavailable` if another non-cancelled reservation
    /// already references the slot.
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, DomainError>;

    /// Find a reservation by ID
    async fn find_reservation(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, DomainError>;

    /// Reservations made by a customer, newest first
    async fn find_reservations_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Reservation>, DomainError>;

    /// Reservations assigned to a walker, by service time
    async fn find_reservations_by_walker(
        &self,
        walker_id: &WalkerId,
    ) -> Result<Vec<Reservation>, DomainError>;

    /// Compare-and-set the reservation status, stamping the audit columns
    ///
    /// Returns the updated reservation, or `None` if it is no longer in `from`.
    async fn transition_reservation(
        &self,
        id: &ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
        at: DateTime<Utc>,
        actor: Option<Uuid>,
    ) -> Result<Option<Reservation>, DomainError>;
}

/// Rating persistence, scoped to a unit of work
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Append a rating; fails with `DuplicateRating` if one exists for the pair
    async fn insert_rating(&self, rating: &NewRating) -> Result<Rating, DomainError>;

    /// Find the rating for a reservation in one direction
    async fn find_rating(
        &self,
        reservation_id: &ReservationId,
        direction: RatingDirection,
    ) -> Result<Option<Rating>, DomainError>;

    /// Scores of every customer-to-walker rating a walker received
    async fn find_walker_scores(&self, walker_id: &WalkerId) -> Result<Vec<i16>, DomainError>;
}

/// One atomic unit against the store.
///
/// Dropping a unit without calling [`UnitOfWork::commit`] discards every
/// write made through it.
#[async_trait]
pub trait UnitOfWork: SlotRepository + ReservationRepository + RatingRepository + 'static {
    /// Publish all writes
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard all writes
    async fn rollback(self) -> Result<(), DomainError>;
}

/// The transactional-unit primitive supplied by the persistence adapter
#[async_trait]
pub trait TransactionalStore: Send + Sync + 'static {
    type Unit: UnitOfWork;

    /// Open a unit; may wait for a lock for at most `lock_timeout`
    async fn begin(&self, lock_timeout: std::time::Duration) -> Result<Self::Unit, DomainError>;
}

/// Read access to walkers, dogs and published prices
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find a dog by ID
    async fn find_dog(&self, id: &DogId) -> Result<Option<Dog>, DomainError>;

    /// Check that a walker exists
    async fn walker_exists(&self, id: &WalkerId) -> Result<bool, DomainError>;

    /// The walker's current price for a service, if they offer it
    async fn find_quote(
        &self,
        walker_id: &WalkerId,
        service_id: &ServiceId,
    ) -> Result<Option<ServiceQuote>, DomainError>;
}
