//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.
//!
//! `InMemoryBookingStore` is transactional: a unit of work holds the store's
//! single lock for its whole lifetime and writes to a private copy of the
//! tables. Commit publishes the copy; drop or rollback throws it away.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::entities::{
    CustomerId, Dog, DogId, NewRating, NewReservation, NewSlot, Rating, RatingDirection, RatingId,
    Reservation, ReservationId, ReservationStatus, ServiceId, ServiceQuote, Slot, SlotId,
    SlotStatus, WalkerId,
};
use crate::domain::ports::{
    CatalogRepository, Clock, RatingRepository, ReservationRepository, SlotRepository,
    TransactionalStore, UnitOfWork,
};
use crate::error::DomainError;

// ============================================================================
// In-Memory Booking Store
// ============================================================================

/// Committed state of the in-memory store
#[derive(Debug, Clone, Default)]
pub struct BookingTables {
    pub slots: HashMap<SlotId, Slot>,
    pub reservations: HashMap<ReservationId, Reservation>,
    pub ratings: Vec<Rating>,
}

#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    tables: Arc<AsyncMutex<BookingTables>>,
    fail_reservation_inserts: Arc<AtomicBool>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(self, slot: Slot) -> Self {
        self.tables
            .try_lock()
            .expect("store is idle while building")
            .slots
            .insert(slot.id, slot);
        self
    }

    pub fn with_reservation(self, reservation: Reservation) -> Self {
        self.tables
            .try_lock()
            .expect("store is idle while building")
            .reservations
            .insert(reservation.id, reservation);
        self
    }

    /// Every `insert_reservation` fails with a database error
    pub fn failing_reservation_inserts(self) -> Self {
        self.fail_reservation_inserts.store(true, Ordering::SeqCst);
        self
    }

    /// Committed state of a slot
    pub async fn slot(&self, id: &SlotId) -> Option<Slot> {
        self.tables.lock().await.slots.get(id).cloned()
    }

    pub async fn slot_count(&self) -> usize {
        self.tables.lock().await.slots.len()
    }

    /// Committed state of a reservation
    pub async fn reservation(&self, id: &ReservationId) -> Option<Reservation> {
        self.tables.lock().await.reservations.get(id).cloned()
    }

    /// Every committed reservation that ever referenced a slot
    pub async fn reservations_for_slot(&self, slot_id: &SlotId) -> Vec<Reservation> {
        self.tables
            .lock()
            .await
            .reservations
            .values()
            .filter(|r| r.slot_id == *slot_id)
            .cloned()
            .collect()
    }

    /// Take the store lock, as a long-running unit of work would
    pub async fn hold_lock(&self) -> OwnedMutexGuard<BookingTables> {
        self.tables.clone().lock_owned().await
    }
}

#[async_trait]
impl TransactionalStore for InMemoryBookingStore {
    type Unit = InMemoryUnitOfWork;

    async fn begin(&self, lock_timeout: std::time::Duration) -> Result<Self::Unit, DomainError> {
        let guard = tokio::time::timeout(lock_timeout, self.tables.clone().lock_owned())
            .await
            .map_err(|_| DomainError::Timeout("Timed out waiting for the store lock".to_string()))?;
        let working = BookingTables::clone(&guard);

        Ok(InMemoryUnitOfWork {
            guard,
            working: Mutex::new(working),
            fail_reservation_inserts: self.fail_reservation_inserts.load(Ordering::SeqCst),
        })
    }
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<BookingTables>,
    working: Mutex<BookingTables>,
    fail_reservation_inserts: bool,
}

impl InMemoryUnitOfWork {
    fn tables(&self) -> std::sync::MutexGuard<'_, BookingTables> {
        self.working.lock().unwrap()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self) -> Result<(), DomainError> {
        let mut guard = self.guard;
        *guard = self.working.into_inner().unwrap();
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl SlotRepository for InMemoryUnitOfWork {
    async fn insert_slots(&self, slots: &[NewSlot]) -> Result<Vec<Slot>, DomainError> {
        let mut tables = self.tables();

        let mut taken: HashSet<(WalkerId, DateTime<Utc>)> = tables
            .slots
            .values()
            .map(|s| (s.walker_id, s.starts_at))
            .collect();
        for new_slot in slots {
            if !taken.insert((new_slot.walker_id, new_slot.starts_at)) {
                return Err(DomainError::SlotConflict(format!(
                    "Walker {} already has a slot at {}",
                    new_slot.walker_id,
                    new_slot.starts_at.to_rfc3339()
                )));
            }
        }

        let created: Vec<Slot> = slots
            .iter()
            .map(|new_slot| Slot {
                id: SlotId::new(),
                walker_id: new_slot.walker_id,
                starts_at: new_slot.starts_at,
                status: SlotStatus::Available,
                created_at: Utc::now(),
            })
            .collect();
        for slot in &created {
            tables.slots.insert(slot.id, slot.clone());
        }
        Ok(created)
    }

    async fn find_slot(&self, id: &SlotId) -> Result<Option<Slot>, DomainError> {
        Ok(self.tables().slots.get(id).cloned())
    }

    async fn find_slots_by_walker(
        &self,
        walker_id: &WalkerId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Slot>, DomainError> {
        let mut slots: Vec<Slot> = self
            .tables()
            .slots
            .values()
            .filter(|s| s.walker_id == *walker_id)
            .filter(|s| from.map_or(true, |from| s.starts_at >= from))
            .filter(|s| to.map_or(true, |to| s.starts_at < to))
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.starts_at);
        Ok(slots)
    }

    async fn transition_slot(
        &self,
        id: &SlotId,
        from: SlotStatus,
        to: SlotStatus,
    ) -> Result<Option<Slot>, DomainError> {
        let mut tables = self.tables();
        match tables.slots.get_mut(id) {
            Some(slot) if slot.status == from => {
                slot.status = to;
                Ok(Some(slot.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_available_slot(&self, id: &SlotId) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        if !tables.slots.get(id).is_some_and(Slot::is_available) {
            return Ok(false);
        }
        // Same restriction as the reservations.slot_id foreign key
        if tables.reservations.values().any(|r| r.slot_id == *id) {
            return Err(Slot::has_history(id));
        }
        tables.slots.remove(id);
        Ok(true)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryUnitOfWork {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, DomainError> {
        if self.fail_reservation_inserts {
            return Err(DomainError::Database(
                "simulated reservation write failure".to_string(),
            ));
        }

        let mut tables = self.tables();
        if tables
            .reservations
            .values()
            .any(|r| r.slot_id == reservation.slot_id && r.status.holds_slot())
        {
            return Err(DomainError::SlotUnavailable(format!(
                "Slot {} already has an active reservation",
                reservation.slot_id
            )));
        }

        let created = reservation.clone().into_reservation();
        tables.reservations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_reservation(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, DomainError> {
        Ok(self.tables().reservations.get(id).cloned())
    }

    async fn find_reservations_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        let mut reservations: Vec<Reservation> = self
            .tables()
            .reservations
            .values()
            .filter(|r| r.customer_id == *customer_id)
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(reservations)
    }

    async fn find_reservations_by_walker(
        &self,
        walker_id: &WalkerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        let mut reservations: Vec<Reservation> = self
            .tables()
            .reservations
            .values()
            .filter(|r| r.walker_id == *walker_id)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| r.service_at);
        Ok(reservations)
    }

    async fn transition_reservation(
        &self,
        id: &ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
        at: DateTime<Utc>,
        actor: Option<Uuid>,
    ) -> Result<Option<Reservation>, DomainError> {
        let mut tables = self.tables();
        match tables.reservations.get_mut(id) {
            Some(reservation) if reservation.status == from => {
                reservation.stamp(to, at, actor);
                Ok(Some(reservation.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl RatingRepository for InMemoryUnitOfWork {
    async fn insert_rating(&self, rating: &NewRating) -> Result<Rating, DomainError> {
        let mut tables = self.tables();
        if tables
            .ratings
            .iter()
            .any(|r| r.reservation_id == rating.reservation_id && r.direction == rating.direction)
        {
            return Err(DomainError::DuplicateRating(format!(
                "Reservation {} already has a {} rating",
                rating.reservation_id, rating.direction
            )));
        }

        let created = Rating {
            id: RatingId::new(),
            reservation_id: rating.reservation_id,
            direction: rating.direction,
            score: rating.score,
            comment: rating.comment.clone(),
            created_at: Utc::now(),
        };
        tables.ratings.push(created.clone());
        Ok(created)
    }

    async fn find_rating(
        &self,
        reservation_id: &ReservationId,
        direction: RatingDirection,
    ) -> Result<Option<Rating>, DomainError> {
        Ok(self
            .tables()
            .ratings
            .iter()
            .find(|r| r.reservation_id == *reservation_id && r.direction == direction)
            .cloned())
    }

    async fn find_walker_scores(&self, walker_id: &WalkerId) -> Result<Vec<i16>, DomainError> {
        let tables = self.tables();
        Ok(tables
            .ratings
            .iter()
            .filter(|r| r.direction == RatingDirection::CustomerToWalker)
            .filter(|r| {
                tables
                    .reservations
                    .get(&r.reservation_id)
                    .is_some_and(|res| res.walker_id == *walker_id)
            })
            .map(|r| r.score)
            .collect())
    }
}

// ============================================================================
// In-Memory Catalog
// ============================================================================

#[derive(Default)]
struct CatalogTables {
    dogs: HashMap<DogId, Dog>,
    walkers: HashSet<WalkerId>,
    quotes: HashMap<(WalkerId, ServiceId), i64>,
}

/// Walkers, dogs and prices; clones share the same data
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    tables: Arc<RwLock<CatalogTables>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dog(self, dog: Dog) -> Self {
        self.tables.write().unwrap().dogs.insert(dog.id, dog);
        self
    }

    pub fn with_walker(self, walker_id: WalkerId) -> Self {
        self.tables.write().unwrap().walkers.insert(walker_id);
        self
    }

    pub fn with_quote(self, walker_id: WalkerId, service_id: ServiceId, price_cents: i64) -> Self {
        self.set_quote(walker_id, service_id, price_cents);
        self
    }

    /// Change a published price
    pub fn set_quote(&self, walker_id: WalkerId, service_id: ServiceId, price_cents: i64) {
        self.tables
            .write()
            .unwrap()
            .quotes
            .insert((walker_id, service_id), price_cents);
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn find_dog(&self, id: &DogId) -> Result<Option<Dog>, DomainError> {
        Ok(self.tables.read().unwrap().dogs.get(id).cloned())
    }

    async fn walker_exists(&self, id: &WalkerId) -> Result<bool, DomainError> {
        Ok(self.tables.read().unwrap().walkers.contains(id))
    }

    async fn find_quote(
        &self,
        walker_id: &WalkerId,
        service_id: &ServiceId,
    ) -> Result<Option<ServiceQuote>, DomainError> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .quotes
            .get(&(*walker_id, *service_id))
            .map(|price_cents| ServiceQuote {
                walker_id: *walker_id,
                service_id: *service_id,
                price_cents: *price_cents,
            }))
    }
}

// ============================================================================
// Fixed Clock
// ============================================================================

/// A clock that only moves when told to
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
