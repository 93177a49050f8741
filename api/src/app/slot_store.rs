//! Slot Store
//!
//! Owns the availability state of walker calendars. Bulk creation, deletion
//! and listing run in their own units of work; `try_claim` and `release` are
//! called by the reservation engine inside the unit it already holds.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::coordinator::TransactionCoordinator;
use crate::domain::entities::{Actor, NewSlot, Slot, SlotClaim, SlotId, SlotStatus, WalkerId};
use crate::domain::ports::{SlotRepository, TransactionalStore};
use crate::error::DomainError;

/// Atomically move a slot from `Available` to `Reserved`.
///
/// The store serialises concurrent compare-and-set attempts on the same slot,
/// so exactly one caller wins.
pub async fn try_claim<R>(slots: &R, slot_id: &SlotId) -> Result<SlotClaim, DomainError>
where
    R: SlotRepository + ?Sized,
{
    match slots
        .transition_slot(slot_id, SlotStatus::Available, SlotStatus::Reserved)
        .await?
    {
        Some(slot) => Ok(SlotClaim::from_slot(&slot)),
        None => {
            tracing::warn!(slot_id = %slot_id, "Slot claim lost");
            Err(DomainError::SlotUnavailable(format!(
                "Slot {} is not available",
                slot_id
            )))
        }
    }
}

/// Move a slot from `Reserved` back to `Available`
pub async fn release<R>(slots: &R, slot_id: &SlotId) -> Result<Slot, DomainError>
where
    R: SlotRepository + ?Sized,
{
    slots
        .transition_slot(slot_id, SlotStatus::Reserved, SlotStatus::Available)
        .await?
        .ok_or_else(|| DomainError::InvalidState(format!("Slot {} is not reserved", slot_id)))
}

/// Service for declaring and managing availability
pub struct SlotStore<S>
where
    S: TransactionalStore,
{
    coordinator: Arc<TransactionCoordinator<S>>,
}

impl<S> SlotStore<S>
where
    S: TransactionalStore,
{
    pub fn new(coordinator: Arc<TransactionCoordinator<S>>) -> Self {
        Self { coordinator }
    }

    /// Create available slots every `interval_minutes` from `start` until `end`
    ///
    /// Re-declaring a window that overlaps existing slot start times fails
    /// with `SlotConflict` and creates nothing.
    pub async fn create_slots(
        &self,
        walker_id: WalkerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_minutes: i64,
    ) -> Result<Vec<Slot>, DomainError> {
        let new_slots = NewSlot::generate(walker_id, start, end, interval_minutes)?;

        let slots = self
            .coordinator
            .run_atomic(move |uow| async move { uow.insert_slots(&new_slots).await })
            .await?;

        tracing::info!(
            walker_id = %walker_id,
            count = slots.len(),
            "Created slots"
        );
        Ok(slots)
    }

    /// Delete an available slot; only its walker or an administrator may do so
    pub async fn delete_slot(&self, slot_id: SlotId, actor: Actor) -> Result<(), DomainError> {
        self.coordinator
            .run_atomic(move |uow| async move {
                let slot = uow
                    .find_slot(&slot_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound(format!("Slot {} not found", slot_id)))?;

                if !actor.is_admin() && !actor.is_walker(&slot.walker_id) {
                    return Err(DomainError::Forbidden(
                        "Only the slot's walker or an administrator can delete it".to_string(),
                    ));
                }

                if !uow.delete_available_slot(&slot_id).await? {
                    return Err(DomainError::InvalidState(format!(
                        "Slot {} is reserved and cannot be deleted",
                        slot_id
                    )));
                }
                Ok(())
            })
            .await?;

        tracing::info!(slot_id = %slot_id, "Deleted slot");
        Ok(())
    }

    /// Get a single slot
    pub async fn get_slot(&self, slot_id: SlotId) -> Result<Slot, DomainError> {
        self.coordinator
            .run_atomic(move |uow| async move {
                uow.find_slot(&slot_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound(format!("Slot {} not found", slot_id)))
            })
            .await
    }

    /// List a walker's slots in an optional time range
    pub async fn list_slots(
        &self,
        walker_id: WalkerId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Slot>, DomainError> {
        self.coordinator
            .run_atomic(move |uow| async move {
                uow.find_slots_by_walker(&walker_id, from, to).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CustomerId, Role};
    use crate::test_utils::{at_hour, test_slot, test_slot_reserved, InMemoryBookingStore};
    use std::time::Duration;

    fn create_store(store: &InMemoryBookingStore) -> SlotStore<InMemoryBookingStore> {
        SlotStore::new(Arc::new(TransactionCoordinator::new(
            Arc::new(store.clone()),
            Duration::from_secs(2),
        )))
    }

    // =========================================================================
    // create_slots tests
    // =========================================================================

    #[tokio::test]
    async fn create_slots_hourly_window() {
        let store = InMemoryBookingStore::new();
        let walker_id = WalkerId::new();

        let slots = create_store(&store)
            .create_slots(walker_id, at_hour(9), at_hour(11), 60)
            .await
            .unwrap();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].starts_at, at_hour(9));
        assert_eq!(slots[1].starts_at, at_hour(10));
        assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
        assert_eq!(store.slot_count().await, 2);
    }

    #[tokio::test]
    async fn create_slots_invalid_range() {
        let store = InMemoryBookingStore::new();
        let service = create_store(&store);

        let err = service
            .create_slots(WalkerId::new(), at_hour(11), at_hour(9), 60)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange(_)));

        let err = service
            .create_slots(WalkerId::new(), at_hour(9), at_hour(11), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange(_)));

        let err = service
            .create_slots(WalkerId::new(), at_hour(9), at_hour(11), i64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange(_)));
        assert_eq!(store.slot_count().await, 0);
    }

    #[tokio::test]
    async fn recreating_existing_range_conflicts_without_duplicates() {
        let store = InMemoryBookingStore::new();
        let service = create_store(&store);
        let walker_id = WalkerId::new();

        service
            .create_slots(walker_id, at_hour(9), at_hour(11), 60)
            .await
            .unwrap();

        // 10:00 already exists, 11:00 does not: nothing is created
        let err = service
            .create_slots(walker_id, at_hour(10), at_hour(12), 60)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::SlotConflict(_)));
        assert_eq!(store.slot_count().await, 2);
    }

    #[tokio::test]
    async fn same_times_for_different_walkers_do_not_conflict() {
        let store = InMemoryBookingStore::new();
        let service = create_store(&store);

        service
            .create_slots(WalkerId::new(), at_hour(9), at_hour(10), 60)
            .await
            .unwrap();
        service
            .create_slots(WalkerId::new(), at_hour(9), at_hour(10), 60)
            .await
            .unwrap();

        assert_eq!(store.slot_count().await, 2);
    }

    // =========================================================================
    // try_claim / release tests
    // =========================================================================

    #[tokio::test]
    async fn claim_then_release_round_trip() {
        let slot = test_slot(WalkerId::new(), at_hour(9));
        let store = InMemoryBookingStore::new().with_slot(slot.clone());
        let coordinator = TransactionCoordinator::new(Arc::new(store.clone()), Duration::from_secs(2));
        let slot_id = slot.id;

        let claim = coordinator
            .run_atomic(move |uow| async move { try_claim(&*uow, &slot_id).await })
            .await
            .unwrap();
        assert_eq!(claim.slot_id(), slot.id);
        assert_eq!(claim.starts_at(), slot.starts_at);
        assert_eq!(store.slot(&slot.id).await.unwrap().status, SlotStatus::Reserved);

        coordinator
            .run_atomic(move |uow| async move { release(&*uow, &slot_id).await })
            .await
            .unwrap();
        assert_eq!(store.slot(&slot.id).await.unwrap().status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn claim_reserved_or_missing_slot_is_unavailable() {
        let reserved = test_slot_reserved(WalkerId::new(), at_hour(9));
        let store = InMemoryBookingStore::new().with_slot(reserved.clone());
        let coordinator = TransactionCoordinator::new(Arc::new(store), Duration::from_secs(2));
        let reserved_id = reserved.id;

        let err = coordinator
            .run_atomic(move |uow| async move { try_claim(&*uow, &reserved_id).await })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable(_)));

        let missing = SlotId::new();
        let err = coordinator
            .run_atomic(move |uow| async move { try_claim(&*uow, &missing).await })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable(_)));
    }

    #[tokio::test]
    async fn release_available_slot_is_invalid_state() {
        let slot = test_slot(WalkerId::new(), at_hour(9));
        let store = InMemoryBookingStore::new().with_slot(slot.clone());
        let coordinator = TransactionCoordinator::new(Arc::new(store), Duration::from_secs(2));
        let slot_id = slot.id;

        let err = coordinator
            .run_atomic(move |uow| async move { release(&*uow, &slot_id).await })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    // =========================================================================
    // delete_slot tests
    // =========================================================================

    #[tokio::test]
    async fn walker_deletes_own_available_slot() {
        let walker_id = WalkerId::new();
        let slot = test_slot(walker_id, at_hour(9));
        let store = InMemoryBookingStore::new().with_slot(slot.clone());

        create_store(&store)
            .delete_slot(slot.id, Actor::walker(walker_id))
            .await
            .unwrap();

        assert!(store.slot(&slot.id).await.is_none());
    }

    #[tokio::test]
    async fn reserved_slot_cannot_be_deleted() {
        let walker_id = WalkerId::new();
        let slot = test_slot_reserved(walker_id, at_hour(9));
        let store = InMemoryBookingStore::new().with_slot(slot.clone());

        let err = create_store(&store)
            .delete_slot(slot.id, Actor::walker(walker_id))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidState(_)));
        assert!(store.slot(&slot.id).await.is_some());
    }

    #[tokio::test]
    async fn other_users_cannot_delete_slot() {
        let slot = test_slot(WalkerId::new(), at_hour(9));
        let store = InMemoryBookingStore::new().with_slot(slot.clone());
        let service = create_store(&store);

        for actor in [
            Actor::walker(WalkerId::new()),
            Actor::customer(CustomerId(slot.walker_id.0)),
        ] {
            let err = service.delete_slot(slot.id, actor).await.unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)));
        }

        service
            .delete_slot(slot.id, Actor::new(uuid::Uuid::new_v4(), Role::Admin))
            .await
            .unwrap();
        assert_eq!(store.slot_count().await, 0);
    }

    #[tokio::test]
    async fn delete_missing_slot_not_found() {
        let store = InMemoryBookingStore::new();
        let err = create_store(&store)
            .delete_slot(SlotId::new(), Actor::admin(uuid::Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    // =========================================================================
    // list_slots tests
    // =========================================================================

    #[tokio::test]
    async fn list_slots_filters_by_walker_and_range() {
        let walker_id = WalkerId::new();
        let store = InMemoryBookingStore::new()
            .with_slot(test_slot(walker_id, at_hour(9)))
            .with_slot(test_slot(walker_id, at_hour(10)))
            .with_slot(test_slot(walker_id, at_hour(11)))
            .with_slot(test_slot(WalkerId::new(), at_hour(10)));
        let service = create_store(&store);

        let all = service.list_slots(walker_id, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].starts_at, at_hour(9));

        let ranged = service
            .list_slots(walker_id, Some(at_hour(10)), Some(at_hour(11)))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].starts_at, at_hour(10));
    }
}
