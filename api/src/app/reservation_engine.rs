//! Reservation Engine
//!
//! Orchestrates the reservation state machine and its coupling to slot
//! claims. Every write runs inside one unit of work from the coordinator:
//! - create: claim the slot + insert the pending reservation
//! - cancel: move to `Cancelled` + release the slot
//! - confirm / complete: status change only
//!
//! Double booking is prevented by the slot claim, not by locking here.

use std::sync::Arc;

use super::coordinator::TransactionCoordinator;
use super::slot_store;
use crate::domain::entities::{
    Actor, CustomerId, DogId, NewReservation, Reservation, ReservationAction, ReservationId,
    ServiceId, SlotId, WalkerId,
};
use crate::domain::ports::{
    CatalogRepository, Clock, ReservationRepository, SlotRepository, TransactionalStore,
};
use crate::error::DomainError;

/// Everything needed to book a slot
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub customer_id: CustomerId,
    pub walker_id: WalkerId,
    pub dog_id: DogId,
    pub service_id: ServiceId,
    pub slot_id: SlotId,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub notes: Option<String>,
}

/// Service for creating and moving reservations
pub struct ReservationEngine<S, C>
where
    S: TransactionalStore,
    C: CatalogRepository,
{
    coordinator: Arc<TransactionCoordinator<S>>,
    catalog: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<S, C> ReservationEngine<S, C>
where
    S: TransactionalStore,
    C: CatalogRepository,
{
    pub fn new(
        coordinator: Arc<TransactionCoordinator<S>>,
        catalog: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coordinator,
            catalog,
            clock,
        }
    }

    /// Book a slot, creating a `Pending` reservation
    ///
    /// The dog must belong to the customer and the slot to the walker. The
    /// walker's current price for the service is frozen on the reservation.
    /// A lost claim fails with `SlotUnavailable` and writes nothing.
    pub async fn create_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<Reservation, DomainError> {
        if !self.catalog.walker_exists(&request.walker_id).await? {
            return Err(DomainError::NotFound(format!(
                "Walker {} not found",
                request.walker_id
            )));
        }

        let dog = self
            .catalog
            .find_dog(&request.dog_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Dog {} not found", request.dog_id)))?;

        if !dog.belongs_to(&request.customer_id) {
            return Err(DomainError::Forbidden(format!(
                "Dog {} does not belong to customer {}",
                dog.id, request.customer_id
            )));
        }

        let quote = self
            .catalog
            .find_quote(&request.walker_id, &request.service_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "Walker {} does not offer service {}",
                    request.walker_id, request.service_id
                ))
            })?;

        let now = self.clock.now();

        let reservation = self
            .coordinator
            .run_atomic(move |uow| async move {
                let slot = uow.find_slot(&request.slot_id).await?.ok_or_else(|| {
                    DomainError::SlotUnavailable(format!("Slot {} does not exist", request.slot_id))
                })?;

                if !slot.belongs_to(&request.walker_id) {
                    return Err(DomainError::NotFound(format!(
                        "Slot {} not found for walker {}",
                        request.slot_id, request.walker_id
                    )));
                }

                if slot.starts_at <= now {
                    return Err(DomainError::InvalidState(format!(
                        "Slot {} has already started",
                        request.slot_id
                    )));
                }

                let claim = slot_store::try_claim(&*uow, &request.slot_id).await?;

                let new_reservation = NewReservation::for_claim(
                    &claim,
                    request.customer_id,
                    request.dog_id,
                    request.service_id,
                    quote.price_cents,
                    request.pickup_address,
                    request.dropoff_address,
                    request.notes,
                    now,
                );

                uow.insert_reservation(&new_reservation).await
            })
            .await?;

        tracing::info!(
            reservation_id = %reservation.id,
            slot_id = %reservation.slot_id,
            walker_id = %reservation.walker_id,
            "Created reservation"
        );
        Ok(reservation)
    }

    /// Pending -> Confirmed
    pub async fn confirm_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, DomainError> {
        let now = self.clock.now();

        let reservation = self
            .coordinator
            .run_atomic(move |uow| async move {
                let current = find_existing(&*uow, &reservation_id).await?;
                let next = current.status.apply(ReservationAction::Confirm)?;
                uow.transition_reservation(&reservation_id, current.status, next, now, None)
                    .await?
                    .ok_or_else(|| changed_concurrently(&reservation_id))
            })
            .await?;

        tracing::info!(reservation_id = %reservation_id, "Confirmed reservation");
        Ok(reservation)
    }

    /// Pending/Confirmed -> Cancelled, releasing the slot in the same unit
    ///
    /// Only the owning customer, the assigned walker or an administrator may
    /// cancel.
    pub async fn cancel_reservation(
        &self,
        reservation_id: ReservationId,
        actor: Actor,
    ) -> Result<Reservation, DomainError> {
        let now = self.clock.now();
        let coordinator = &self.coordinator;

        let reservation = coordinator
            .run_atomic(move |uow| async move {
                let current = find_existing(&*uow, &reservation_id).await?;

                if !actor.is_admin()
                    && !actor.is_customer(&current.customer_id)
                    && !actor.is_walker(&current.walker_id)
                {
                    return Err(DomainError::Forbidden(
                        "Only the customer, the walker or an administrator can cancel".to_string(),
                    ));
                }

                let next = current.status.apply(ReservationAction::Cancel)?;
                let cancelled = uow
                    .transition_reservation(
                        &reservation_id,
                        current.status,
                        next,
                        now,
                        Some(actor.id),
                    )
                    .await?
                    .ok_or_else(|| changed_concurrently(&reservation_id))?;

                let slot_id = cancelled.slot_id;
                coordinator
                    .run_nested(&uow, move |nested| async move {
                        slot_store::release(&*nested, &slot_id).await
                    })
                    .await?;
                Ok(cancelled)
            })
            .await?;

        tracing::info!(
            reservation_id = %reservation_id,
            slot_id = %reservation.slot_id,
            actor = %actor.id,
            "Cancelled reservation"
        );
        Ok(reservation)
    }

    /// Confirmed -> Completed, only once the service time has been reached
    pub async fn complete_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, DomainError> {
        let now = self.clock.now();

        let reservation = self
            .coordinator
            .run_atomic(move |uow| async move {
                let current = find_existing(&*uow, &reservation_id).await?;
                let next = current.status.apply(ReservationAction::Complete)?;

                if now < current.service_at {
                    return Err(DomainError::TooEarly(format!(
                        "Reservation {} cannot be completed before {}",
                        reservation_id,
                        current.service_at.to_rfc3339()
                    )));
                }

                uow.transition_reservation(&reservation_id, current.status, next, now, None)
                    .await?
                    .ok_or_else(|| changed_concurrently(&reservation_id))
            })
            .await?;

        tracing::info!(reservation_id = %reservation_id, "Completed reservation");
        Ok(reservation)
    }

    /// Get a single reservation
    pub async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, DomainError> {
        self.coordinator
            .run_atomic(move |uow| async move { find_existing(&*uow, &reservation_id).await })
            .await
    }

    /// Reservations made by a customer
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        self.coordinator
            .run_atomic(move |uow| async move {
                uow.find_reservations_by_customer(&customer_id).await
            })
            .await
    }

    /// Reservations assigned to a walker
    pub async fn list_for_walker(
        &self,
        walker_id: WalkerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        self.coordinator
            .run_atomic(move |uow| async move { uow.find_reservations_by_walker(&walker_id).await })
            .await
    }
}

async fn find_existing<R>(
    reservations: &R,
    reservation_id: &ReservationId,
) -> Result<Reservation, DomainError>
where
    R: ReservationRepository + ?Sized,
{
    reservations
        .find_reservation(reservation_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Reservation {} not found", reservation_id)))
}

fn changed_concurrently(reservation_id: &ReservationId) -> DomainError {
    DomainError::InvalidTransition(format!(
        "Reservation {} changed state concurrently",
        reservation_id
    ))
}
