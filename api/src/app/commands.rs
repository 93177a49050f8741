//! Booking commands
//!
//! The entry points consumed by the HTTP layer. Each command goes through
//! its validation pipeline first; a rejected command never reaches the
//! slot store, the reservation engine or rating feedback.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use validator::Validate;

use super::coordinator::TransactionCoordinator;
use super::rating_feedback::RatingFeedback;
use super::reservation_engine::{ReservationEngine, ReservationRequest};
use super::slot_store::SlotStore;
use super::validation::{DeclaredConstraints, NotInPast, ValidationPipeline};
use crate::domain::entities::{
    Actor, CustomerId, DogId, Rating, RatingDirection, RatingSummary, Reservation, ReservationId,
    ServiceId, Slot, SlotId, WalkerId,
};
use crate::domain::ports::{CatalogRepository, Clock, TransactionalStore};
use crate::error::DomainError;

/// Longest availability window a walker may declare at once
pub const MAX_SLOT_WINDOW_HOURS: i64 = 24;
/// Most slots a single declaration may produce
pub const MAX_SLOTS_PER_DECLARATION: i64 = 96;
/// Longest interval between slot starts
pub const MAX_SLOT_INTERVAL_MINUTES: i64 = MAX_SLOT_WINDOW_HOURS * 60;

#[derive(Debug, Clone, Validate)]
pub struct CreateSlotsCommand {
    pub walker_id: WalkerId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub interval_minutes: i64,
}

impl CreateSlotsCommand {
    /// Number of slots this window produces, or `None` for an empty window
    fn slot_count(&self) -> Option<i64> {
        let minutes = (self.end - self.start).num_minutes();
        if minutes <= 0 || self.interval_minutes <= 0 {
            return None;
        }
        let whole = minutes / self.interval_minutes;
        Some(if minutes % self.interval_minutes == 0 {
            whole
        } else {
            whole + 1
        })
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateReservationCommand {
    pub customer_id: CustomerId,
    pub walker_id: WalkerId,
    pub dog_id: DogId,
    pub service_id: ServiceId,
    pub slot_id: SlotId,
    #[validate(length(max = 250, message = "must be at most 250 characters"))]
    pub pickup_address: String,
    #[validate(length(max = 250, message = "must be at most 250 characters"))]
    pub dropoff_address: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Confirm, cancel or complete a reservation
#[derive(Debug, Clone, Copy)]
pub struct ReservationCommand {
    pub reservation_id: ReservationId,
}

#[derive(Debug, Clone, Validate)]
pub struct SubmitRatingCommand {
    pub reservation_id: ReservationId,
    pub direction: RatingDirection,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub score: i16,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// The validation pipelines registered for every command
pub struct BookingRules {
    pub create_slots: ValidationPipeline<CreateSlotsCommand>,
    pub create_reservation: ValidationPipeline<CreateReservationCommand>,
    pub reservation: ValidationPipeline<ReservationCommand>,
    pub submit_rating: ValidationPipeline<SubmitRatingCommand>,
}

impl BookingRules {
    pub fn standard(clock: Arc<dyn Clock>) -> Self {
        let create_slots = ValidationPipeline::new()
            .rule(DeclaredConstraints)
            .check("end", "must be after start", |c: &CreateSlotsCommand| {
                c.end > c.start
            })
            .rule(NotInPast::new("start", clock, |c: &CreateSlotsCommand| {
                c.start
            }))
            .check(
                "end",
                format!("window must not exceed {} hours", MAX_SLOT_WINDOW_HOURS),
                |c: &CreateSlotsCommand| {
                    c.end - c.start <= ChronoDuration::hours(MAX_SLOT_WINDOW_HOURS)
                },
            )
            .check(
                "interval_minutes",
                format!("must not exceed {} minutes", MAX_SLOT_INTERVAL_MINUTES),
                |c: &CreateSlotsCommand| c.interval_minutes <= MAX_SLOT_INTERVAL_MINUTES,
            )
            .check(
                "interval_minutes",
                format!(
                    "window must not produce more than {} slots",
                    MAX_SLOTS_PER_DECLARATION
                ),
                |c: &CreateSlotsCommand| {
                    c.slot_count()
                        .map_or(true, |count| count <= MAX_SLOTS_PER_DECLARATION)
                },
            )
            .check("walker_id", "must not be nil", |c: &CreateSlotsCommand| {
                !c.walker_id.is_nil()
            });

        let create_reservation = ValidationPipeline::new()
            .rule(DeclaredConstraints)
            .check(
                "pickup_address",
                "must not be empty",
                |c: &CreateReservationCommand| !c.pickup_address.trim().is_empty(),
            )
            .check(
                "dropoff_address",
                "must not be empty",
                |c: &CreateReservationCommand| !c.dropoff_address.trim().is_empty(),
            )
            .check("customer_id", "must not be nil", |c: &CreateReservationCommand| {
                !c.customer_id.is_nil()
            })
            .check("walker_id", "must not be nil", |c: &CreateReservationCommand| {
                !c.walker_id.is_nil()
            })
            .check("dog_id", "must not be nil", |c: &CreateReservationCommand| {
                !c.dog_id.is_nil()
            })
            .check("service_id", "must not be nil", |c: &CreateReservationCommand| {
                !c.service_id.is_nil()
            })
            .check("slot_id", "must not be nil", |c: &CreateReservationCommand| {
                !c.slot_id.is_nil()
            });

        let reservation = ValidationPipeline::new().check(
            "reservation_id",
            "must not be nil",
            |c: &ReservationCommand| !c.reservation_id.is_nil(),
        );

        let submit_rating = ValidationPipeline::new()
            .rule(DeclaredConstraints)
            .check("reservation_id", "must not be nil", |c: &SubmitRatingCommand| {
                !c.reservation_id.is_nil()
            });

        Self {
            create_slots,
            create_reservation,
            reservation,
            submit_rating,
        }
    }
}

/// Validated entry points into the booking core
pub struct BookingCommands<S, C>
where
    S: TransactionalStore,
    C: CatalogRepository,
{
    rules: BookingRules,
    slots: SlotStore<S>,
    engine: ReservationEngine<S, C>,
    ratings: RatingFeedback<S>,
}

impl<S, C> BookingCommands<S, C>
where
    S: TransactionalStore,
    C: CatalogRepository,
{
    pub fn new(
        coordinator: Arc<TransactionCoordinator<S>>,
        catalog: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_rules(
            coordinator,
            catalog,
            clock.clone(),
            BookingRules::standard(clock),
        )
    }

    pub fn with_rules(
        coordinator: Arc<TransactionCoordinator<S>>,
        catalog: Arc<C>,
        clock: Arc<dyn Clock>,
        rules: BookingRules,
    ) -> Self {
        Self {
            rules,
            slots: SlotStore::new(coordinator.clone()),
            engine: ReservationEngine::new(coordinator.clone(), catalog, clock),
            ratings: RatingFeedback::new(coordinator),
        }
    }

    // =========================================================================
    // Slots
    // =========================================================================

    /// Declare availability; the walker themself or an administrator only
    pub async fn create_slots(
        &self,
        command: CreateSlotsCommand,
        actor: Actor,
    ) -> Result<Vec<Slot>, DomainError> {
        self.rules.create_slots.validate(&command)?;

        if !actor.is_admin() && !actor.is_walker(&command.walker_id) {
            return Err(DomainError::Forbidden(
                "Only the walker or an administrator can declare availability".to_string(),
            ));
        }

        self.slots
            .create_slots(
                command.walker_id,
                command.start,
                command.end,
                command.interval_minutes,
            )
            .await
    }

    pub async fn delete_slot(&self, slot_id: SlotId, actor: Actor) -> Result<(), DomainError> {
        self.slots.delete_slot(slot_id, actor).await
    }

    pub async fn get_slot(&self, slot_id: SlotId) -> Result<Slot, DomainError> {
        self.slots.get_slot(slot_id).await
    }

    pub async fn list_slots(
        &self,
        walker_id: WalkerId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Slot>, DomainError> {
        self.slots.list_slots(walker_id, from, to).await
    }

    // =========================================================================
    // Reservations
    // =========================================================================

    /// Book a slot on behalf of the acting customer (or any customer, for an administrator)
    pub async fn create_reservation(
        &self,
        command: CreateReservationCommand,
        actor: Actor,
    ) -> Result<Reservation, DomainError> {
        self.rules.create_reservation.validate(&command)?;

        if !actor.is_admin() && !actor.is_customer(&command.customer_id) {
            return Err(DomainError::Forbidden(
                "Reservations can only be made by the customer themself".to_string(),
            ));
        }

        self.engine
            .create_reservation(ReservationRequest {
                customer_id: command.customer_id,
                walker_id: command.walker_id,
                dog_id: command.dog_id,
                service_id: command.service_id,
                slot_id: command.slot_id,
                pickup_address: command.pickup_address.trim().to_string(),
                dropoff_address: command.dropoff_address.trim().to_string(),
                notes: command.notes.filter(|n| !n.trim().is_empty()),
            })
            .await
    }

    pub async fn confirm_reservation(
        &self,
        command: ReservationCommand,
    ) -> Result<Reservation, DomainError> {
        self.rules.reservation.validate(&command)?;
        self.engine.confirm_reservation(command.reservation_id).await
    }

    pub async fn cancel_reservation(
        &self,
        command: ReservationCommand,
        actor: Actor,
    ) -> Result<Reservation, DomainError> {
        self.rules.reservation.validate(&command)?;
        self.engine
            .cancel_reservation(command.reservation_id, actor)
            .await
    }

    pub async fn complete_reservation(
        &self,
        command: ReservationCommand,
    ) -> Result<Reservation, DomainError> {
        self.rules.reservation.validate(&command)?;
        self.engine
            .complete_reservation(command.reservation_id)
            .await
    }

    pub async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, DomainError> {
        self.engine.get_reservation(reservation_id).await
    }

    pub async fn list_reservations_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        self.engine.list_for_customer(customer_id).await
    }

    pub async fn list_reservations_for_walker(
        &self,
        walker_id: WalkerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        self.engine.list_for_walker(walker_id).await
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    pub async fn submit_rating(
        &self,
        command: SubmitRatingCommand,
        actor: Actor,
    ) -> Result<Rating, DomainError> {
        self.rules.submit_rating.validate(&command)?;
        self.ratings
            .submit_rating(
                command.reservation_id,
                command.direction,
                command.score,
                command.comment,
                actor,
            )
            .await
    }

    pub async fn walker_rating(&self, walker_id: WalkerId) -> Result<RatingSummary, DomainError> {
        self.ratings.walker_summary(walker_id).await
    }
}
