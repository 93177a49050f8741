//! Rating Feedback
//!
//! Appends post-completion ratings and exposes the walker reputation
//! read-model. Ratings never change reservation or slot state.

use std::sync::Arc;

use super::coordinator::TransactionCoordinator;
use crate::domain::entities::{
    Actor, NewRating, Rating, RatingDirection, RatingSummary, ReservationId, ReservationStatus,
    WalkerId,
};
use crate::domain::ports::{RatingRepository, ReservationRepository, TransactionalStore};
use crate::error::DomainError;

pub struct RatingFeedback<S>
where
    S: TransactionalStore,
{
    coordinator: Arc<TransactionCoordinator<S>>,
}

impl<S> RatingFeedback<S>
where
    S: TransactionalStore,
{
    pub fn new(coordinator: Arc<TransactionCoordinator<S>>) -> Self {
        Self { coordinator }
    }

    /// Record a rating for a completed reservation
    ///
    /// At most one rating exists per reservation and direction. The customer
    /// rates the walker, the walker rates the dog; administrators may submit
    /// either.
    pub async fn submit_rating(
        &self,
        reservation_id: ReservationId,
        direction: RatingDirection,
        score: i16,
        comment: Option<String>,
        actor: Actor,
    ) -> Result<Rating, DomainError> {
        let new_rating = NewRating::new(reservation_id, direction, score, comment)?;

        let rating = self
            .coordinator
            .run_atomic(move |uow| async move {
                let reservation = uow.find_reservation(&reservation_id).await?.ok_or_else(|| {
                    DomainError::NotFound(format!("Reservation {} not found", reservation_id))
                })?;

                if reservation.status != ReservationStatus::Completed {
                    return Err(DomainError::InvalidState(format!(
                        "Reservation {} is {}; only completed reservations can be rated",
                        reservation_id, reservation.status
                    )));
                }

                let allowed = actor.is_admin()
                    || match direction {
                        RatingDirection::CustomerToWalker => {
                            actor.is_customer(&reservation.customer_id)
                        }
                        RatingDirection::WalkerToDog => actor.is_walker(&reservation.walker_id),
                    };
                if !allowed {
                    return Err(DomainError::Forbidden(format!(
                        "Actor cannot submit a {} rating for this reservation",
                        direction
                    )));
                }

                if uow.find_rating(&reservation_id, direction).await?.is_some() {
                    return Err(DomainError::DuplicateRating(format!(
                        "Reservation {} already has a {} rating",
                        reservation_id, direction
                    )));
                }

                uow.insert_rating(&new_rating).await
            })
            .await?;

        tracing::info!(
            reservation_id = %reservation_id,
            direction = %direction,
            score = rating.score,
            "Recorded rating"
        );
        Ok(rating)
    }

    /// Average score and count of the ratings a walker received
    pub async fn walker_summary(&self, walker_id: WalkerId) -> Result<RatingSummary, DomainError> {
        let scores = self
            .coordinator
            .run_atomic(move |uow| async move { uow.find_walker_scores(&walker_id).await })
            .await?;
        Ok(RatingSummary::from_scores(&scores))
    }
}
