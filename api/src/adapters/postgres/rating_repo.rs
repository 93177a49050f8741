//! PostgreSQL adapter for RatingRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set};

use super::errors::{corrupt_column, db_error, on_unique_violation};
use super::store::PostgresUnitOfWork;
use crate::domain::entities::{
    NewRating, Rating, RatingDirection, RatingId, ReservationId, WalkerId,
};
use crate::domain::ports::RatingRepository;
use crate::entity::{ratings, reservations};
use crate::error::DomainError;

#[async_trait]
impl RatingRepository for PostgresUnitOfWork {
    async fn insert_rating(&self, rating: &NewRating) -> Result<Rating, DomainError> {
        let model = ratings::ActiveModel {
            id: Set(RatingId::new().0),
            reservation_id: Set(rating.reservation_id.0),
            direction: Set(rating.direction.to_string()),
            score: Set(rating.score),
            comment: Set(rating.comment.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model.insert(&self.txn).await.map_err(|e| {
            on_unique_violation(e, || {
                DomainError::DuplicateRating(format!(
                    "Reservation {} already has a {} rating",
                    rating.reservation_id, rating.direction
                ))
            })
        })?;

        result.try_into()
    }

    async fn find_rating(
        &self,
        reservation_id: &ReservationId,
        direction: RatingDirection,
    ) -> Result<Option<Rating>, DomainError> {
        ratings::Entity::find()
            .filter(ratings::Column::ReservationId.eq(reservation_id.0))
            .filter(ratings::Column::Direction.eq(direction.to_string()))
            .one(&self.txn)
            .await
            .map_err(db_error)?
            .map(Rating::try_from)
            .transpose()
    }

    async fn find_walker_scores(&self, walker_id: &WalkerId) -> Result<Vec<i16>, DomainError> {
        ratings::Entity::find()
            .inner_join(reservations::Entity)
            .filter(reservations::Column::WalkerId.eq(walker_id.0))
            .filter(
                ratings::Column::Direction.eq(RatingDirection::CustomerToWalker.to_string()),
            )
            .select_only()
            .column(ratings::Column::Score)
            .into_tuple::<i16>()
            .all(&self.txn)
            .await
            .map_err(db_error)
    }
}

impl TryFrom<ratings::Model> for Rating {
    type Error = DomainError;

    fn try_from(model: ratings::Model) -> Result<Self, Self::Error> {
        let direction = model
            .direction
            .parse()
            .map_err(|_| corrupt_column("ratings", "direction", &model.direction))?;

        Ok(Rating {
            id: RatingId(model.id),
            reservation_id: ReservationId(model.reservation_id),
            direction,
            score: model.score,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}
