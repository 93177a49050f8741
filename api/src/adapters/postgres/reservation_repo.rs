//! PostgreSQL adapter for ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::errors::{corrupt_column, db_error, on_unique_violation};
use super::store::PostgresUnitOfWork;
use crate::domain::entities::{
    CustomerId, DogId, NewReservation, Reservation, ReservationId, ReservationStatus, ServiceId,
    SlotId, WalkerId,
};
use crate::domain::ports::ReservationRepository;
use crate::entity::reservations;
use crate::error::DomainError;

#[async_trait]
impl ReservationRepository for PostgresUnitOfWork {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, DomainError> {
        let model = reservations::ActiveModel {
            id: Set(reservation.id.0),
            customer_id: Set(reservation.customer_id.0),
            walker_id: Set(reservation.walker_id.0),
            dog_id: Set(reservation.dog_id.0),
            service_id: Set(reservation.service_id.0),
            slot_id: Set(reservation.slot_id.0),
            requested_at: Set(reservation.requested_at.fixed_offset()),
            service_at: Set(reservation.service_at.fixed_offset()),
            status: Set(ReservationStatus::Pending.to_string()),
            price_cents: Set(reservation.price_cents),
            pickup_address: Set(reservation.pickup_address.clone()),
            dropoff_address: Set(reservation.dropoff_address.clone()),
            notes: Set(reservation.notes.clone()),
            confirmed_at: Set(None),
            completed_at: Set(None),
            cancelled_at: Set(None),
            cancelled_by: Set(None),
        };

        let result = model.insert(&self.txn).await.map_err(|e| {
            on_unique_violation(e, || {
                DomainError::SlotUnavailable(format!(
                    "Slot {} already has an active reservation",
                    reservation.slot_id
                ))
            })
        })?;

        result.try_into()
    }

    async fn find_reservation(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, DomainError> {
        reservations::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(db_error)?
            .map(Reservation::try_from)
            .transpose()
    }

    async fn find_reservations_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        let results = reservations::Entity::find()
            .filter(reservations::Column::CustomerId.eq(customer_id.0))
            .order_by_desc(reservations::Column::RequestedAt)
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        results.into_iter().map(Reservation::try_from).collect()
    }

    async fn find_reservations_by_walker(
        &self,
        walker_id: &WalkerId,
    ) -> Result<Vec<Reservation>, DomainError> {
        let results = reservations::Entity::find()
            .filter(reservations::Column::WalkerId.eq(walker_id.0))
            .order_by_asc(reservations::Column::ServiceAt)
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        results.into_iter().map(Reservation::try_from).collect()
    }

    async fn transition_reservation(
        &self,
        id: &ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
        at: DateTime<Utc>,
        actor: Option<Uuid>,
    ) -> Result<Option<Reservation>, DomainError> {
        let Some(mut reservation) = self.find_reservation(id).await? else {
            return Ok(None);
        };
        if reservation.status != from {
            return Ok(None);
        }
        reservation.stamp(to, at, actor);

        let result = reservations::Entity::update_many()
            .col_expr(reservations::Column::Status, Expr::value(to.to_string()))
            .col_expr(
                reservations::Column::ConfirmedAt,
                Expr::value(reservation.confirmed_at.map(|t| t.fixed_offset())),
            )
            .col_expr(
                reservations::Column::CompletedAt,
                Expr::value(reservation.completed_at.map(|t| t.fixed_offset())),
            )
            .col_expr(
                reservations::Column::CancelledAt,
                Expr::value(reservation.cancelled_at.map(|t| t.fixed_offset())),
            )
            .col_expr(
                reservations::Column::CancelledBy,
                Expr::value(reservation.cancelled_by),
            )
            .filter(reservations::Column::Id.eq(id.0))
            .filter(reservations::Column::Status.eq(from.to_string()))
            .exec(&self.txn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(reservation))
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<reservations::Model> for Reservation {
    type Error = DomainError;

    fn try_from(model: reservations::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|_| corrupt_column("reservations", "status", &model.status))?;

        Ok(Reservation {
            id: ReservationId(model.id),
            customer_id: CustomerId(model.customer_id),
            walker_id: WalkerId(model.walker_id),
            dog_id: DogId(model.dog_id),
            service_id: ServiceId(model.service_id),
            slot_id: SlotId(model.slot_id),
            requested_at: model.requested_at.with_timezone(&Utc),
            service_at: model.service_at.with_timezone(&Utc),
            status,
            price_cents: model.price_cents,
            pickup_address: model.pickup_address,
            dropoff_address: model.dropoff_address,
            notes: model.notes,
            confirmed_at: model.confirmed_at.map(|dt| dt.with_timezone(&Utc)),
            completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
            cancelled_at: model.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
            cancelled_by: model.cancelled_by,
        })
    }
}
