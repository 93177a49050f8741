//! Reservation handlers
//!
//! Booking, lifecycle transitions and reservation queries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::{CreateReservationCommand, ReservationCommand};
use crate::domain::entities::{
    Actor, CustomerId, DogId, Reservation, ReservationId, ServiceId, SlotId, WalkerId,
};
use crate::domain::ports::{CatalogRepository, TransactionalStore};
use crate::error::AppError;
use crate::AppState;

/// Request to book a slot
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    /// Defaults to the acting identity
    pub customer_id: Option<Uuid>,
    pub walker_id: Uuid,
    pub dog_id: Uuid,
    pub service_id: Uuid,
    pub slot_id: Uuid,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub status: String,
    pub customer_id: String,
    pub walker_id: String,
    pub dog_id: String,
    pub service_id: String,
    pub slot_id: String,
    pub service_at: String,
    pub requested_at: String,
    pub price_cents: i64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub notes: Option<String>,
    pub confirmed_at: Option<String>,
    pub completed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancelled_by: Option<String>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            status: r.status.to_string(),
            customer_id: r.customer_id.to_string(),
            walker_id: r.walker_id.to_string(),
            dog_id: r.dog_id.to_string(),
            service_id: r.service_id.to_string(),
            slot_id: r.slot_id.to_string(),
            service_at: r.service_at.to_rfc3339(),
            requested_at: r.requested_at.to_rfc3339(),
            price_cents: r.price_cents,
            pickup_address: r.pickup_address,
            dropoff_address: r.dropoff_address,
            notes: r.notes,
            confirmed_at: r.confirmed_at.map(|t| t.to_rfc3339()),
            completed_at: r.completed_at.map(|t| t.to_rfc3339()),
            cancelled_at: r.cancelled_at.map(|t| t.to_rfc3339()),
            cancelled_by: r.cancelled_by.map(|id| id.to_string()),
        }
    }
}

/// POST /reservations
///
/// Book a slot. The whole booking is one atomic unit; concurrent attempts
/// on the same slot yield exactly one reservation.
pub async fn create_reservation<S, C>(
    State(state): State<AppState<S, C>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let command = CreateReservationCommand {
        customer_id: CustomerId(request.customer_id.unwrap_or(actor.id)),
        walker_id: WalkerId(request.walker_id),
        dog_id: DogId(request.dog_id),
        service_id: ServiceId(request.service_id),
        slot_id: SlotId(request.slot_id),
        pickup_address: request.pickup_address,
        dropoff_address: request.dropoff_address,
        notes: request.notes,
    };

    let reservation = state.commands.create_reservation(command, actor).await?;

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

/// GET /reservations/:id
pub async fn get_reservation<S, C>(
    State(state): State<AppState<S, C>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let reservation = state.commands.get_reservation(ReservationId(id)).await?;
    Ok(Json(reservation.into()))
}

/// POST /reservations/:id/confirm
pub async fn confirm_reservation<S, C>(
    State(state): State<AppState<S, C>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let reservation = state
        .commands
        .confirm_reservation(ReservationCommand {
            reservation_id: ReservationId(id),
        })
        .await?;
    Ok(Json(reservation.into()))
}

/// POST /reservations/:id/cancel
///
/// Releases the slot in the same unit as the status change.
pub async fn cancel_reservation<S, C>(
    State(state): State<AppState<S, C>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let reservation = state
        .commands
        .cancel_reservation(
            ReservationCommand {
                reservation_id: ReservationId(id),
            },
            actor,
        )
        .await?;
    Ok(Json(reservation.into()))
}

/// POST /reservations/:id/complete
pub async fn complete_reservation<S, C>(
    State(state): State<AppState<S, C>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let reservation = state
        .commands
        .complete_reservation(ReservationCommand {
            reservation_id: ReservationId(id),
        })
        .await?;
    Ok(Json(reservation.into()))
}

/// GET /customers/:customer_id/reservations
pub async fn list_customer_reservations<S, C>(
    State(state): State<AppState<S, C>>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let reservations = state
        .commands
        .list_reservations_for_customer(CustomerId(customer_id))
        .await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

/// GET /walkers/:walker_id/reservations
pub async fn list_walker_reservations<S, C>(
    State(state): State<AppState<S, C>>,
    Path(walker_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let reservations = state
        .commands
        .list_reservations_for_walker(WalkerId(walker_id))
        .await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}
