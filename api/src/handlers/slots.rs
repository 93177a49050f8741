//! Slot handlers
//!
//! Endpoints for walker availability.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::CreateSlotsCommand;
use crate::domain::entities::{Actor, Slot, SlotId, WalkerId};
use crate::domain::ports::{CatalogRepository, TransactionalStore};
use crate::error::AppError;
use crate::AppState;

/// Request to declare an availability window
#[derive(Debug, Deserialize)]
pub struct CreateSlotsRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval_minutes: i64,
}

/// Optional `[from, to)` bounds on slot start times
#[derive(Debug, Deserialize)]
pub struct ListSlotsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SlotResponse {
    pub id: String,
    pub walker_id: String,
    pub starts_at: String,
    pub status: String,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id.to_string(),
            walker_id: slot.walker_id.to_string(),
            starts_at: slot.starts_at.to_rfc3339(),
            status: slot.status.to_string(),
        }
    }
}

/// POST /walkers/:walker_id/slots
pub async fn create_slots<S, C>(
    State(state): State<AppState<S, C>>,
    Extension(actor): Extension<Actor>,
    Path(walker_id): Path<Uuid>,
    Json(request): Json<CreateSlotsRequest>,
) -> Result<(StatusCode, Json<Vec<SlotResponse>>), AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let slots = state
        .commands
        .create_slots(
            CreateSlotsCommand {
                walker_id: WalkerId(walker_id),
                start: request.start,
                end: request.end,
                interval_minutes: request.interval_minutes,
            },
            actor,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(slots.into_iter().map(SlotResponse::from).collect()),
    ))
}

/// GET /walkers/:walker_id/slots
pub async fn list_slots<S, C>(
    State(state): State<AppState<S, C>>,
    Path(walker_id): Path<Uuid>,
    Query(query): Query<ListSlotsQuery>,
) -> Result<Json<Vec<SlotResponse>>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from >= to {
            return Err(AppError::BadRequest("'from' must be before 'to'".to_string()));
        }
    }

    let slots = state
        .commands
        .list_slots(WalkerId(walker_id), query.from, query.to)
        .await?;

    Ok(Json(slots.into_iter().map(SlotResponse::from).collect()))
}

/// GET /slots/:slot_id
pub async fn get_slot<S, C>(
    State(state): State<AppState<S, C>>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<SlotResponse>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let slot = state.commands.get_slot(SlotId(slot_id)).await?;
    Ok(Json(slot.into()))
}

/// DELETE /slots/:slot_id
///
/// Only while the slot is still available.
pub async fn delete_slot<S, C>(
    State(state): State<AppState<S, C>>,
    Extension(actor): Extension<Actor>,
    Path(slot_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    state.commands.delete_slot(SlotId(slot_id), actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
