//! Rating handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::SubmitRatingCommand;
use crate::domain::entities::{
    Actor, Rating, RatingDirection, RatingSummary, ReservationId, WalkerId,
};
use crate::domain::ports::{CatalogRepository, TransactionalStore};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub direction: RatingDirection,
    pub score: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub id: String,
    pub reservation_id: String,
    pub direction: String,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id.to_string(),
            reservation_id: rating.reservation_id.to_string(),
            direction: rating.direction.to_string(),
            score: rating.score,
            comment: rating.comment,
            created_at: rating.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RatingSummaryResponse {
    pub walker_id: String,
    pub average: Option<f64>,
    pub count: u64,
}

/// POST /reservations/:id/ratings
///
/// Completed reservations only; one rating per direction.
pub async fn submit_rating<S, C>(
    State(state): State<AppState<S, C>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let rating = state
        .commands
        .submit_rating(
            SubmitRatingCommand {
                reservation_id: ReservationId(id),
                direction: request.direction,
                score: request.score,
                comment: request.comment,
            },
            actor,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(rating.into())))
}

/// GET /walkers/:walker_id/rating
pub async fn walker_rating<S, C>(
    State(state): State<AppState<S, C>>,
    Path(walker_id): Path<Uuid>,
) -> Result<Json<RatingSummaryResponse>, AppError>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let RatingSummary { average, count } =
        state.commands.walker_rating(WalkerId(walker_id)).await?;

    Ok(Json(RatingSummaryResponse {
        walker_id: walker_id.to_string(),
        average,
        count,
    }))
}
