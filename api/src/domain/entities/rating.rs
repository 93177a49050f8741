//! Rating domain entity
//!
//! Post-completion feedback on a reservation, in one of two directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reservation::ReservationId;
use crate::error::{DomainError, FieldViolation, ValidationErrors};

uuid_id!(
    /// Unique identifier for a rating
    RatingId
);

pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 5;

/// Who rates whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingDirection {
    /// The customer rates the walker
    CustomerToWalker,
    /// The walker leaves an opinion about the dog
    WalkerToDog,
}

impl std::fmt::Display for RatingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingDirection::CustomerToWalker => write!(f, "customer_to_walker"),
            RatingDirection::WalkerToDog => write!(f, "walker_to_dog"),
        }
    }
}

impl std::str::FromStr for RatingDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer_to_walker" => Ok(RatingDirection::CustomerToWalker),
            "walker_to_dog" => Ok(RatingDirection::WalkerToDog),
            _ => Err(format!("Unknown rating direction: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub reservation_id: ReservationId,
    pub direction: RatingDirection,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to record a rating; built through [`NewRating::new`]
#[derive(Debug, Clone)]
pub struct NewRating {
    pub reservation_id: ReservationId,
    pub direction: RatingDirection,
    pub score: i16,
    pub comment: Option<String>,
}

impl NewRating {
    pub fn new(
        reservation_id: ReservationId,
        direction: RatingDirection,
        score: i16,
        comment: Option<String>,
    ) -> Result<Self, DomainError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(DomainError::Validation(ValidationErrors(vec![
                FieldViolation::new(
                    "score",
                    format!("must be between {} and {}", MIN_SCORE, MAX_SCORE),
                ),
            ])));
        }

        Ok(Self {
            reservation_id,
            direction,
            score,
            comment: comment.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Read-side aggregate of a walker's received ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_scores(scores: &[i16]) -> Self {
        if scores.is_empty() {
            return Self {
                average: None,
                count: 0,
            };
        }
        let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
        Self {
            average: Some(total as f64 / scores.len() as f64),
            count: scores.len() as u64,
        }
    }
}
