//! Slot domain entity
//!
//! A single bookable time unit on a walker's calendar. Slots are generated in
//! bulk from an availability window and only ever flip between `Available`
//! and `Reserved`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::WalkerId;
use crate::error::DomainError;

uuid_id!(
    /// Unique identifier for a slot
    SlotId
);

/// Slot status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Reserved,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::Reserved => write!(f, "reserved"),
        }
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(SlotStatus::Available),
            "reserved" => Ok(SlotStatus::Reserved),
            _ => Err(format!("Unknown slot status: {}", s)),
        }
    }
}

/// A bookable slot
#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub id: SlotId,
    pub walker_id: WalkerId,
    pub starts_at: DateTime<Utc>,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    pub fn belongs_to(&self, walker_id: &WalkerId) -> bool {
        self.walker_id == *walker_id
    }

    /// Error for deleting a slot that reservations still reference
    pub fn has_history(id: &SlotId) -> DomainError {
        DomainError::InvalidState(format!(
            "Slot {} has booking history and cannot be deleted",
            id
        ))
    }
}

/// Proof that a slot was claimed inside the current unit of work.
///
/// A reservation can only be built from a claim, which pins its service time
/// to the slot's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClaim {
    slot_id: SlotId,
    walker_id: WalkerId,
    starts_at: DateTime<Utc>,
}

impl SlotClaim {
    /// Only valid for a slot that is currently `Reserved`
    pub(crate) fn from_slot(slot: &Slot) -> Self {
        Self {
            slot_id: slot.id,
            walker_id: slot.walker_id,
            starts_at: slot.starts_at,
        }
    }

    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }

    pub fn walker_id(&self) -> WalkerId {
        self.walker_id
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }
}

/// Data needed to create a new slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    pub walker_id: WalkerId,
    pub starts_at: DateTime<Utc>,
}

impl NewSlot {
    /// Expand an availability window into slot start times.
    ///
    /// Produces one slot every `interval_minutes` starting at `start`, for as
    /// long as the slot start is strictly before `end`.
    pub fn generate(
        walker_id: WalkerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_minutes: i64,
    ) -> Result<Vec<NewSlot>, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidRange(format!(
                "Window end {} must be after start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        if interval_minutes <= 0 {
            return Err(DomainError::InvalidRange(format!(
                "Interval must be positive, got {} minutes",
                interval_minutes
            )));
        }

        let step = Duration::try_minutes(interval_minutes).ok_or_else(|| {
            DomainError::InvalidRange(format!(
                "Interval of {} minutes is out of range",
                interval_minutes
            ))
        })?;

        let mut slots = Vec::new();
        let mut next = Some(start);
        while let Some(at) = next.filter(|at| *at < end) {
            slots.push(NewSlot {
                walker_id,
                starts_at: at,
            });
            next = at.checked_add_signed(step);
        }

        Ok(slots)
    }
}
