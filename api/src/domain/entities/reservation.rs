//! Reservation domain entity
//!
//! A customer's claim on a slot for a specific dog and service. Reservations
//! move forward through a small state machine and are never deleted:
//!
//! ```text
//! Pending   --confirm-->  Confirmed
//! Pending   --cancel-->   Cancelled
//! Confirmed --cancel-->   Cancelled
//! Confirmed --complete--> Completed
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{CustomerId, DogId, ServiceId, WalkerId};
use super::slot::{SlotClaim, SlotId};
use crate::error::DomainError;

uuid_id!(
    /// Unique identifier for a reservation
    ReservationId
);

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A requested move in the reservation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Confirm,
    Cancel,
    Complete,
}

impl std::fmt::Display for ReservationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationAction::Confirm => write!(f, "confirm"),
            ReservationAction::Cancel => write!(f, "cancel"),
            ReservationAction::Complete => write!(f, "complete"),
        }
    }
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed | ReservationStatus::Cancelled
        )
    }

    /// Whether a reservation in this status holds its slot
    pub fn holds_slot(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }

    /// Next status for `action`, or `InvalidTransition`
    pub fn apply(self, action: ReservationAction) -> Result<ReservationStatus, DomainError> {
        use ReservationAction::*;
        use ReservationStatus::*;

        match (self, action) {
            (Pending, Confirm) => Ok(Confirmed),
            (Pending, Cancel) | (Confirmed, Cancel) => Ok(Cancelled),
            (Confirmed, Complete) => Ok(Completed),
            (from, action) if from.is_terminal() => Err(DomainError::InvalidTransition(format!(
                "Cannot {} a reservation that is already {}",
                action, from
            ))),
            (from, action) => Err(DomainError::InvalidTransition(format!(
                "Cannot {} a {} reservation",
                action, from
            ))),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Completed => write!(f, "completed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" | "canceled" => Ok(ReservationStatus::Cancelled),
            _ => Err(format!("Unknown reservation status: {}", s)),
        }
    }
}

/// A booking of one slot
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub customer_id: CustomerId,
    pub walker_id: WalkerId,
    pub dog_id: DogId,
    pub service_id: ServiceId,
    pub slot_id: SlotId,
    pub requested_at: DateTime<Utc>,
    /// Equal to the slot start when the reservation was created
    pub service_at: DateTime<Utc>,
    pub status: ReservationStatus,
    /// Frozen at creation from the walker's published price
    pub price_cents: i64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub notes: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
}

impl Reservation {
    /// Move to `to`, stamping the audit field that belongs to it
    ///
    /// Does not check the state machine; callers obtain `to` from
    /// [`ReservationStatus::apply`].
    pub fn stamp(&mut self, to: ReservationStatus, at: DateTime<Utc>, actor: Option<Uuid>) {
        self.status = to;
        match to {
            ReservationStatus::Pending => {}
            ReservationStatus::Confirmed => self.confirmed_at = Some(at),
            ReservationStatus::Completed => self.completed_at = Some(at),
            ReservationStatus::Cancelled => {
                self.cancelled_at = Some(at);
                self.cancelled_by = actor;
            }
        }
    }
}

/// Data needed to create a new reservation
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub id: ReservationId,
    pub customer_id: CustomerId,
    pub walker_id: WalkerId,
    pub dog_id: DogId,
    pub service_id: ServiceId,
    pub slot_id: SlotId,
    pub requested_at: DateTime<Utc>,
    pub service_at: DateTime<Utc>,
    pub price_cents: i64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub notes: Option<String>,
}

impl NewReservation {
    /// Build a pending reservation on a claimed slot
    #[allow(clippy::too_many_arguments)]
    pub fn for_claim(
        claim: &SlotClaim,
        customer_id: CustomerId,
        dog_id: DogId,
        service_id: ServiceId,
        price_cents: i64,
        pickup_address: String,
        dropoff_address: String,
        notes: Option<String>,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            customer_id,
            walker_id: claim.walker_id(),
            dog_id,
            service_id,
            slot_id: claim.slot_id(),
            requested_at,
            service_at: claim.starts_at(),
            price_cents,
            pickup_address,
            dropoff_address,
            notes,
        }
    }

    /// Materialise the stored reservation
    pub fn into_reservation(self) -> Reservation {
        Reservation {
            id: self.id,
            customer_id: self.customer_id,
            walker_id: self.walker_id,
            dog_id: self.dog_id,
            service_id: self.service_id,
            slot_id: self.slot_id,
            requested_at: self.requested_at,
            service_at: self.service_at,
            status: ReservationStatus::Pending,
            price_cents: self.price_cents,
            pickup_address: self.pickup_address,
            dropoff_address: self.dropoff_address,
            notes: self.notes,
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
            cancelled_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationAction::*;
    use ReservationStatus::*;

    const ALL_STATUSES: [ReservationStatus; 4] = [Pending, Confirmed, Completed, Cancelled];
    const ALL_ACTIONS: [ReservationAction; 3] = [Confirm, Cancel, Complete];

    #[test]
    fn allowed_transitions() {
        assert_eq!(Pending.apply(Confirm).unwrap(), Confirmed);
        assert_eq!(Pending.apply(Cancel).unwrap(), Cancelled);
        assert_eq!(Confirmed.apply(Cancel).unwrap(), Cancelled);
        assert_eq!(Confirmed.apply(Complete).unwrap(), Completed);
    }

    #[test]
    fn only_listed_transitions_are_reachable() {
        let allowed = [
            (Pending, Confirm),
            (Pending, Cancel),
            (Confirmed, Cancel),
            (Confirmed, Complete),
        ];

        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                let result = status.apply(action);
                if allowed.contains(&(status, action)) {
                    assert!(result.is_ok(), "{} -> {} should be allowed", status, action);
                } else {
                    assert!(
                        matches!(result, Err(DomainError::InvalidTransition(_))),
                        "{} -> {} should be rejected",
                        status,
                        action
                    );
                }
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [Completed, Cancelled] {
            assert!(status.is_terminal());
            for action in ALL_ACTIONS {
                assert!(status.apply(action).is_err());
            }
        }
        assert!(!Pending.is_terminal());
        assert!(!Confirmed.is_terminal());
    }

    #[test]
    fn rejected_transitions_name_terminal_states() {
        let err = Cancelled.apply(ReservationAction::Confirm).unwrap_err();
        assert!(
            matches!(&err, DomainError::InvalidTransition(msg) if msg.contains("already cancelled")),
            "got {:?}",
            err
        );

        let err = Pending.apply(ReservationAction::Complete).unwrap_err();
        assert!(
            matches!(&err, DomainError::InvalidTransition(msg) if !msg.contains("already")),
            "got {:?}",
            err
        );
    }

    #[test]
    fn only_cancelled_releases_slot() {
        assert!(Pending.holds_slot());
        assert!(Confirmed.holds_slot());
        assert!(Completed.holds_slot());
        assert!(!Cancelled.holds_slot());
    }

    #[test]
    fn status_from_str() {
        assert_eq!("pending".parse::<ReservationStatus>().unwrap(), Pending);
        assert_eq!("Confirmed".parse::<ReservationStatus>().unwrap(), Confirmed);
        assert_eq!("canceled".parse::<ReservationStatus>().unwrap(), Cancelled);
        assert!("expired".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn stamp_sets_matching_audit_field() {
        let claim = SlotClaim::from_slot(&crate::domain::entities::Slot {
            id: SlotId::new(),
            walker_id: WalkerId::new(),
            starts_at: Utc::now(),
            status: crate::domain::entities::SlotStatus::Reserved,
            created_at: Utc::now(),
        });
        let mut reservation = NewReservation::for_claim(
            &claim,
            CustomerId::new(),
            DogId::new(),
            ServiceId::new(),
            1500,
            "A".to_string(),
            "B".to_string(),
            None,
            Utc::now(),
        )
        .into_reservation();
        assert_eq!(reservation.status, Pending);
        assert_eq!(reservation.service_at, claim.starts_at());

        let at = Utc::now();
        let actor = Uuid::new_v4();
        reservation.stamp(Confirmed, at, Some(actor));
        assert_eq!(reservation.confirmed_at, Some(at));
        assert_eq!(reservation.cancelled_by, None);

        reservation.stamp(Cancelled, at, Some(actor));
        assert_eq!(reservation.status, Cancelled);
        assert_eq!(reservation.cancelled_at, Some(at));
        assert_eq!(reservation.cancelled_by, Some(actor));
        assert_eq!(reservation.completed_at, None);
    }

    #[test]
    fn invalid_transition_message_names_both_sides() {
        let err = Completed.apply(Confirm).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid transition: Cannot confirm a completed reservation"
        );
    }
}
