//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.
//! All times fall on 2024-06-01 (UTC).

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::mocks::InMemoryCatalog;
use crate::domain::entities::{
    CustomerId, Dog, DogId, Reservation, ReservationId, ReservationStatus, ServiceId, Slot, SlotId,
    SlotStatus, WalkerId,
};

/// 2024-06-01T09:00:00Z
pub fn scenario_start() -> DateTime<Utc> {
    at_hour(9)
}

/// 2024-06-01 at `hour`:00 UTC
pub fn at_hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

/// Create an available slot for a walker
pub fn test_slot(walker_id: WalkerId, starts_at: DateTime<Utc>) -> Slot {
    Slot {
        id: SlotId::new(),
        walker_id,
        starts_at,
        status: SlotStatus::Available,
        created_at: starts_at - Duration::days(1),
    }
}

/// Create a slot that is already reserved
pub fn test_slot_reserved(walker_id: WalkerId, starts_at: DateTime<Utc>) -> Slot {
    Slot {
        status: SlotStatus::Reserved,
        ..test_slot(walker_id, starts_at)
    }
}

pub fn test_dog(owner_id: CustomerId) -> Dog {
    Dog {
        id: DogId::new(),
        owner_id,
        name: "Canela".to_string(),
    }
}

/// Create a pending reservation at 09:00, requested at 08:00
pub fn test_reservation() -> Reservation {
    Reservation {
        id: ReservationId::new(),
        customer_id: CustomerId::new(),
        walker_id: WalkerId::new(),
        dog_id: DogId::new(),
        service_id: ServiceId::new(),
        slot_id: SlotId::new(),
        requested_at: at_hour(8),
        service_at: at_hour(9),
        status: ReservationStatus::Pending,
        price_cents: 1500,
        pickup_address: "Calle Mayor 1".to_string(),
        dropoff_address: "Calle Mayor 1".to_string(),
        notes: None,
        confirmed_at: None,
        completed_at: None,
        cancelled_at: None,
        cancelled_by: None,
    }
}

/// One customer with a dog and one walker offering one priced service
pub struct Marketplace {
    pub customer_id: CustomerId,
    pub walker_id: WalkerId,
    pub service_id: ServiceId,
    pub price_cents: i64,
    pub dog: Dog,
    pub catalog: InMemoryCatalog,
}

pub fn test_marketplace() -> Marketplace {
    let customer_id = CustomerId::new();
    let walker_id = WalkerId::new();
    let service_id = ServiceId::new();
    let price_cents = 1500;
    let dog = test_dog(customer_id);

    let catalog = InMemoryCatalog::new()
        .with_walker(walker_id)
        .with_dog(dog.clone())
        .with_quote(walker_id, service_id, price_cents);

    Marketplace {
        customer_id,
        walker_id,
        service_id,
        price_cents,
        dog,
        catalog,
    }
}
