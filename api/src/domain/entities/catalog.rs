//! Catalog entities
//!
//! Identities and published data owned by the marketplace side of the system
//! (walker profiles, dogs, service prices). The booking core only reads them.

use serde::Serialize;

uuid_id!(
    /// Unique identifier for a pet owner
    CustomerId
);

uuid_id!(
    /// Unique identifier for a dog-walker
    WalkerId
);

uuid_id!(
    /// Unique identifier for a dog
    DogId
);

uuid_id!(
    /// Unique identifier for a walking service offered by walkers
    ServiceId
);

/// A dog registered by a customer
#[derive(Debug, Clone, Serialize)]
pub struct Dog {
    pub id: DogId,
    pub owner_id: CustomerId,
    pub name: String,
}

impl Dog {
    pub fn belongs_to(&self, customer_id: &CustomerId) -> bool {
        self.owner_id == *customer_id
    }
}

/// The price a walker currently publishes for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceQuote {
    pub walker_id: WalkerId,
    pub service_id: ServiceId,
    pub price_cents: i64,
}
