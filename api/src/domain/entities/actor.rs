//! Acting identity
//!
//! Who is issuing a command. Supplied by the identity layer in front of the
//! API and parsed into a closed set of roles at the boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{CustomerId, WalkerId};

/// Role of the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
    Walker,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Customer => write!(f, "customer"),
            Role::Walker => write!(f, "walker"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            "walker" => Ok(Role::Walker),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// The authenticated caller of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn customer(id: CustomerId) -> Self {
        Self::new(id.0, Role::Customer)
    }

    pub fn walker(id: WalkerId) -> Self {
        Self::new(id.0, Role::Walker)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the actor is this customer
    pub fn is_customer(&self, customer_id: &CustomerId) -> bool {
        self.role == Role::Customer && self.id == customer_id.0
    }

    /// True when the actor is this walker
    pub fn is_walker(&self, walker_id: &WalkerId) -> bool {
        self.role == Role::Walker && self.id == walker_id.0
    }
}
