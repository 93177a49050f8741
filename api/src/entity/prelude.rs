#![allow(unused_imports)]

pub use super::dogs::Entity as Dogs;
pub use super::ratings::Entity as Ratings;
pub use super::reservations::Entity as Reservations;
pub use super::slots::Entity as Slots;
pub use super::walker_services::Entity as WalkerServices;
pub use super::walkers::Entity as Walkers;
