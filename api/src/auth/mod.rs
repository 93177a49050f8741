//! Authentication
//!
//! Identity is established by the gateway in front of the API; this layer
//! only reads it.

mod actor;

pub use actor::{actor_middleware, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
