//! Connection module
//!
//! The approval relationship between one customer company and one measuring
//! organization, from request through decision to contract tracking.

mod manager;
mod model;
mod repository;

pub use manager::ConnectionManager;
pub use model::*;
pub use repository::{ConnectionRepository, ConnectionUpdate};
