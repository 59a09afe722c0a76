//! Core library for the Pollutant Measurement Management System (PMMS)
//!
//! This crate contains the domain logic, including:
//! - Customer/organization connection lifecycle
//! - Measurement report versioning and sign-off
//! - Lifecycle event notifications

pub mod actor;
pub mod connection;
pub mod error;
pub mod notify;
pub mod report;
pub mod store;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
