//! Report module
//!
//! Measurement report versioning: append-only copy-on-edit rows per
//! (customer, stack, measurement date), signed off draft → confirmed →
//! shared.

mod lifecycle;
mod model;
mod repository;

pub use lifecycle::ReportLifecycle;
pub use model::*;
pub use repository::{ReportRepository, ReportUpdate};
