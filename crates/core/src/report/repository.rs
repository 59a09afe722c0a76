//! Report repository trait
//!
//! Defines the interface for report storage operations. Version insertion
//! and status writes are both conditional so the append-only versioning
//! invariant survives concurrent callers.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Report, ReportKey, ReportStatus};
use crate::Result;

/// Field changes applied by a conditional update
///
/// `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct ReportUpdate {
    pub status: Option<ReportStatus>,
    pub payload: Option<serde_json::Value>,
}

/// Repository interface for report storage
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert the next version row for the report's grouping key
    ///
    /// The store accepts the row only when `report.version` is exactly one
    /// past the latest stored version for the key (or 1 for a fresh key);
    /// anything else is a lost race and fails with `InvalidTransition`.
    async fn insert_version(&self, report: Report) -> Result<Report>;

    /// Get a report version by row ID
    async fn get(&self, id: Uuid) -> Result<Option<Report>>;

    /// The highest-version row for a grouping key
    async fn latest_version(&self, key: ReportKey) -> Result<Option<Report>>;

    /// All versions for the key, descending by version
    async fn list_versions(&self, key: ReportKey) -> Result<Vec<Report>>;

    /// Apply `update` only while the stored status equals `expected`
    ///
    /// Returns the updated row, or `None` when the status check failed.
    /// Fails with `NotFound` when no row exists for `id`.
    async fn update_if_status(
        &self,
        id: Uuid,
        expected: ReportStatus,
        update: ReportUpdate,
    ) -> Result<Option<Report>>;

    /// Delete a report version row; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
