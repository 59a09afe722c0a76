//! Report model definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-off status of a report version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Confirmed,
    Shared,
}

impl ReportStatus {
    /// Confirmed and shared rows are immutable in content; edits go through
    /// the copy-on-edit version bump instead
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Shared)
    }
}

/// Grouping key identifying a logical report across its versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportKey {
    pub customer_id: Uuid,
    pub stack_id: Uuid,
    pub measured_at: NaiveDate,
}

/// One stored version of a measurement report
///
/// Versions within a grouping key are strictly increasing contiguous
/// integers starting at 1; all versions are retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub stack_id: Uuid,
    pub measured_at: NaiveDate,
    pub version: u32,
    pub status: ReportStatus,
    pub payload: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Create a draft row at the given version
    pub fn new(key: ReportKey, version: u32, payload: serde_json::Value, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id: key.customer_id,
            stack_id: key.stack_id,
            measured_at: key.measured_at,
            version,
            status: ReportStatus::Draft,
            payload,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> ReportKey {
        ReportKey {
            customer_id: self.customer_id,
            stack_id: self.stack_id,
            measured_at: self.measured_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ReportKey {
        ReportKey {
            customer_id: Uuid::new_v4(),
            stack_id: Uuid::new_v4(),
            measured_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_new_report_is_draft() {
        let key = key();
        let report = Report::new(key, 1, serde_json::json!({"nox": 12.5}), Uuid::new_v4());

        assert_eq!(report.version, 1);
        assert_eq!(report.status, ReportStatus::Draft);
        assert_eq!(report.key(), key);
    }

    #[test]
    fn test_immutability_flag() {
        assert!(!ReportStatus::Draft.is_immutable());
        assert!(ReportStatus::Confirmed.is_immutable());
        assert!(ReportStatus::Shared.is_immutable());
    }
}
