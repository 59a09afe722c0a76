//! Report lifecycle
//!
//! Centralizes the copy-on-edit version bump and the draft → confirmed →
//! shared transitions, so the increment-and-immutability invariant is
//! enforced in one place.

use std::sync::Arc;

use uuid::Uuid;

use crate::actor::Actor;
use crate::notify::{LifecycleEvent, NotificationSink};
use crate::{Error, Result};

use super::model::{Report, ReportKey, ReportStatus};
use super::repository::{ReportRepository, ReportUpdate};

pub struct ReportLifecycle {
    repo: Arc<dyn ReportRepository>,
    sink: Arc<dyn NotificationSink>,
}

impl ReportLifecycle {
    pub fn new(repo: Arc<dyn ReportRepository>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { repo, sink }
    }

    /// Create a draft for the grouping key
    ///
    /// Version 1 for a fresh key. When the latest version is confirmed or
    /// shared, this is the copy-on-edit path and produces `latest + 1`. A
    /// live draft must be edited in place instead; creating a second draft
    /// fails with `DraftAlreadyExists`.
    pub async fn create_draft(
        &self,
        key: ReportKey,
        payload: serde_json::Value,
        actor: &Actor,
    ) -> Result<Report> {
        if !actor.role.can_edit_reports() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not create report drafts",
                actor.role.as_str()
            )));
        }

        let version = match self.repo.latest_version(key).await? {
            None => 1,
            Some(latest) if latest.status == ReportStatus::Draft => {
                return Err(Error::DraftAlreadyExists(format!(
                    "Draft version {} already exists; edit it in place",
                    latest.version
                )));
            }
            Some(latest) => latest.version + 1,
        };

        let report = self
            .repo
            .insert_version(Report::new(key, version, payload, actor.user_id))
            .await?;
        tracing::info!(report_id = %report.id, version, "report draft created");
        self.sink
            .notify(LifecycleEvent::DraftCreated {
                report_id: report.id,
                version: report.version,
            })
            .await;
        Ok(report)
    }

    /// Replace the payload of a live draft
    ///
    /// Confirmed and shared rows are never mutated; a stale or immutable row
    /// fails with `InvalidTransition`.
    pub async fn edit_draft(
        &self,
        report_id: Uuid,
        payload: serde_json::Value,
        actor: &Actor,
    ) -> Result<Report> {
        if !actor.role.can_edit_reports() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not edit report drafts",
                actor.role.as_str()
            )));
        }
        let update = ReportUpdate {
            payload: Some(payload),
            ..Default::default()
        };
        self.repo
            .update_if_status(report_id, ReportStatus::Draft, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!(
                    "Report {} is not an editable draft",
                    report_id
                ))
            })
    }

    /// Sign off a draft
    pub async fn confirm(&self, report_id: Uuid, actor: &Actor) -> Result<Report> {
        if !actor.role.can_confirm_reports() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not confirm reports",
                actor.role.as_str()
            )));
        }
        let update = ReportUpdate {
            status: Some(ReportStatus::Confirmed),
            ..Default::default()
        };
        let report = self
            .repo
            .update_if_status(report_id, ReportStatus::Draft, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!("Only drafts can be confirmed: {}", report_id))
            })?;

        tracing::info!(report_id = %report_id, version = report.version, "report confirmed");
        self.sink
            .notify(LifecycleEvent::ReportConfirmed {
                report_id,
                version: report.version,
            })
            .await;
        Ok(report)
    }

    /// Make a confirmed report visible to the customer
    ///
    /// Shared is terminal for the row; further edits produce a new version
    /// through [`create_draft`].
    ///
    /// [`create_draft`]: ReportLifecycle::create_draft
    pub async fn share(&self, report_id: Uuid, actor: &Actor) -> Result<Report> {
        if !actor.role.can_share_reports() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not share reports",
                actor.role.as_str()
            )));
        }
        let update = ReportUpdate {
            status: Some(ReportStatus::Shared),
            ..Default::default()
        };
        let report = self
            .repo
            .update_if_status(report_id, ReportStatus::Confirmed, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!(
                    "Only confirmed reports may be shared: {}",
                    report_id
                ))
            })?;

        tracing::info!(report_id = %report_id, version = report.version, "report shared");
        self.sink
            .notify(LifecycleEvent::ReportShared {
                report_id,
                version: report.version,
            })
            .await;
        Ok(report)
    }

    /// All versions for the grouping key, descending by version
    pub async fn list_versions(&self, key: ReportKey) -> Result<Vec<Report>> {
        self.repo.list_versions(key).await
    }

    /// Get a report version by row ID
    pub async fn get(&self, report_id: Uuid) -> Result<Report> {
        self.repo
            .get(report_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Report not found: {}", report_id)))
    }

    /// Administrative removal of a single version row
    pub async fn delete(&self, report_id: Uuid, actor: &Actor) -> Result<()> {
        if !actor.role.can_delete_reports() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not delete reports",
                actor.role.as_str()
            )));
        }
        if !self.repo.delete(report_id).await? {
            return Err(Error::NotFound(format!("Report not found: {}", report_id)));
        }
        tracing::info!(report_id = %report_id, "report deleted");
        Ok(())
    }
}
