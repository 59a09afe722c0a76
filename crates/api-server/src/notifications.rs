//! In-memory notification log
//!
//! Collects lifecycle events so clients can poll recent activity. The log is
//! bounded; delivery is best-effort, matching the fire-and-forget sink
//! contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use pmms_core::notify::{LifecycleEvent, NotificationSink};

const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LifecycleEvent,
}

#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: RwLock<Vec<NotificationEntry>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: usize) -> Vec<NotificationEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait]
impl NotificationSink for NotificationLog {
    async fn notify(&self, event: LifecycleEvent) {
        tracing::info!(?event, "lifecycle event");
        let mut entries = self.entries.write().await;
        if entries.len() >= MAX_ENTRIES {
            entries.remove(0);
        }
        entries.push(NotificationEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            event,
        });
    }
}
