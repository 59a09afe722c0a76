//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use pmms_core::connection::{ConnectionManager, ConnectionRepository};
use pmms_core::notify::NotificationSink;
use pmms_core::report::{ReportLifecycle, ReportRepository};
use pmms_core::store::FileStore;

use crate::notifications::NotificationLog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    connections: ConnectionManager,
    reports: ReportLifecycle,
    notifications: Arc<NotificationLog>,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf) -> pmms_core::Result<Self> {
        let store = Arc::new(FileStore::new(data_dir).await?);
        let notifications = Arc::new(NotificationLog::new());

        let connection_repo: Arc<dyn ConnectionRepository> = Arc::clone(&store) as _;
        let report_repo: Arc<dyn ReportRepository> = Arc::clone(&store) as _;
        let sink: Arc<dyn NotificationSink> = Arc::clone(&notifications) as _;

        let connections = ConnectionManager::new(connection_repo, Arc::clone(&sink));
        let reports = ReportLifecycle::new(report_repo, sink);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                connections,
                reports,
                notifications,
            }),
        })
    }

    /// Get the connection lifecycle manager
    pub fn connections(&self) -> &ConnectionManager {
        &self.inner.connections
    }

    /// Get the report lifecycle manager
    pub fn reports(&self) -> &ReportLifecycle {
        &self.inner.reports
    }

    /// Get the in-memory notification log
    pub fn notifications(&self) -> &NotificationLog {
        &self.inner.notifications
    }
}
