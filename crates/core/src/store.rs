//! File-backed store
//!
//! JSON-file persistence behind an in-memory cache. All invariant-bearing
//! writes (pair uniqueness, version contiguity, conditional status updates)
//! are check-and-set operations under the write lock, so concurrent callers
//! observe one winner and one lost race.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::connection::{Connection, ConnectionRepository, ConnectionStatus, ConnectionUpdate};
use crate::report::{Report, ReportKey, ReportRepository, ReportStatus, ReportUpdate};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct StoreState {
    connections: HashMap<Uuid, Connection>,
    reports: HashMap<Uuid, Report>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct StoredState {
    connections: Vec<Connection>,
    reports: Vec<Report>,
}

impl From<StoredState> for StoreState {
    fn from(value: StoredState) -> Self {
        Self {
            connections: value
                .connections
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
            reports: value
                .reports
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
        }
    }
}

impl From<&StoreState> for StoredState {
    fn from(value: &StoreState) -> Self {
        Self {
            connections: value.connections.values().cloned().collect(),
            reports: value.reports.values().cloned().collect(),
        }
    }
}

/// Thread-safe connection/report store with file persistence
#[derive(Clone)]
pub struct FileStore {
    state: Arc<RwLock<StoreState>>,
    file_path: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at the given data directory
    ///
    /// State lives in `state.json` inside the directory; a missing file
    /// starts empty and is created on first write.
    pub async fn new(base_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&base_dir).await.map_err(|err| {
            Error::StoreUnavailable(format!("Failed to create data directory: {}", err))
        })?;

        let file_path = base_dir.join("state.json");
        let state = load_state(&file_path).await?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            file_path,
        })
    }
}

async fn load_state(file_path: &Path) -> Result<StoreState> {
    if !file_path.exists() {
        return Ok(StoreState::default());
    }
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|err| Error::StoreUnavailable(format!("Failed to read state file: {}", err)))?;
    let stored: StoredState = serde_json::from_str(&content)
        .map_err(|err| Error::StoreUnavailable(format!("Failed to parse state file: {}", err)))?;
    Ok(stored.into())
}

async fn persist_state(file_path: &Path, state: &StoreState) -> Result<()> {
    let stored = StoredState::from(state);
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| Error::StoreUnavailable(format!("Failed to serialize state: {}", err)))?;
    tokio::fs::write(file_path, content)
        .await
        .map_err(|err| Error::StoreUnavailable(format!("Failed to write state file: {}", err)))
}

#[async_trait]
impl ConnectionRepository for FileStore {
    async fn insert_new(&self, connection: Connection) -> Result<Connection> {
        let mut state = self.state.write().await;
        if state.connections.values().any(|existing| {
            existing.customer_id == connection.customer_id
                && existing.organization_id == connection.organization_id
        }) {
            return Err(Error::DuplicateConnection(format!(
                "Connection between customer {} and organization {} already exists",
                connection.customer_id, connection.organization_id
            )));
        }
        state.connections.insert(connection.id, connection.clone());
        persist_state(&self.file_path, &state).await?;
        Ok(connection)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Connection>> {
        let state = self.state.read().await;
        Ok(state.connections.get(&id).cloned())
    }

    async fn find_pair(
        &self,
        customer_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Connection>> {
        let state = self.state.read().await;
        Ok(state
            .connections
            .values()
            .find(|connection| {
                connection.customer_id == customer_id
                    && connection.organization_id == organization_id
            })
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Connection>> {
        let state = self.state.read().await;
        let mut connections: Vec<Connection> = state.connections.values().cloned().collect();
        connections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(connections)
    }

    async fn find_by_status(&self, status: ConnectionStatus) -> Result<Vec<Connection>> {
        let state = self.state.read().await;
        let mut connections: Vec<Connection> = state
            .connections
            .values()
            .filter(|connection| connection.status == status)
            .cloned()
            .collect();
        connections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(connections)
    }

    async fn update_if_status(
        &self,
        id: Uuid,
        expected: ConnectionStatus,
        update: ConnectionUpdate,
    ) -> Result<Option<Connection>> {
        let mut state = self.state.write().await;
        let Some(connection) = state.connections.get_mut(&id) else {
            return Err(Error::NotFound(format!("Connection not found: {}", id)));
        };
        if connection.status != expected {
            return Ok(None);
        }

        if let Some(status) = update.status {
            connection.status = status;
        }
        if let Some(approved_at) = update.approved_at {
            connection.approved_at = Some(approved_at);
        }
        if let Some(nickname) = update.nickname {
            connection.nickname = Some(nickname);
        }
        if let Some(contract_start) = update.contract_start {
            connection.contract_start = Some(contract_start);
        }
        if let Some(contract_end) = update.contract_end {
            connection.contract_end = Some(contract_end);
        }
        if let Some(notified) = update.notified_7_days {
            connection.notified_7_days = notified;
        }
        connection.updated_at = Utc::now();
        let updated = connection.clone();

        persist_state(&self.file_path, &state).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let removed = state.connections.remove(&id).is_some();
        if removed {
            persist_state(&self.file_path, &state).await?;
        }
        Ok(removed)
    }
}

#[async_trait]
impl ReportRepository for FileStore {
    async fn insert_version(&self, report: Report) -> Result<Report> {
        let mut state = self.state.write().await;
        let latest = state
            .reports
            .values()
            .filter(|existing| existing.key() == report.key())
            .map(|existing| existing.version)
            .max();
        let expected = latest.map_or(1, |version| version + 1);
        if report.version != expected {
            return Err(Error::InvalidTransition(format!(
                "Stale version {} for report key (expected {})",
                report.version, expected
            )));
        }

        state.reports.insert(report.id, report.clone());
        persist_state(&self.file_path, &state).await?;
        Ok(report)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        let state = self.state.read().await;
        Ok(state.reports.get(&id).cloned())
    }

    async fn latest_version(&self, key: ReportKey) -> Result<Option<Report>> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .values()
            .filter(|report| report.key() == key)
            .max_by_key(|report| report.version)
            .cloned())
    }

    async fn list_versions(&self, key: ReportKey) -> Result<Vec<Report>> {
        let state = self.state.read().await;
        let mut reports: Vec<Report> = state
            .reports
            .values()
            .filter(|report| report.key() == key)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(reports)
    }

    async fn update_if_status(
        &self,
        id: Uuid,
        expected: ReportStatus,
        update: ReportUpdate,
    ) -> Result<Option<Report>> {
        let mut state = self.state.write().await;
        let Some(report) = state.reports.get_mut(&id) else {
            return Err(Error::NotFound(format!("Report not found: {}", id)));
        };
        if report.status != expected {
            return Ok(None);
        }

        if let Some(status) = update.status {
            report.status = status;
        }
        if let Some(payload) = update.payload {
            report.payload = payload;
        }
        report.updated_at = Utc::now();
        let updated = report.clone();

        persist_state(&self.file_path, &state).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let removed = state.reports.remove(&id).is_some();
        if removed {
            persist_state(&self.file_path, &state).await?;
        }
        Ok(removed)
    }
}
