//! Connection repository trait
//!
//! Defines the interface for connection storage operations. Status writes
//! never happen unconditionally: they go through [`update_if_status`], a
//! check-and-set against the currently stored status.
//!
//! [`update_if_status`]: ConnectionRepository::update_if_status

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::model::{Connection, ConnectionStatus};
use crate::Result;

/// Field changes applied by a conditional update
///
/// `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct ConnectionUpdate {
    pub status: Option<ConnectionStatus>,
    pub approved_at: Option<DateTime<Utc>>,
    pub nickname: Option<String>,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub notified_7_days: Option<bool>,
}

/// Repository interface for connection storage
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Insert a new connection, atomically rejecting an existing
    /// (customer, organization) pair with `DuplicateConnection`
    async fn insert_new(&self, connection: Connection) -> Result<Connection>;

    /// Get a connection by ID
    async fn get(&self, id: Uuid) -> Result<Option<Connection>>;

    /// Find the connection for a (customer, organization) pair
    async fn find_pair(
        &self,
        customer_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Connection>>;

    /// Get all connections
    async fn list(&self) -> Result<Vec<Connection>>;

    /// Find connections by status
    async fn find_by_status(&self, status: ConnectionStatus) -> Result<Vec<Connection>>;

    /// Apply `update` only while the stored status equals `expected`
    ///
    /// Returns the updated row, or `None` when the status check failed
    /// (a lost race or a stale caller). Fails with `NotFound` when no row
    /// exists for `id`.
    async fn update_if_status(
        &self,
        id: Uuid,
        expected: ConnectionStatus,
        update: ConnectionUpdate,
    ) -> Result<Option<Connection>>;

    /// Hard-delete a connection; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
