//! Connection lifecycle manager
//!
//! Validates the acting party and its permissions, then drives status
//! transitions through conditional updates so concurrent callers cannot
//! double-apply a decision.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::actor::{Actor, ActorRole, Party};
use crate::notify::{LifecycleEvent, NotificationSink};
use crate::{Error, Result};

use super::model::{Connection, ConnectionDecision, ConnectionStatus};
use super::repository::{ConnectionRepository, ConnectionUpdate};

/// Days before contract end at which the expiry notification fires
const EXPIRY_WINDOW_DAYS: i64 = 7;

pub struct ConnectionManager {
    repo: Arc<dyn ConnectionRepository>,
    sink: Arc<dyn NotificationSink>,
}

impl ConnectionManager {
    pub fn new(repo: Arc<dyn ConnectionRepository>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { repo, sink }
    }

    /// Request a new connection between a customer and an organization
    ///
    /// The connection starts pending, awaiting the counter-party's decision.
    /// Fails with `DuplicateConnection` when any record for the pair already
    /// exists; a rejected record must be removed via [`disconnect`] before
    /// the pair can be re-requested.
    ///
    /// [`disconnect`]: ConnectionManager::disconnect
    pub async fn request(
        &self,
        customer_id: Uuid,
        organization_id: Uuid,
        actor: &Actor,
    ) -> Result<Connection> {
        let connection = Connection::new(customer_id, organization_id, actor.party);
        let connection = self.repo.insert_new(connection).await?;
        tracing::info!(
            connection_id = %connection.id,
            requested_by = actor.party.as_str(),
            "connection requested"
        );
        self.sink
            .notify(LifecycleEvent::ConnectionRequested {
                connection_id: connection.id,
                customer_id,
                organization_id,
            })
            .await;
        Ok(connection)
    }

    /// Approve or reject a pending connection
    ///
    /// Only an administrator of the counter-party (the side that did not
    /// initiate the request) may decide. Valid only while the connection is
    /// still pending; anything else fails with `InvalidTransition`.
    pub async fn decide(
        &self,
        connection_id: Uuid,
        actor: &Actor,
        decision: ConnectionDecision,
    ) -> Result<Connection> {
        let current = self.get(connection_id).await?;
        if actor.party == current.requested_by {
            return Err(Error::Forbidden(
                "Only the counter-party may decide a connection request".to_string(),
            ));
        }
        if !actor.role.can_decide_connections() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not decide connection requests",
                actor.role.as_str()
            )));
        }

        let update = match decision {
            ConnectionDecision::Approve => ConnectionUpdate {
                status: Some(ConnectionStatus::Approved),
                approved_at: Some(Utc::now()),
                ..Default::default()
            },
            ConnectionDecision::Reject => ConnectionUpdate {
                status: Some(ConnectionStatus::Rejected),
                ..Default::default()
            },
        };
        let updated = self
            .repo
            .update_if_status(connection_id, ConnectionStatus::Pending, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!(
                    "Connection {} is no longer pending",
                    connection_id
                ))
            })?;

        tracing::info!(connection_id = %connection_id, ?decision, "connection decided");
        let event = match decision {
            ConnectionDecision::Approve => LifecycleEvent::ConnectionApproved { connection_id },
            ConnectionDecision::Reject => LifecycleEvent::ConnectionRejected { connection_id },
        };
        self.sink.notify(event).await;
        Ok(updated)
    }

    /// Set the display label either party uses for the link
    pub async fn set_nickname(
        &self,
        connection_id: Uuid,
        actor: &Actor,
        nickname: String,
    ) -> Result<Connection> {
        if actor.role == ActorRole::Viewer {
            return Err(Error::Forbidden(
                "Viewers may not rename connections".to_string(),
            ));
        }
        let current = self.get(connection_id).await?;
        let update = ConnectionUpdate {
            nickname: Some(nickname),
            ..Default::default()
        };
        self.repo
            .update_if_status(connection_id, current.status, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!(
                    "Connection {} changed while renaming",
                    connection_id
                ))
            })
    }

    /// Set the contract period on an approved connection
    ///
    /// Only the organization side manages contract dates. Changing the end
    /// date to a different value re-arms the expiry notification for the new
    /// period.
    pub async fn set_contract_period(
        &self,
        connection_id: Uuid,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Connection> {
        if actor.party != Party::Organization || !actor.role.can_manage_contracts() {
            return Err(Error::Forbidden(
                "Only an organization administrator may set contract dates".to_string(),
            ));
        }
        if end < start {
            return Err(Error::InvalidState(format!(
                "Contract end {} precedes start {}",
                end, start
            )));
        }

        let current = self.get(connection_id).await?;
        let rearm = current.contract_end != Some(end);
        let update = ConnectionUpdate {
            contract_start: Some(start),
            contract_end: Some(end),
            notified_7_days: rearm.then_some(false),
            ..Default::default()
        };
        let updated = self
            .repo
            .update_if_status(connection_id, ConnectionStatus::Approved, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "Connection {} is not approved; contract dates require an approved connection",
                    connection_id
                ))
            })?;

        tracing::info!(connection_id = %connection_id, %start, %end, "contract period set");
        self.sink
            .notify(LifecycleEvent::ContractUpdated {
                connection_id,
                contract_start: start,
                contract_end: end,
            })
            .await;
        Ok(updated)
    }

    /// Approved connections whose contract ends within the notification
    /// window and have not been notified yet
    ///
    /// The caller is expected to notify each hit and then call
    /// [`mark_notified`]. Already-expired contracts are excluded.
    ///
    /// [`mark_notified`]: ConnectionManager::mark_notified
    pub async fn expiring_contracts(&self, today: NaiveDate) -> Result<Vec<Connection>> {
        let approved = self.repo.find_by_status(ConnectionStatus::Approved).await?;
        Ok(approved
            .into_iter()
            .filter(|connection| {
                !connection.notified_7_days
                    && connection.contract_end.is_some_and(|end| {
                        end >= today && (end - today).num_days() <= EXPIRY_WINDOW_DAYS
                    })
            })
            .collect())
    }

    /// Flag a connection as notified for the current contract period
    ///
    /// Idempotent: calling it again for an already-notified connection is a
    /// no-op, not an error.
    pub async fn mark_notified(&self, connection_id: Uuid) -> Result<()> {
        let current = self.get(connection_id).await?;
        if current.notified_7_days {
            return Ok(());
        }
        let update = ConnectionUpdate {
            notified_7_days: Some(true),
            ..Default::default()
        };
        self.repo
            .update_if_status(connection_id, ConnectionStatus::Approved, update)
            .await?
            .ok_or_else(|| {
                Error::InvalidState(format!("Connection {} is not approved", connection_id))
            })?;
        Ok(())
    }

    /// Remove the link entirely (hard delete)
    ///
    /// Also the administrative path that clears a rejected record so the
    /// pair can be re-requested.
    pub async fn disconnect(&self, connection_id: Uuid, actor: &Actor) -> Result<()> {
        if !actor.role.can_decide_connections() {
            return Err(Error::Forbidden(format!(
                "Role '{}' may not remove connections",
                actor.role.as_str()
            )));
        }
        if !self.repo.delete(connection_id).await? {
            return Err(Error::NotFound(format!(
                "Connection not found: {}",
                connection_id
            )));
        }
        tracing::info!(connection_id = %connection_id, "connection removed");
        self.sink
            .notify(LifecycleEvent::ConnectionRemoved { connection_id })
            .await;
        Ok(())
    }

    /// Get a connection by ID
    pub async fn get(&self, connection_id: Uuid) -> Result<Connection> {
        self.repo.get(connection_id).await?.ok_or_else(|| {
            Error::NotFound(format!("Connection not found: {}", connection_id))
        })
    }

    /// Get all connections
    pub async fn list(&self) -> Result<Vec<Connection>> {
        self.repo.list().await
    }

    /// Get connections with the given status
    pub async fn list_by_status(&self, status: ConnectionStatus) -> Result<Vec<Connection>> {
        self.repo.find_by_status(status).await
    }
}
