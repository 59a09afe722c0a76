//! Connection model definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Party;

/// Approval status of a customer/organization link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Approved,
    Rejected,
}

impl ConnectionStatus {
    /// Whether the counter-party has already ruled on the request
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Decision taken on a pending connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDecision {
    Approve,
    Reject,
}

/// A link between one customer company and one measuring organization
///
/// At most one connection exists per (customer, organization) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub organization_id: Uuid,
    pub status: ConnectionStatus,
    pub requested_by: Party,
    pub nickname: Option<String>,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    /// Set once the 7-day expiry notification has fired for the current
    /// contract period; re-armed when the end date changes
    pub notified_7_days: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Create a new pending connection requested by the given party
    pub fn new(customer_id: Uuid, organization_id: Uuid, requested_by: Party) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            organization_id,
            status: ConnectionStatus::Pending,
            requested_by,
            nickname: None,
            contract_start: None,
            contract_end: None,
            notified_7_days: false,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display label
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}
