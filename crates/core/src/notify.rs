//! Lifecycle event notifications
//!
//! State transitions emit events to a [`NotificationSink`]. Delivery is
//! fire-and-forget from the core's perspective; the sink owns any further
//! guarantees.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted on connection and report transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    ConnectionRequested {
        connection_id: Uuid,
        customer_id: Uuid,
        organization_id: Uuid,
    },
    ConnectionApproved {
        connection_id: Uuid,
    },
    ConnectionRejected {
        connection_id: Uuid,
    },
    ContractUpdated {
        connection_id: Uuid,
        contract_start: NaiveDate,
        contract_end: NaiveDate,
    },
    ContractExpiring {
        connection_id: Uuid,
        contract_end: NaiveDate,
    },
    ConnectionRemoved {
        connection_id: Uuid,
    },
    DraftCreated {
        report_id: Uuid,
        version: u32,
    },
    ReportConfirmed {
        report_id: Uuid,
        version: u32,
    },
    ReportShared {
        report_id: Uuid,
        version: u32,
    },
}

/// Receives lifecycle transition events
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: LifecycleEvent);
}

/// Sink that logs events through `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, event: LifecycleEvent) {
        tracing::info!(?event, "lifecycle event");
    }
}
