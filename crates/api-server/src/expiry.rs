//! Contract-expiry sweep
//!
//! Periodically finds approved connections whose contract ends within the
//! notification window, emits a `ContractExpiring` event for each, then
//! flags the connection so the notification fires once per contract period.

use std::time::Duration;

use pmms_core::notify::{LifecycleEvent, NotificationSink};

use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawn the periodic expiring-contract sweep
pub fn start_expiry_notifier(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sweep_expiring_contracts(&state).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "contract expiry notifications sent"),
                Err(err) => tracing::warn!("Contract expiry sweep failed: {}", err),
            }
        }
    });
}

/// Notify and flag every approved connection entering the expiry window
pub async fn sweep_expiring_contracts(state: &AppState) -> pmms_core::Result<usize> {
    let today = chrono::Utc::now().date_naive();
    let expiring = state.connections().expiring_contracts(today).await?;
    let count = expiring.len();

    for connection in expiring {
        if let Some(contract_end) = connection.contract_end {
            state
                .notifications()
                .notify(LifecycleEvent::ContractExpiring {
                    connection_id: connection.id,
                    contract_end,
                })
                .await;
        }
        state.connections().mark_notified(connection.id).await?;
    }
    Ok(count)
}
