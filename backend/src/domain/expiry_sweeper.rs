//! Background task removing subscriptions whose timeout has elapsed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::domain::ports::SubscriptionMaintenance;

/// Periodically sweeps expired subscriptions.
pub struct ExpirySweeper {
    maintenance: Arc<dyn SubscriptionMaintenance>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(maintenance: Arc<dyn SubscriptionMaintenance>, interval: Duration) -> Self {
        Self {
            maintenance,
            interval,
        }
    }

    /// Run a single sweep and return the number of removed subscriptions.
    /// Failures are logged and count as zero.
    pub async fn sweep_once(&self) -> usize {
        match self.maintenance.sweep_expired().await {
            Ok(removed) => {
                if !removed.is_empty() {
                    info!(count = removed.len(), "expired subscriptions removed");
                }
                removed.len()
            }
            Err(err) => {
                error!(error = %err, "subscription sweep failed");
                0
            }
        }
    }

    /// Sweep forever at the configured interval.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval_ms = self.interval.as_millis() as u64, "expiry sweeper started");
        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// Spawn [`ExpirySweeper::run`] on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
