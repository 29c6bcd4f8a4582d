use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::presence::DirectorySource;

/// Periodically replaces the local user directory with the remote copy.
pub struct DirectoryRefreshService {
    source: DirectorySource,
    client: reqwest::Client,
    period: Duration,
    shutdown_rx: watch::Receiver<()>,
}

impl DirectoryRefreshService {
    pub fn new(source: DirectorySource, period: Duration, shutdown_rx: watch::Receiver<()>) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            period,
            shutdown_rx,
        }
    }

    pub async fn start_periodic_refresh(mut self) {
        info!(period_secs = self.period.as_secs(), "Directory refresh task started.");

        // The first tick fires immediately.
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.source.refresh(&self.client).await {
                        error!(error = %e, "Failed to refresh user directory, keeping the local copy.");
                    }
                },
                _ = self.shutdown_rx.changed() => {
                    info!("Directory refresh task shutting down.");
                    break;
                }
            }
        }
    }
}
