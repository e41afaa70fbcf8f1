//! # Expiry Sweeper
//!
//! The authoritative driver of event expiration. A single background task
//! scans the active events on a fixed interval and completes the ones whose
//! window has closed, so expiry makes progress even when no client is
//! looking. Read-path observers race it through the same compare-and-swap,
//! which keeps the transition exactly-once.

use std::sync::Arc;
use std::time::Duration;

use domains::OgiriRepo;
use tracing::{debug, info, warn};

use crate::ogiri_service::OgiriService;

pub struct ExpirySweeper {
    service: Arc<OgiriService>,
    repo: Arc<dyn OgiriRepo>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(service: Arc<OgiriService>, repo: Arc<dyn OgiriRepo>, interval: Duration) -> Self {
        Self {
            service,
            repo,
            interval,
        }
    }

    /// One pass over the active events. Returns how many transitions this
    /// pass performed. Errors on individual events are logged and skipped;
    /// the next pass retries them.
    pub async fn sweep(&self) -> usize {
        let events = match self.repo.list_active_events().await {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "sweep could not list active events");
                return 0;
            }
        };

        let mut completed = 0;
        for event in events {
            match self
                .service
                .complete_if_expired(event.thread_id, event.id)
                .await
            {
                Ok(Some(completion)) => {
                    completed += 1;
                    debug!(
                        event_id = %completion.event_id,
                        best_answer = ?completion.best_answer_id,
                        "sweeper completed event"
                    );
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(event_id = %event.id, error = %err, "sweep failed for event");
                }
            }
        }
        completed
    }

    /// Runs forever on the configured interval. Spawn it; abort the task to
    /// stop it.
    pub async fn run(self) {
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "expiry sweeper running");
        loop {
            tick.tick().await;
            let completed = self.sweep().await;
            if completed > 0 {
                info!(completed, "sweep pass finished");
            }
        }
    }
}
