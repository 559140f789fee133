//! Background tasks: fixed-interval auto-refresh and filter debouncing.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::DashboardController;
use crate::models::FilterQuery;

/// Handles to the controller's background tasks. Dropping the handle also
/// stops them.
pub struct ControllerHandle {
    shutdown: watch::Sender<bool>,
    poller: JoinHandle<()>,
    debouncer: JoinHandle<()>,
}

impl ControllerHandle {
    /// Stop both tasks and wait for them to finish.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        let _ = self.poller.await;
        let _ = self.debouncer.await;
    }
}

pub(super) fn spawn(controller: Arc<DashboardController>) -> ControllerHandle {
    let (shutdown, stop) = watch::channel(false);
    let poller = tokio::spawn(run_poller(Arc::clone(&controller), stop.clone()));
    // Subscribe before returning so requests made right after `spawn` are seen.
    let updates = controller.filter_updates();
    let debouncer = tokio::spawn(run_debouncer(controller, updates, stop));
    ControllerHandle {
        shutdown,
        poller,
        debouncer,
    }
}

/// Refresh on every tick. The first tick fires immediately; ticks missed
/// while a slow fetch runs are skipped rather than replayed.
async fn run_poller(controller: Arc<DashboardController>, mut stop: watch::Receiver<bool>) {
    let mut interval = time::interval(controller.settings().refresh_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    log::info!(
        "Auto-refresh every {:?} from {}",
        controller.settings().refresh_interval,
        controller.source_description()
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = controller.try_refresh().await {
                    log::warn!("Scheduled refresh failed: {}", e);
                }
            }
            _ = stop.changed() => {
                log::info!("Auto-refresh stopped");
                break;
            }
        }
    }
}

/// Apply requested filters once no newer request arrived for the debounce
/// delay.
async fn run_debouncer(
    controller: Arc<DashboardController>,
    mut updates: watch::Receiver<FilterQuery>,
    mut stop: watch::Receiver<bool>,
) {
    let delay = controller.settings().debounce;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = stop.changed() => break,
        }

        // Restart the quiet period on every further change.
        loop {
            tokio::select! {
                _ = time::sleep(delay) => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = stop.changed() => return,
            }
        }

        let query = updates.borrow_and_update().clone();
        log::debug!("Applying debounced filter {:?}", query);
        controller.apply_filter(query);
    }
}
