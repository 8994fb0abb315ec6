use super::OfflineQueueService;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, info};

impl OfflineQueueService {
    /// Starts following connectivity. Each offline to online transition syncs after the
    /// reconnect debounce; an initial sync runs right away when already online.
    pub async fn start(&self) {
        self.stopped.store(false, Ordering::Release);
        self.publish_count().await;

        let mut rx = self.connectivity.subscribe();
        let weak = self.weak_self.clone();
        let debounce = self.settings.reconnect_debounce;

        let listener = tokio::spawn(async move {
            let mut was_online = *rx.borrow_and_update();
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                let came_online = online && !was_online;
                was_online = online;
                if !came_online {
                    continue;
                }

                debug!(target: "offline::queue", "back online, waiting for network to settle");
                tokio::time::sleep(debounce).await;
                was_online = *rx.borrow_and_update();
                if !was_online {
                    continue;
                }
                let Some(service) = weak.upgrade() else {
                    break;
                };
                service.sync().await;
            }
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            if let Some(previous) = tasks.listener.replace(listener) {
                previous.abort();
            }
        }

        if self.connectivity.is_online() {
            self.spawn_delayed_sync(Duration::ZERO, "start");
        }
        info!(target: "offline::queue", "offline queue started");
    }

    /// Stops the connectivity listener, pending triggers and the retry timer.
    /// A pass already running completes normally.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::Release);
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.abort_all();
        }
        info!(target: "offline::queue", "offline queue stopped");
    }
}
