use super::OfflineQueueService;
use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::QueueEntryId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// In-memory backoff deadlines. Lost on restart, which makes every entry eligible again.
#[derive(Debug, Default)]
pub(super) struct RetrySchedule {
    deadlines: HashMap<QueueEntryId, Instant>,
}

impl RetrySchedule {
    pub fn defer(&mut self, id: QueueEntryId, until: Instant) {
        self.deadlines.insert(id, until);
    }

    pub fn is_deferred(&self, id: &QueueEntryId, now: Instant) -> bool {
        self.deadlines
            .get(id)
            .is_some_and(|deadline| *deadline > now)
    }

    pub fn forget(&mut self, id: &QueueEntryId) {
        self.deadlines.remove(id);
    }

    /// Drops deadlines for entries no longer in the store.
    pub fn retain_entries(&mut self, entries: &[QueueEntry]) {
        let live: HashSet<&QueueEntryId> = entries.iter().map(|entry| &entry.id).collect();
        self.deadlines.retain(|id, _| live.contains(id));
    }

    pub fn earliest(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

struct RetryTimer {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub(super) struct BackgroundTasks {
    pub listener: Option<JoinHandle<()>>,
    retry_timer: Option<RetryTimer>,
    timer_generation: u64,
    triggers: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    fn track_trigger(&mut self, handle: JoinHandle<()>) {
        self.triggers.retain(|trigger| !trigger.is_finished());
        self.triggers.push(handle);
    }

    fn cancel_retry_timer(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.handle.abort();
        }
    }

    pub fn abort_all(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        self.cancel_retry_timer();
        for trigger in self.triggers.drain(..) {
            trigger.abort();
        }
    }
}

impl OfflineQueueService {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Fire-and-forget sync after `delay`, skipped if the device went offline meanwhile.
    pub(super) fn spawn_delayed_sync(&self, delay: Duration, reason: &'static str) {
        if self.is_stopped() {
            return;
        }
        let weak = self.weak_self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(service) = weak.upgrade() else {
                return;
            };
            if service.connectivity.is_online() {
                debug!(target: "offline::queue", reason, "running triggered sync");
                service.sync().await;
            }
        });
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.track_trigger(handle);
        }
    }

    /// Points the single retry timer at the earliest backoff deadline.
    pub(super) fn rearm_retry_timer(&self) {
        let earliest = match self.schedule.lock() {
            Ok(schedule) => schedule.earliest(),
            Err(_) => None,
        };
        let Ok(mut tasks) = self.tasks.lock() else {
            return;
        };

        let Some(deadline) = earliest.filter(|_| !self.is_stopped()) else {
            tasks.cancel_retry_timer();
            return;
        };
        let now = self.clock.now();
        if let Some(timer) = &tasks.retry_timer {
            if timer.deadline == deadline && deadline > now && !timer.handle.is_finished() {
                return;
            }
        }
        tasks.cancel_retry_timer();

        tasks.timer_generation += 1;
        let generation = tasks.timer_generation;
        let wait = deadline.saturating_duration_since(now);
        let weak = self.weak_self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            let Some(service) = weak.upgrade() else {
                return;
            };
            // release the slot first so the pass below can arm a successor
            if let Ok(mut tasks) = service.tasks.lock() {
                if tasks
                    .retry_timer
                    .as_ref()
                    .is_some_and(|timer| timer.generation == generation)
                {
                    tasks.retry_timer = None;
                }
            }
            if service.connectivity.is_online() {
                debug!(target: "offline::queue", "retry timer fired");
                service.sync().await;
            }
        });

        debug!(
            target: "offline::queue",
            wait_ms = wait.as_millis() as u64,
            "retry timer armed"
        );
        tasks.retry_timer = Some(RetryTimer {
            generation,
            deadline,
            handle,
        });
    }

    pub(super) fn cancel_retry_timer(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.cancel_retry_timer();
        }
    }

    #[cfg(test)]
    pub(super) fn has_retry_timer(&self) -> bool {
        self.tasks
            .lock()
            .map(|tasks| tasks.retry_timer.is_some())
            .unwrap_or(false)
    }
}
