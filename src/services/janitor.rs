use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::time::Instant;

use crate::services::temp::remove_quietly;

struct Entry {
    due: Instant,
    path: PathBuf,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.path == other.path
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then_with(|| self.path.cmp(&other.path))
    }
}

/// Deferred best-effort deletion of conversion outputs.
///
/// Outputs must stay on disk long enough for the client to finish the
/// download, but must not pile up. Registered paths go into a priority
/// queue ordered by expiry; a single background task sleeps until the next
/// entry is due and removes it. Deletion failures are swallowed; a file
/// that is already gone is not an error.
///
/// Registrations are independent: no de-duplication, no cancellation.
pub struct Janitor {
    queue: Mutex<BinaryHeap<Reverse<Entry>>>,
    wakeup: Notify,
    delay: Duration,
}

impl Janitor {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(BinaryHeap::new()),
            wakeup: Notify::new(),
            delay,
        })
    }

    /// Register `path` for deletion after the configured default delay.
    pub fn schedule(&self, path: PathBuf) {
        self.schedule_after(path, self.delay);
    }

    /// Register `path` for deletion after `delay`. Never blocks.
    pub fn schedule_after(&self, path: PathBuf, delay: Duration) {
        tracing::debug!("Scheduling cleanup of {} in {:?}", path.display(), delay);
        self.queue.lock().unwrap().push(Reverse(Entry {
            due: Instant::now() + delay,
            path,
        }));
        self.wakeup.notify_one();
    }

    /// Number of paths still waiting for deletion.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Drive the queue until the shutdown channel flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Janitor started");

        loop {
            let next_due = self
                .queue
                .lock()
                .unwrap()
                .peek()
                .map(|Reverse(entry)| entry.due);

            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("Janitor shutting down, {} entries dropped", self.pending());
                    break;
                }
                _ = self.wakeup.notified() => {
                    // New registration; recompute the next deadline.
                }
                _ = sleep_until_or_forever(next_due) => {
                    self.reap();
                }
            }
        }
    }

    /// Remove every entry whose expiry has passed.
    fn reap(&self) {
        let now = Instant::now();
        loop {
            let expired = {
                let mut queue = self.queue.lock().unwrap();
                match queue.peek() {
                    Some(Reverse(entry)) if entry.due <= now => queue.pop(),
                    _ => None,
                }
            };

            match expired {
                Some(Reverse(entry)) => {
                    tracing::debug!("Removing expired temp file {}", entry.path.display());
                    remove_quietly(&entry.path);
                }
                None => break,
            }
        }
    }
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(due) => tokio::time::sleep_until(due).await,
        None => std::future::pending::<()>().await,
    }
}
