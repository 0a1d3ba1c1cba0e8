//! Queue build requests and result delivery
//!
//! Builds run as background tasks; their results land in a single slot that
//! only ever holds the newest one. A subscriber never sees a backlog, and a
//! late subscriber doesn't get an old result replayed.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::debug;

use super::queue::{QueueBuilder, QueueResult};
use crate::models::CatalogEntry;

/// Accepts queue build requests and publishes their results
///
/// In-flight builds are owned by the controller: dropping it aborts them
/// and they publish nothing.
pub struct QueueController {
    builder: Arc<QueueBuilder>,
    latest: Arc<watch::Sender<Option<QueueResult>>>,
    tasks: JoinSet<()>,
}

impl QueueController {
    pub fn new(builder: QueueBuilder) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            builder: Arc::new(builder),
            latest: Arc::new(latest),
            tasks: JoinSet::new(),
        }
    }

    /// Start building the queue for `entry` from its resume position
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_build(&mut self, entry: CatalogEntry, media_source_index: Option<usize>) {
        // Reap finished builds so the set doesn't grow unbounded
        while self.tasks.try_join_next().is_some() {}

        let builder = Arc::clone(&self.builder);
        let latest = Arc::clone(&self.latest);
        let index = media_source_index.unwrap_or(0);

        debug!(item_id = %entry.id, index, "queue build requested");
        self.tasks.spawn(async move {
            let result = builder
                .build(&entry, entry.playback_position_ticks, index)
                .await;
            // Replaces any result nobody has looked at yet
            latest.send_replace(Some(result));
        });
    }

    /// Subscribe to results published from now on
    pub fn subscribe(&self) -> QueueSubscription {
        QueueSubscription {
            receiver: self.latest.subscribe(),
        }
    }
}

/// Listener end of a [`QueueController`]
#[derive(Debug)]
pub struct QueueSubscription {
    receiver: watch::Receiver<Option<QueueResult>>,
}

impl QueueSubscription {
    /// Wait for the next published result
    ///
    /// Returns `None` once the controller is gone.
    pub async fn next(&mut self) -> Option<QueueResult> {
        loop {
            self.receiver.changed().await.ok()?;
            if let Some(result) = self.receiver.borrow_and_update().clone() {
                return Some(result);
            }
        }
    }

    /// Most recent result without waiting, if one arrived since the last read
    pub fn try_next(&mut self) -> Option<QueueResult> {
        if self.receiver.has_changed().unwrap_or(false) {
            self.receiver.borrow_and_update().clone()
        } else {
            None
        }
    }
}
