//! Write-behind queue.
//!
//! Write intents are enqueued by the request path and drained in batches by
//! the flush loop. The queue is unbounded and never applies backpressure;
//! enqueue always succeeds.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::queue";

/// A `(id, content)` pair queued for durable persistence.
///
/// Multiple intents for the same id may coexist; persistence upserts by id,
/// so the last intent in a batch determines the final durable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteIntent {
    pub id: String,
    pub content: String,
}

/// Unbounded FIFO of pending write intents.
///
/// The mutex is the only synchronization needed between producers and the
/// flush loop; critical sections are single push/drain operations.
pub struct WriteQueue {
    queue: Mutex<VecDeque<WriteIntent>>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Enqueue a write intent. Non-blocking; always succeeds.
    pub fn enqueue(&self, id: impl Into<String>, content: impl Into<String>) {
        let intent = WriteIntent {
            id: id.into(),
            content: content.into(),
        };
        let mut queue = mutex_lock(&self.queue, SOURCE, "enqueue");
        queue.push_back(intent);
        debug!(queue_len = queue.len(), "Write intent enqueued");
    }

    /// Atomically drain everything currently queued, in arrival order.
    ///
    /// Intents enqueued after the drain snapshot stay queued for the next
    /// cycle.
    pub fn drain_all(&self) -> Vec<WriteIntent> {
        mutex_lock(&self.queue, SOURCE, "drain_all")
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WriteQueue {
    fn default() -> Self {
        Self::new()
    }
}
