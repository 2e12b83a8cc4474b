//! The write-behind flush loop.
//!
//! On a fixed period the loop drains every queued intent into a local batch
//! and applies them to the durable store in arrival order. Because
//! persistence upserts by id, the last intent for a given id in a batch
//! determines the final durable value; earlier intents for the same id are
//! harmlessly overwritten. A failed intent is logged and the rest of the
//! batch still applies. The loop never terminates on error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::WriteQueue;

use super::repos::PagesRepo;

const SOURCE: &str = "application::flush";

pub struct FlushLoop {
    queue: Arc<WriteQueue>,
    pages: Arc<dyn PagesRepo>,
    period: Duration,
}

impl FlushLoop {
    pub fn new(queue: Arc<WriteQueue>, pages: Arc<dyn PagesRepo>, period: Duration) -> Self {
        Self {
            queue,
            pages,
            period,
        }
    }

    /// Run forever, draining the queue once per period.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            self.flush_once().await;
        }
    }

    /// Drain the queue and apply the batch. Returns how many intents were
    /// applied successfully.
    pub async fn flush_once(&self) -> usize {
        let batch = self.queue.drain_all();
        if batch.is_empty() {
            debug!(target = SOURCE, "Flush cycle: queue empty");
            return 0;
        }

        let batch_len = batch.len();
        let mut applied = 0;
        for intent in batch {
            match self.pages.upsert_content(&intent.id, &intent.content).await {
                Ok(()) => applied += 1,
                Err(err) => {
                    // Keep going: one bad intent must not starve the rest.
                    warn!(
                        target = SOURCE,
                        page_id = %intent.id,
                        error = %err,
                        "Failed to persist write intent"
                    );
                }
            }
        }

        info!(
            target = SOURCE,
            batch_len,
            applied,
            remaining = self.queue.len(),
            "Flush cycle complete"
        );
        applied
    }
}
