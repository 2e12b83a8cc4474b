//! The periodic refresh loop.
//!
//! Each cycle re-derives the settings snapshot from the external settings
//! file, reloads the main page text, and rebuilds the cache's three content
//! maps from a full scan of the durable store. The swap is wholesale, not a
//! merge: a write acknowledged between the scan and the swap whose flush has
//! not landed is transiently reverted until the next drain + refresh cycle.
//! All I/O happens before the lock is taken; only the swaps run under it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::PadCache;

use super::error::AppError;
use super::repos::{BurnRepo, PagesRepo};

const SOURCE: &str = "application::refresh";

/// Parse the line-oriented `key = value` settings resource.
///
/// Blank lines and `#` comments are skipped; lines without `=` are ignored;
/// keys and values are trimmed. Unrecognized keys are kept in the map and
/// simply never consulted.
pub fn parse_settings(text: &str) -> HashMap<String, String> {
    let mut settings = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            settings.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    settings
}

pub struct RefreshLoop {
    cache: Arc<PadCache>,
    pages: Arc<dyn PagesRepo>,
    burns: Arc<dyn BurnRepo>,
    settings_file: PathBuf,
    main_text_file: PathBuf,
    period: Duration,
}

impl RefreshLoop {
    pub fn new(
        cache: Arc<PadCache>,
        pages: Arc<dyn PagesRepo>,
        burns: Arc<dyn BurnRepo>,
        settings_file: PathBuf,
        main_text_file: PathBuf,
        period: Duration,
    ) -> Self {
        Self {
            cache,
            pages,
            burns,
            settings_file,
            main_text_file,
            period,
        }
    }

    /// Run forever, refreshing once per period. Errors are logged and the
    /// loop continues; a transient backend failure leaves the previous
    /// snapshot serving reads.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            if let Err(err) = self.refresh_once().await {
                warn!(
                    target = SOURCE,
                    error = %err,
                    "Refresh cycle failed; serving previous snapshot"
                );
            }
        }
    }

    /// One refresh cycle. Also used for the initial cache load at startup.
    pub async fn refresh_once(&self) -> Result<(), AppError> {
        // (a) settings resource → settings snapshot
        let settings_text = tokio::fs::read_to_string(&self.settings_file)
            .await
            .unwrap_or_default();
        let settings = parse_settings(&settings_text);

        // (b) main read-only page source
        let main_text = tokio::fs::read_to_string(&self.main_text_file)
            .await
            .unwrap_or_default();

        // (c) full durable-store scan
        let page_records = self.pages.scan_pages().await?;
        let burn_records = self.burns.scan_burns().await?;

        let mut pages = HashMap::with_capacity(page_records.len());
        let mut shares = HashMap::new();
        for record in page_records {
            if let Some(share_id) = record.share_id {
                shares.insert(share_id, record.content.clone());
            }
            pages.insert(record.id, record.content);
        }
        let burns: HashMap<String, String> = burn_records
            .into_iter()
            .map(|record| (record.burn_id, record.content))
            .collect();

        debug!(
            target = SOURCE,
            pages = pages.len(),
            shares = shares.len(),
            burns = burns.len(),
            construction = settings
                .get(crate::cache::store::SETTING_CONSTRUCTION)
                .map(String::as_str)
                .unwrap_or(""),
            "Refresh cycle loaded snapshot"
        );

        // Swap phase: in-memory only, each replacement atomic under the lock.
        self.cache.replace_settings(settings);
        self.cache.set_main_text(main_text);
        self.cache.replace_all(pages, shares, burns);

        Ok(())
    }
}
