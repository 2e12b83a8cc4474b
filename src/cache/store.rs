//! The authoritative in-memory cache.
//!
//! All reads are served from here; writes land here first and reach the
//! durable store later through the write-behind queue. One coarse mutex
//! guards the whole composite structure; every critical section is a pure
//! in-memory map operation, and no I/O ever happens under the lock.

use std::collections::HashMap;
use std::sync::Mutex;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

/// Settings key recognized from the external settings resource.
pub const SETTING_CONSTRUCTION: &str = "construction";

#[derive(Default)]
struct CacheInner {
    /// `id → content`; absence means the page is blank, never an error.
    pages: HashMap<String, String>,
    /// `share_id → content`, rebuilt wholesale on refresh.
    shares: HashMap<String, String>,
    /// `burn_id → content`, rebuilt wholesale on refresh.
    burns: HashMap<String, String>,
    /// Raw settings mapping from the external resource, replaced atomically.
    settings: HashMap<String, String>,
    /// Content of the distinguished read-only main page.
    main_text: String,
}

/// Coarse-locked cache over pages, share/burn maps, settings, and the main
/// page text.
pub struct PadCache {
    inner: Mutex<CacheInner>,
}

impl PadCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Read a page. A never-written id is a valid blank page, so this
    /// returns an empty string rather than signalling absence.
    pub fn get(&self, id: &str) -> String {
        mutex_lock(&self.inner, SOURCE, "get")
            .pages
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Read through a share token. Absence is distinct from empty content.
    pub fn get_by_share(&self, share_id: &str) -> Option<String> {
        mutex_lock(&self.inner, SOURCE, "get_by_share")
            .shares
            .get(share_id)
            .cloned()
    }

    /// Read through a burn token. Absence is distinct from empty content.
    pub fn get_by_burn(&self, burn_id: &str) -> Option<String> {
        mutex_lock(&self.inner, SOURCE, "get_by_burn")
            .burns
            .get(burn_id)
            .cloned()
    }

    /// Insert or overwrite a page. The caller observes the new content on
    /// the very next `get`, regardless of durable flush timing.
    pub fn put(&self, id: impl Into<String>, content: impl Into<String>) {
        mutex_lock(&self.inner, SOURCE, "put")
            .pages
            .insert(id.into(), content.into());
    }

    pub fn set_share_mapping(&self, share_id: impl Into<String>, content: impl Into<String>) {
        mutex_lock(&self.inner, SOURCE, "set_share_mapping")
            .shares
            .insert(share_id.into(), content.into());
    }

    pub fn set_burn_mapping(&self, burn_id: impl Into<String>, content: impl Into<String>) {
        mutex_lock(&self.inner, SOURCE, "set_burn_mapping")
            .burns
            .insert(burn_id.into(), content.into());
    }

    pub fn remove_burn_mapping(&self, burn_id: &str) {
        mutex_lock(&self.inner, SOURCE, "remove_burn_mapping")
            .burns
            .remove(burn_id);
    }

    /// Wholesale replacement of the three content maps, used by the refresh
    /// loop. This is a replace, not a merge: a write acknowledged after the
    /// refresh scan but before this swap is transiently reverted until the
    /// next drain + refresh cycle.
    pub fn replace_all(
        &self,
        pages: HashMap<String, String>,
        shares: HashMap<String, String>,
        burns: HashMap<String, String>,
    ) {
        let mut inner = mutex_lock(&self.inner, SOURCE, "replace_all");
        inner.pages = pages;
        inner.shares = shares;
        inner.burns = burns;
    }

    /// Atomically replace the settings snapshot; never partially visible.
    pub fn replace_settings(&self, settings: HashMap<String, String>) {
        mutex_lock(&self.inner, SOURCE, "replace_settings").settings = settings;
    }

    /// Whether maintenance ("construction") mode is active: true iff the
    /// setting's value equals `"true"` case-insensitively.
    pub fn construction(&self) -> bool {
        mutex_lock(&self.inner, SOURCE, "construction")
            .settings
            .get(SETTING_CONSTRUCTION)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn set_main_text(&self, text: impl Into<String>) {
        mutex_lock(&self.inner, SOURCE, "set_main_text").main_text = text.into();
    }

    pub fn main_text(&self) -> String {
        mutex_lock(&self.inner, SOURCE, "main_text").main_text.clone()
    }
}

impl Default for PadCache {
    fn default() -> Self {
        Self::new()
    }
}
