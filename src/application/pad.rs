//! The pad service: every client-visible operation on pages and their
//! share/burn derivatives.
//!
//! Reads come from the cache alone. Page writes update the cache and enqueue
//! a write intent; only share/burn creation writes through to the durable
//! store synchronously, because the caller needs a confirmed, immediately
//! queryable link.

use std::sync::Arc;

use tracing::{error, info};

use crate::cache::{PadCache, WriteQueue};
use crate::domain::ident;

use super::error::AppError;
use super::repos::{BurnRepo, PagesRepo};
use super::tokens::allocate_token;

const SOURCE: &str = "application::pad";

#[derive(Clone)]
pub struct PadService {
    cache: Arc<PadCache>,
    queue: Arc<WriteQueue>,
    pages: Arc<dyn PagesRepo>,
    burns: Arc<dyn BurnRepo>,
}

impl PadService {
    pub fn new(
        cache: Arc<PadCache>,
        queue: Arc<WriteQueue>,
        pages: Arc<dyn PagesRepo>,
        burns: Arc<dyn BurnRepo>,
    ) -> Self {
        Self {
            cache,
            queue,
            pages,
            burns,
        }
    }

    /// Read a page by id. A never-written id is a valid blank page.
    pub fn read_page(&self, id: &str) -> Result<String, AppError> {
        ident::validate_page_id(id)?;
        Ok(self.cache.get(id))
    }

    /// Content of the distinguished read-only main page.
    pub fn main_text(&self) -> String {
        self.cache.main_text()
    }

    /// Whether maintenance mode currently blocks writes.
    pub fn construction(&self) -> bool {
        self.cache.construction()
    }

    /// Overwrite a page: cache first, then enqueue for the flush loop.
    ///
    /// The caller observes the new content on the next read even though the
    /// durable store converges up to one flush interval later. Validation
    /// failures and maintenance mode leave the cache untouched.
    pub fn update_page(&self, id: &str, content: &str) -> Result<(), AppError> {
        ident::validate_writable_page_id(id)?;
        ident::validate_content(content)?;
        if self.cache.construction() {
            return Err(AppError::Maintenance);
        }

        self.cache.put(id, content);
        self.queue.enqueue(id, content);
        Ok(())
    }

    /// Create (or return) the stable share token for a page.
    ///
    /// Idempotent per page: an already-assigned token is returned as-is,
    /// never rotated. The page row is written through so the link is
    /// queryable before the next flush cycle.
    pub async fn create_share(&self, id: &str) -> Result<String, AppError> {
        ident::validate_writable_page_id(id)?;
        if self.cache.construction() {
            return Err(AppError::Maintenance);
        }

        let existing = self.pages.fetch_page(id).await?;
        if let Some(token) = existing.as_ref().and_then(|page| page.share_id.clone()) {
            // Keep the share map fresh with the latest cached content.
            self.cache.set_share_mapping(&token, self.cache.get(id));
            return Ok(token);
        }

        let content = self.cache.get(id);
        if content.is_empty() && existing.is_none() {
            return Err(AppError::NotFound);
        }

        let pages = self.pages.clone();
        let token = allocate_token(move |candidate| {
            let pages = pages.clone();
            async move { pages.share_id_exists(&candidate).await }
        })
        .await?;

        // Write through: the row must exist before it can carry the token.
        self.pages.upsert_content(id, &content).await?;
        self.pages.assign_share_id(id, &token).await?;
        self.cache.set_share_mapping(&token, content);

        info!(target = SOURCE, page_id = id, "Share link created");
        Ok(token)
    }

    /// Mint a fresh burn note for a page's current content.
    ///
    /// Never idempotent: every call creates an independent single-use note.
    pub async fn create_burn(&self, id: &str) -> Result<String, AppError> {
        ident::validate_writable_page_id(id)?;
        if self.cache.construction() {
            return Err(AppError::Maintenance);
        }

        let content = self.cache.get(id);
        if content.is_empty() && self.pages.fetch_page(id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let burns = self.burns.clone();
        let token = allocate_token(move |candidate| {
            let burns = burns.clone();
            async move { burns.burn_id_exists(&candidate).await }
        })
        .await?;

        self.burns.insert_burn(&token, &content).await?;
        self.cache.set_burn_mapping(&token, content);

        info!(target = SOURCE, page_id = id, "Burn link created");
        Ok(token)
    }

    /// Read a page through its share token.
    pub fn read_share(&self, share_id: &str) -> Result<String, AppError> {
        ident::validate_token(share_id)?;
        self.cache.get_by_share(share_id).ok_or(AppError::NotFound)
    }

    /// Consume a burn note: return its content and retire it.
    ///
    /// Retirement is fire-and-forget relative to the response; the reader
    /// never waits on the deletion. A failed deletion is logged, after which
    /// the note stays readable until restart (accepted double-read window).
    pub fn consume_burn(&self, burn_id: &str) -> Result<String, AppError> {
        ident::validate_token(burn_id)?;
        let content = self.cache.get_by_burn(burn_id).ok_or(AppError::NotFound)?;

        let service = self.clone();
        let token = burn_id.to_string();
        tokio::spawn(async move {
            service.retire_burn(&token).await;
        });

        Ok(content)
    }

    /// Delete a consumed burn note from the durable store and the cache.
    ///
    /// Must complete before the next refresh rebuilds the burn map, or the
    /// note reappears as live.
    pub async fn retire_burn(&self, burn_id: &str) {
        if let Err(err) = self.burns.delete_burn(burn_id).await {
            error!(
                target = SOURCE,
                burn_id,
                error = %err,
                "Failed to delete consumed burn note; it remains readable"
            );
            return;
        }
        self.cache.remove_burn_mapping(burn_id);
        info!(target = SOURCE, burn_id, "Burn note consumed");
    }
}
