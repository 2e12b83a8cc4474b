//! Repository traits at the application seam.
//!
//! The durable store is only touched through these traits; the flush loop,
//! the refresh loop, and the synchronous share/burn creation paths all go
//! through the same interface, which keeps the service testable against an
//! in-memory implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{BurnNoteRecord, PageRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness constraint fired, e.g. a share token already taken.
    #[error("duplicate row: {constraint}")]
    Duplicate { constraint: String },
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RepoError {
    pub fn duplicate(constraint: impl Into<String>) -> Self {
        Self::Duplicate {
            constraint: constraint.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

/// Durable store access for the pages table.
#[async_trait]
pub trait PagesRepo: Send + Sync {
    async fn fetch_page(&self, id: &str) -> Result<Option<PageRecord>, RepoError>;

    /// Update-by-id; insert a fresh row when no row was affected.
    async fn upsert_content(&self, id: &str, content: &str) -> Result<(), RepoError>;

    /// Attach a share token to an existing page row. The unique constraint
    /// on `share_id` is the backstop for allocator races.
    async fn assign_share_id(&self, id: &str, share_id: &str) -> Result<(), RepoError>;

    async fn share_id_exists(&self, share_id: &str) -> Result<bool, RepoError>;

    /// Full scan used by the refresh loop to rebuild the cache wholesale.
    async fn scan_pages(&self) -> Result<Vec<PageRecord>, RepoError>;
}

/// Durable store access for the burn-note table.
#[async_trait]
pub trait BurnRepo: Send + Sync {
    async fn insert_burn(&self, burn_id: &str, content: &str) -> Result<(), RepoError>;

    async fn delete_burn(&self, burn_id: &str) -> Result<(), RepoError>;

    async fn burn_id_exists(&self, burn_id: &str) -> Result<bool, RepoError>;

    async fn scan_burns(&self) -> Result<Vec<BurnNoteRecord>, RepoError>;
}
