//! Startup defaults: create the data files the service expects when they do
//! not exist yet, so a fresh deployment serves something sensible.

use tracing::info;

use crate::config::DataSettings;

use super::db::SqliteRepositories;
use super::error::InfraError;

const SOURCE: &str = "infra::bootstrap";

const SEED_PAGE_ID: &str = "welcome";
const SEED_PAGE_CONTENT: &str = "hello";
const DEFAULT_MAIN_TEXT: &str = "This is the main page.\n";
const DEFAULT_SETTINGS: &str = "# service settings\nconstruction = false\n";

/// A transparent 1x1 PNG used as the background placeholder.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Ensure the seed row, main text, settings file, and meta directory exist.
pub async fn ensure_defaults(
    data: &DataSettings,
    repos: &SqliteRepositories,
) -> Result<(), InfraError> {
    repos
        .seed_page(SEED_PAGE_ID, SEED_PAGE_CONTENT)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    if !tokio::fs::try_exists(&data.main_text_file).await? {
        tokio::fs::write(&data.main_text_file, DEFAULT_MAIN_TEXT).await?;
        info!(target = SOURCE, path = %data.main_text_file.display(), "Created default main text");
    }

    if !tokio::fs::try_exists(&data.settings_file).await? {
        tokio::fs::write(&data.settings_file, DEFAULT_SETTINGS).await?;
        info!(target = SOURCE, path = %data.settings_file.display(), "Created default settings");
    }

    tokio::fs::create_dir_all(&data.meta_dir).await?;
    let bg_path = data.meta_dir.join("bg.png");
    if !tokio::fs::try_exists(&bg_path).await? {
        tokio::fs::write(&bg_path, PLACEHOLDER_PNG).await?;
        info!(target = SOURCE, path = %bg_path.display(), "Created placeholder background");
    }

    Ok(())
}
