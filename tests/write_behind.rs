//! End-to-end write-behind behavior against a real SQLite file.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use textpad::{
    application::{
        flush::FlushLoop,
        pad::PadService,
        refresh::RefreshLoop,
        repos::{BurnRepo, PagesRepo},
    },
    cache::{PadCache, WriteQueue},
    infra::db::SqliteRepositories,
};

struct Harness {
    _dir: TempDir,
    repos: Arc<SqliteRepositories>,
    queue: Arc<WriteQueue>,
    pad: Arc<PadService>,
    flush: FlushLoop,
    refresh: RefreshLoop,
}

async fn harness() -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("content.db");
    let pool = SqliteRepositories::connect(&db_path, 2).await.expect("connect");
    SqliteRepositories::init_schema(&pool).await.expect("schema");
    let repos = Arc::new(SqliteRepositories::new(pool));

    let cache = Arc::new(PadCache::new());
    let queue = Arc::new(WriteQueue::new());
    let pages: Arc<dyn PagesRepo> = repos.clone();
    let burns: Arc<dyn BurnRepo> = repos.clone();

    let pad = Arc::new(PadService::new(
        cache.clone(),
        queue.clone(),
        pages.clone(),
        burns.clone(),
    ));
    let flush = FlushLoop::new(queue.clone(), pages.clone(), Duration::from_secs(10));
    let refresh = RefreshLoop::new(
        cache.clone(),
        pages,
        burns,
        dir.path().join("settings.txt"),
        dir.path().join("main.txt"),
        Duration::from_secs(10),
    );

    Harness {
        _dir: dir,
        repos,
        queue,
        pad,
        flush,
        refresh,
    }
}

#[tokio::test]
async fn write_is_visible_before_flush_and_durable_after() {
    let h = harness().await;

    h.pad.update_page("abc123", "hello world").expect("update");

    // Visible immediately, not yet durable.
    assert_eq!(h.pad.read_page("abc123").expect("read"), "hello world");
    assert!(h.repos.fetch_page("abc123").await.expect("fetch").is_none());

    let applied = h.flush.flush_once().await;
    assert_eq!(applied, 1);
    assert!(h.queue.is_empty());

    let page = h
        .repos
        .fetch_page("abc123")
        .await
        .expect("fetch")
        .expect("row");
    assert_eq!(page.content, "hello world");
}

#[tokio::test]
async fn last_writer_wins_within_a_batch() {
    let h = harness().await;

    h.pad.update_page("abc123", "first").expect("update");
    h.pad.update_page("abc123", "second").expect("update");
    h.pad.update_page("abc123", "third").expect("update");

    let applied = h.flush.flush_once().await;
    assert_eq!(applied, 3);

    let page = h
        .repos
        .fetch_page("abc123")
        .await
        .expect("fetch")
        .expect("row");
    assert_eq!(page.content, "third");
}

#[tokio::test]
async fn share_token_survives_flush_and_refresh() {
    let h = harness().await;

    h.pad.update_page("abc123", "to share").expect("update");
    let token = h.pad.create_share("abc123").await.expect("share");

    // The share is queryable immediately, before any flush.
    assert_eq!(h.pad.read_share(&token).expect("read share"), "to share");

    h.flush.flush_once().await;
    h.refresh.refresh_once().await.expect("refresh");

    // Stable across a wholesale cache rebuild, and idempotent.
    assert_eq!(h.pad.read_share(&token).expect("read share"), "to share");
    let again = h.pad.create_share("abc123").await.expect("share again");
    assert_eq!(again, token);
}

#[tokio::test]
async fn burn_note_is_deleted_durably_after_consumption() {
    let h = harness().await;

    h.pad.update_page("abc123", "secret").expect("update");
    let token = h.pad.create_burn("abc123").await.expect("burn");

    assert!(h.repos.burn_id_exists(&token).await.expect("exists"));

    let content = h.pad.consume_burn(&token).expect("consume");
    assert_eq!(content, "secret");
    h.pad.retire_burn(&token).await;

    assert!(!h.repos.burn_id_exists(&token).await.expect("exists"));
    // After a refresh the note must not reappear.
    h.refresh.refresh_once().await.expect("refresh");
    assert!(h.pad.consume_burn(&token).is_err());
}

#[tokio::test]
async fn distinct_pads_flush_independently() {
    let h = harness().await;

    h.pad.update_page("first1", "one").expect("update");
    h.pad.update_page("second2", "two").expect("update");

    let applied = h.flush.flush_once().await;
    assert_eq!(applied, 2);

    assert_eq!(
        h.repos.fetch_page("first1").await.expect("fetch").expect("row").content,
        "one"
    );
    assert_eq!(
        h.repos.fetch_page("second2").await.expect("fetch").expect("row").content,
        "two"
    );

    // An empty follow-up cycle is a no-op.
    assert_eq!(h.flush.flush_once().await, 0);
}
