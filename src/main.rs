use std::{process, sync::Arc};

use textpad::{
    application::{
        error::AppError,
        flush::FlushLoop,
        pad::PadService,
        refresh::RefreshLoop,
        repos::{BurnRepo, PagesRepo},
    },
    cache::{PadCache, WriteQueue},
    config,
    infra::{
        bootstrap,
        db::SqliteRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    bootstrap::ensure_defaults(&settings.data, &repositories)
        .await
        .map_err(AppError::from)?;

    let cache = Arc::new(PadCache::new());
    let queue = Arc::new(WriteQueue::new());
    let pages: Arc<dyn PagesRepo> = repositories.clone();
    let burns: Arc<dyn BurnRepo> = repositories.clone();

    let pad = Arc::new(PadService::new(
        cache.clone(),
        queue.clone(),
        pages.clone(),
        burns.clone(),
    ));

    let refresh = RefreshLoop::new(
        cache.clone(),
        pages.clone(),
        burns.clone(),
        settings.data.settings_file.clone(),
        settings.data.main_text_file.clone(),
        settings.sync.refresh_interval,
    );

    // Synchronous first load so the cache is populated before any request.
    refresh.refresh_once().await?;

    let flush = FlushLoop::new(queue.clone(), pages.clone(), settings.sync.flush_interval);

    let flush_handle = tokio::spawn(flush.run());
    let refresh_handle = tokio::spawn(refresh.run());

    let state = HttpState {
        pad,
        meta_dir: settings.data.meta_dir.clone(),
        favicon_file: settings.data.favicon_file.clone(),
    };

    let result = serve_http(&settings, state).await;

    flush_handle.abort();
    let _ = flush_handle.await;
    refresh_handle.abort();
    let _ = refresh_handle.await;

    result
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<SqliteRepositories>, AppError> {
    let pool = SqliteRepositories::connect(
        &settings.database.path,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    SqliteRepositories::init_schema(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(SqliteRepositories::new(pool)))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "textpad::server",
        addr = %settings.server.listen_addr,
        "Listening"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown handler");
        return;
    }
    info!(target = "textpad::server", "Shutdown signal received");
}
