use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{
    application::{error::AppError, pad::PadService},
    domain::ident,
    presentation::views::{
        PadTemplate, PadView, render_not_found_response, render_template_response,
    },
};

use super::{api_bad_request, api_error, middleware::log_responses};

const SOURCE: &str = "infra::http::public";

#[derive(Clone)]
pub struct HttpState {
    pub pad: Arc<PadService>,
    pub meta_dir: PathBuf,
    pub favicon_file: PathBuf,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(main_page))
        .route("/{id}", get(pad_page))
        .route("/update/{id}", post(update_pad))
        .route("/create_share/{id}", post(create_share))
        .route("/create_burn/{id}", post(create_burn))
        .route("/share/{token}", get(share_page))
        .route("/burn/{token}", get(burn_page))
        .route("/meta/{*path}", get(serve_meta))
        .route("/favicon.ico", get(favicon))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
}

/// The distinguished main page: always read-only, sourced from the main
/// text file via the cache.
async fn main_page(State(state): State<HttpState>) -> Response {
    let view = PadView::read_only(state.pad.main_text());
    render_template_response(PadTemplate { view }, StatusCode::OK)
}

async fn pad_page(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    if ident::is_reserved_id(&id) {
        return main_page(State(state)).await;
    }

    match state.pad.read_page(&id) {
        Ok(content) => {
            // Maintenance mode keeps pads visible but not editable.
            let view = if state.pad.construction() {
                PadView::read_only(content)
            } else {
                PadView::editable(id, content)
            };
            render_template_response(PadTemplate { view }, StatusCode::OK)
        }
        Err(AppError::Domain(_)) => render_not_found_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    content: String,
}

async fn update_pad(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return api_bad_request(rejection.body_text()),
    };

    match state.pad.update_page(&id, &body.content) {
        Ok(()) => Json(json!({ "status": "success" })).into_response(),
        Err(err) => api_error(err),
    }
}

async fn create_share(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    match state.pad.create_share(&id).await {
        Ok(token) => Json(json!({
            "status": "success",
            "share_url": format!("/share/{token}"),
        }))
        .into_response(),
        Err(err) => api_error(err),
    }
}

async fn create_burn(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    match state.pad.create_burn(&id).await {
        Ok(token) => Json(json!({
            "status": "success",
            "burn_url": format!("/burn/{token}"),
        }))
        .into_response(),
        Err(err) => api_error(err),
    }
}

async fn share_page(State(state): State<HttpState>, Path(token): Path<String>) -> Response {
    match state.pad.read_share(&token) {
        Ok(content) => {
            let view = PadView::read_only(content);
            render_template_response(PadTemplate { view }, StatusCode::OK)
        }
        Err(AppError::NotFound) => render_not_found_response(),
        Err(err) => err.into_response(),
    }
}

async fn burn_page(State(state): State<HttpState>, Path(token): Path<String>) -> Response {
    match state.pad.consume_burn(&token) {
        Ok(content) => {
            let view = PadView::read_only(content);
            render_template_response(PadTemplate { view }, StatusCode::OK)
        }
        Err(AppError::NotFound) => render_not_found_response(),
        Err(err) => err.into_response(),
    }
}

/// Serve a static asset out of the meta directory.
async fn serve_meta(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    // Reject anything that could climb out of the asset directory.
    if path.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return render_not_found_response();
    }

    let full_path = state.meta_dir.join(&path);
    match tokio::fs::read(&full_path).await {
        Ok(bytes) => build_asset_response(&path, Bytes::from(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => render_not_found_response(),
        Err(err) => {
            error!(
                target = SOURCE,
                path = %full_path.display(),
                error = %err,
                "Failed to read static asset"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn favicon(State(state): State<HttpState>) -> Response {
    match tokio::fs::read(&state.favicon_file).await {
        Ok(bytes) => build_asset_response("favicon.ico", Bytes::from(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(
                target = SOURCE,
                path = %state.favicon_file.display(),
                error = %err,
                "Failed to read favicon"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn fallback() -> Response {
    render_not_found_response()
}

fn build_asset_response(path: &str, bytes: Bytes) -> Response {
    let mut response = Response::new(Body::from(bytes.clone()));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&bytes.len().to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }

    response
}
