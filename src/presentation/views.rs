use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

/// A pad rendered into the editor page.
#[derive(Clone)]
pub struct PadView {
    /// The pad id, absent for the main page and share/burn views.
    pub identifier: Option<String>,
    pub content: String,
    pub read_only: bool,
}

impl PadView {
    pub fn editable(id: impl Into<String>, content: String) -> Self {
        Self {
            identifier: Some(id.into()),
            content,
            read_only: false,
        }
    }

    pub fn read_only(content: String) -> Self {
        Self {
            identifier: None,
            content,
            read_only: true,
        }
    }
}

#[derive(Template)]
#[template(path = "pad.html")]
pub struct PadTemplate {
    pub view: PadView,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!(
                target = "presentation::views",
                error = %err,
                "Template rendering failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn render_not_found_response() -> Response {
    render_template_response(NotFoundTemplate, StatusCode::NOT_FOUND)
}
