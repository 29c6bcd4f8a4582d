use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tera::Context;
use tracing::debug;

use crate::version::VERSION;
use crate::web::{AppError, AppState};

const PAGE_NOT_FOUND: &str = "page not found";

pub async fn index_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let location = format!("/{}", app_state.config.default_page);
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

pub async fn render_page_handler(
    State(app_state): State<Arc<AppState>>,
    Path(template_name): Path<String>,
) -> Result<Response, AppError> {
    let template = format!("{template_name}.html");
    if !app_state.pages.get_template_names().any(|name| name == template) {
        debug!(page = %template_name, "No template for requested page.");
        return Ok((StatusCode::NOT_FOUND, PAGE_NOT_FOUND).into_response());
    }

    let mut context = Context::new();
    context.insert("page", &template_name);
    context.insert("version", VERSION);

    let html = app_state.pages.render(&template, &context)?;
    Ok(Html(html).into_response())
}
