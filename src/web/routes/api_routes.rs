use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::presence::{PresenceByUser, UserId, UserPresence, UserProfile, stats};
use crate::web::{AppError, AppState};

const PRESENCE_HEADER: [&str; 2] = ["Weekday", "Presence (s)"];

// --- Response Structs ---

#[derive(Serialize, Debug)]
pub struct UserLabel {
    user_id: UserId,
    name: String,
}

// Unknown users are reported as an empty result rather than an error.
fn for_user<T>(
    data: &PresenceByUser,
    user_id: UserId,
    view: impl FnOnce(&UserPresence) -> Vec<T>,
) -> Vec<T> {
    match data.get(&user_id) {
        Some(presence) => view(presence),
        None => {
            debug!(user_id, "User not found!");
            Vec::new()
        }
    }
}

// --- Route Handlers ---

async fn users_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserLabel>>, AppError> {
    let data = app_state.presence_data().await?;
    let users = data
        .keys()
        .map(|&user_id| UserLabel {
            user_id,
            name: format!("User {user_id}"),
        })
        .collect();
    Ok(Json(users))
}

async fn users_directory_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<(UserId, UserProfile)>>, AppError> {
    let directory = app_state.directory.clone();
    let profiles = tokio::task::spawn_blocking(move || directory.load_sorted()).await??;
    Ok(Json(profiles.into_iter().map(|p| (p.id, p)).collect()))
}

async fn mean_time_weekday_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<(&'static str, f64)>>, AppError> {
    let data = app_state.presence_data().await?;
    Ok(Json(for_user(&data, user_id, stats::mean_presence_by_weekday)))
}

async fn presence_weekday_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Value>>, AppError> {
    let data = app_state.presence_data().await?;
    let rows = for_user(&data, user_id, |presence| {
        std::iter::once(json!(PRESENCE_HEADER))
            .chain(
                stats::total_presence_by_weekday(presence)
                    .into_iter()
                    .map(|(day, total)| json!([day, total])),
            )
            .collect()
    });
    Ok(Json(rows))
}

async fn presence_start_end_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<(&'static str, f64, f64)>>, AppError> {
    let data = app_state.presence_data().await?;
    Ok(Json(for_user(&data, user_id, stats::mean_start_end_by_weekday)))
}

async fn invalidate_cache_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    // Waits for an in-flight parse to finish, like any other cache access.
    let store = app_state.presence.clone();
    tokio::task::spawn_blocking(move || store.invalidate()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Routers ---

pub fn v1_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users_handler))
        .route("/mean_time_weekday/{user_id}", get(mean_time_weekday_handler))
        .route("/presence_weekday/{user_id}", get(presence_weekday_handler))
        .route("/presence_start_end/{user_id}", get(presence_start_end_handler))
        .route("/cache/invalidate", post(invalidate_cache_handler))
}

pub fn v2_router() -> Router<Arc<AppState>> {
    Router::new().route("/users", get(users_directory_handler))
}
