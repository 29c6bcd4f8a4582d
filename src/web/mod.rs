use axum::{Router, http::Method, routing::get};
use rust_embed::RustEmbed;
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::presence::{DirectorySource, PresenceByUser, PresenceStore};
use crate::server::config::ServerConfig;

pub mod error;
pub mod routes;

pub use error::AppError;

use routes::{api_routes, page_routes};

#[derive(RustEmbed)]
#[folder = "templates/"]
pub struct ReportTemplates;

/// Builds the report page templates embedded in the binary.
pub fn load_report_pages() -> Result<Tera, tera::Error> {
    let sources: Vec<(String, String)> = ReportTemplates::iter()
        .filter_map(|name| {
            ReportTemplates::get(&name).map(|file| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(&file.data).into_owned(),
                )
            })
        })
        .collect();

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)?;
    Ok(tera)
}

pub struct AppState {
    pub presence: Arc<PresenceStore>,
    pub directory: DirectorySource,
    pub pages: Tera,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn from_config(config: Arc<ServerConfig>) -> Result<Self, AppError> {
        let presence = Arc::new(PresenceStore::new(&config.data_csv, config.cache_ttl()));
        let directory = DirectorySource::new(&config.data_xml, &config.users_xml_url, config.collation);
        let pages = load_report_pages()?;

        Ok(Self {
            presence,
            directory,
            pages,
            config,
        })
    }

    /// Attendance data through the cache. Parsing blocks, so it runs off the async workers.
    pub async fn presence_data(&self) -> Result<Arc<PresenceByUser>, AppError> {
        let store = self.presence.clone();
        Ok(tokio::task::spawn_blocking(move || store.get()).await??)
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(page_routes::index_handler))
        .route("/api/health", get(health_check_handler))
        .nest("/api/v1", api_routes::v1_router())
        .nest("/api/v2", api_routes::v2_router())
        .route("/{template_name}", get(page_routes::render_page_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
