use clap::Parser;
use presence_analyzer::presence::DirectorySource;
use presence_analyzer::server::config::ServerConfig;
use presence_analyzer::server::directory_refresh::DirectoryRefreshService;
use presence_analyzer::version::VERSION;
use presence_analyzer::web::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Download the user directory once and exit
    #[arg(long)]
    refresh_directory: bool,

    /// Print the version and exit
    #[arg(short = 'V', long)]
    version: bool,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "presence-analyzer.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal(shutdown_tx: watch::Sender<()>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
        return;
    }
    info!("Shutdown signal received.");
    let _ = shutdown_tx.send(());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    if args.version {
        println!("presence-analyzer version: {VERSION}");
        return Ok(());
    }

    let config = Arc::new(ServerConfig::load(args.config.as_deref())?);
    init_logging(&config.log_dir);
    info!(version = VERSION, "Starting presence analyzer.");

    let directory = DirectorySource::new(&config.data_xml, &config.users_xml_url, config.collation);

    // --- One-shot directory download ---
    if args.refresh_directory {
        let users = directory.refresh(&reqwest::Client::new()).await?;
        info!(users, "User directory downloaded.");
        return Ok(());
    }

    let app_state = match AppState::from_config(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!(error = %e, "Failed to initialize application state.");
            return Err(e.into());
        }
    };
    info!(
        data_csv = %config.data_csv.display(),
        data_xml = %config.data_xml.display(),
        cache_ttl_secs = config.cache_ttl_secs,
        collation = %config.collation,
        "Data sources configured."
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(());

    // --- Directory Refresh Task ---
    let refresh_task = config.directory_refresh_interval().map(|period| {
        let service = DirectoryRefreshService::new(directory.clone(), period, shutdown_rx.clone());
        tokio::spawn(service.start_periodic_refresh())
    });

    // --- Axum HTTP Server Setup ---
    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    let app = web::create_axum_router(app_state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Some(task) = refresh_task {
        let _ = task.await;
    }

    info!("Server stopped.");
    Ok(())
}
