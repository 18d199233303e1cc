use asan_gateway::cli::Cli;
use asan_gateway::{App, AppState};
use asan_storage::Database;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv();

    let config = Cli::parse();
    asan_telemetry::init(config.log_format.into())?;
    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "failed to load .env file");
        }
    }

    info!(
        host = %config.host,
        port = config.port,
        data_file = %config.data_file.display(),
        remote_configured = config.mongo_uri.is_some(),
        log_format = %config.log_format,
        "starting asan gateway"
    );

    let db = Database::connect(config.connect_options()).await?;
    let mode = db.mode();
    let router = App::router(AppState::new(db), config.static_dir.clone());

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(listen_addr = %listener.local_addr()?, storage = %mode, "asan gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("asan gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
