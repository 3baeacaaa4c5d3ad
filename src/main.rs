use focus_log::{AppState, Config, JsonFileStore, MemoryStore, RecordStore, Settings, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const IN_MEMORY_PATH: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    info!(
        timezone = ?config.settings.timezone,
        goals = config.settings.goals.len(),
        "configuration loaded"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    if config.data_path.as_os_str() == IN_MEMORY_PATH {
        warn!("records are kept in memory and will not survive a restart");
        return serve(MemoryStore::new(), config.settings, addr).await;
    }

    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let store = JsonFileStore::open(config.data_path).await;
    info!("persisting records to {}", store.path().display());
    serve(store, config.settings, addr).await
}

async fn serve<S: RecordStore>(
    store: S,
    settings: Settings,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(store, settings));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
