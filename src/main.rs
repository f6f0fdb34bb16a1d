use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;

use garment_inventory_api::{build_app, config, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(&app_config.log_level, app_config.log_json);

    info!(environment = %app_config.environment, "Starting garment inventory API");

    let pool = db::establish_connection_from_app_config(&app_config)
        .await
        .context("failed to connect to database")?;

    if app_config.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let addr: SocketAddr = format!("{}:{}", app_config.host, app_config.port)
        .parse()
        .context("invalid bind address")?;

    let state = AppState::new(pool, app_config);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
