use worldscope_backend::broadcast::{BroadcastSink, WsHub};
use worldscope_backend::config::{self, OpenSkyCredentials};
use worldscope_backend::server::{self, AppState};
use worldscope_backend::service::{self, ServiceContext};

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let dotenv = dotenvy::dotenv();

    let config = config::read_config()?;

    let _logging_guard = worldscope_backend::logging::init_logging(
        &config.log_dir,
        worldscope_common::SERVICE_NAME,
        &config.log_level,
    )?;

    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    tracing::info!("WorldScope backend starting...");

    let hub = Arc::new(WsHub::default());
    let sink: Arc<dyn BroadcastSink> = hub.clone();
    let ctx = ServiceContext::new(sink, OpenSkyCredentials::from_env());
    let services = service::start_services(&ctx)?;

    let shutdown = CancellationToken::new();
    let app = server::router(AppState::new(hub, shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    tracing::info!("WorldScope backend listening on http://{}", listener.local_addr()?);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let name = shutdown_signal().await;
            tracing::info!("Received {}, shutting down...", name);
            service::shutdown_services(&services).await;
            signal.cancel();
        })
        .await?;

    tracing::info!("WorldScope backend stopped");
    Ok(())
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
