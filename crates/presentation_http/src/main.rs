//! resa-bridge HTTP server
//!
//! Main entry point for the calendar bridge.

use std::{sync::Arc, time::Duration};

use application::{CalendarPort, EventBridgeService};
use infrastructure::{AppConfig, CalDavCalendarAdapter, init_tracing};
use integration_caldav::{CalDavClient, HttpCalDavClient};
use presentation_http::{routes, server, set_expose_internal_errors, state::AppState};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration decides the log format, so load it before tracing
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(&config.server.log_filter, config.server.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    info!("resa-bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = %config.server.port,
        caldav = %config.caldav.server_url,
        "Configuration loaded"
    );

    set_expose_internal_errors(!config.environment.is_production());

    // Initialize CalDAV client
    let client = HttpCalDavClient::new(config.caldav.to_caldav_config())
        .map_err(|e| anyhow::anyhow!("Failed to initialize CalDAV client: {e}"))?;

    match client.validate_server().await {
        Ok(()) => info!(server_url = %config.caldav.server_url, "CalDAV server validated"),
        Err(e) => warn!(
            server_url = %config.caldav.server_url,
            error = %e,
            "CalDAV server validation failed, continuing"
        ),
    }

    let calendar_port: Arc<dyn CalendarPort> =
        Arc::new(CalDavCalendarAdapter::new(Arc::new(client)));

    for (name, collection) in config.calendars.iter() {
        info!(calendar = name, collection, "Calendar route");
    }

    // Initialize bridge service
    let bridge = EventBridgeService::with_settings(
        calendar_port,
        config.calendars.clone(),
        config.bridge.to_settings(),
    );
    let state = AppState::new(bridge);

    // Build router with middleware
    let app = routes::create_app(state, &config.server);

    // Start server
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;

    info!(static_dir = %config.server.static_dir, "Server listening on http://{}", addr);

    server::serve(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
