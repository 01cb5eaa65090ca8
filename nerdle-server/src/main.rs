use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use nerdle_core::{MemoryStore, NerdleStore};
use nerdle_persistence::{SqlStore, connection::connect_and_migrate};
use nerdle_server::{
    config::{Config, StoreBackend},
    create_routes,
    websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    info!("Starting Wordle Nerdles server...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = open_store(&config).await;
    let connection_manager = Arc::new(ConnectionManager::new());
    let routes = create_routes(connection_manager.clone(), store, config.session.clone());

    // Reap sessions whose browser went away without closing the socket
    let cleanup_connection_manager = connection_manager.clone();
    let connection_timeout = Duration::from_secs(config.connection_timeout_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let removed = cleanup_connection_manager
                .cleanup_inactive_connections(connection_timeout)
                .await;
            if removed > 0 {
                info!("Reaped {} inactive connections", removed);
            }
        }
    });

    let host = match config.host.parse::<IpAddr>() {
        Ok(host) => host,
        Err(e) => {
            error!("Invalid HOST {:?}: {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((host, config.port), shutdown_signal());

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}

async fn open_store(config: &Config) -> Arc<dyn NerdleStore> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory store with the demo league");
            let store = MemoryStore::with_demo_data();
            store.set_current_week(config.current_week.clone()).await;
            Arc::new(store)
        }
        StoreBackend::Sqlite => {
            let db = match connect_and_migrate(&config.database_url).await {
                Ok(db) => db,
                Err(e) => {
                    error!("Failed to connect to database and run migrations: {}", e);
                    std::process::exit(1);
                }
            };

            let store = SqlStore::new(db, config.current_week.clone());
            if config.seed_demo_data {
                match store.seed_demo_data().await {
                    Ok(true) => info!("Seeded demo league data"),
                    Ok(false) => info!("Database already populated, demo seed skipped"),
                    Err(e) => warn!("Failed to seed demo data: {}", e),
                }
            }
            Arc::new(store)
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal as unix_signal};

        match (
            unix_signal(SignalKind::interrupt()),
            unix_signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            _ => warn!("Could not install unix signal handlers, falling back to Ctrl+C"),
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}
