//! Room-service ordering API server.
//!
//! Serves the guest menu, order placement and the staff kitchen board on
//! port 3001.
//!
//! # Storage
//!
//! - `ROOMSERVICE_STORAGE=postgres` (default): `PostgreSQL`, schema `roomservice`.
//!   Migrations are NOT run on startup; use `rs-cli migrate`.
//! - `ROOMSERVICE_STORAGE=memory`: in-process store seeded with the demo menu.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use roomservice_server::config::{ServerConfig, StorageConfig};
use roomservice_server::db::{self, CatalogStore, MemoryStore, OrderLedger, PgStore};
use roomservice_server::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Open the configured storage backend.
async fn open_storage(config: &ServerConfig) -> (Arc<dyn CatalogStore>, Arc<dyn OrderLedger>) {
    match &config.storage {
        StorageConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");

            let store = Arc::new(PgStore::new(pool));
            let catalog: Arc<dyn CatalogStore> = store.clone();
            let ledger: Arc<dyn OrderLedger> = store;
            (catalog, ledger)
        }
        StorageConfig::Memory => {
            let store = Arc::new(MemoryStore::new());
            let restaurant = db::seed::seed_demo_catalog(store.as_ref())
                .await
                .expect("Failed to seed in-memory catalog");
            tracing::info!(restaurant = %restaurant.name, "Using in-memory storage with demo menu");

            let catalog: Arc<dyn CatalogStore> = store.clone();
            let ledger: Arc<dyn OrderLedger> = store;
            (catalog, ledger)
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roomservice_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if config.payway.merchant_id.is_none() || config.payway.api_key.is_none() {
        tracing::warn!("ABA_MERCHANT_ID/ABA_API_KEY not set, KHQR checkouts will be simulated");
    }
    tracing::warn!("Payment webhook callbacks are not authenticated");

    let (catalog, ledger) = open_storage(&config).await;

    let state = AppState::new(config.clone(), catalog, ledger)
        .expect("Failed to initialize application state");

    let app = roomservice_server::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("roomservice listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
