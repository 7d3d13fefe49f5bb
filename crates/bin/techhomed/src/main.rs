//! # techhomed — techhome daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file + env vars)
//! - Initialize tracing and the `SQLite` connection pool (with migrations)
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Start the automation scheduler and its resync listener
//! - Build the axum router, bind a TCP port, and serve until shutdown
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use techhome_adapter_http_axum::state::AppState;
use techhome_adapter_storage_sqlite_sqlx::{
    SqliteAutomationRepository, SqliteDeviceLogRepository, SqliteDeviceRepository,
    SqliteRefreshTokenRepository, SqliteRoomRepository, SqliteUserRepository,
};
use techhome_app::event_bus::InProcessEventBus;
use techhome_app::executor::Executor;
use techhome_app::jwt::JwtService;
use techhome_app::scheduler::{Scheduler, spawn_resync_listener};
use techhome_app::services::analytics_service::AnalyticsService;
use techhome_app::services::auth_service::AuthService;
use techhome_app::services::automation_service::AutomationService;
use techhome_app::services::device_service::DeviceService;
use techhome_app::services::room_service::RoomService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = techhome_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Event bus, shared between services, the executor, and the scheduler
    // listener.
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Token service
    let jwt = Arc::new(JwtService::new(
        &config.auth.jwt_secret,
        "techhome",
        chrono::Duration::minutes(config.auth.access_token_minutes),
        chrono::Duration::days(config.auth.refresh_token_days),
    ));

    // Remote hub client
    let hub = Arc::new(
        techhome_adapter_home_assistant::Config {
            base_url: config.home_assistant.url.clone(),
            token: config.home_assistant.token.clone(),
            timeout: Duration::from_secs(config.home_assistant.timeout_secs),
        }
        .build()?,
    );

    // Automation core: executor + scheduler, fed by the event bus.
    let executor = Arc::new(Executor::new(
        SqliteDeviceRepository::new(pool.clone()),
        Arc::clone(&hub),
        Arc::clone(&event_bus),
    ));
    let scheduler = Arc::new(Scheduler::new(
        SqliteAutomationRepository::new(pool.clone()),
        executor,
    ));
    if let Err(err) = scheduler.start().await {
        // Not fatal: the next automation change retries the rebuild.
        tracing::warn!(error = %err, "initial schedule build failed");
    }
    let _ = spawn_resync_listener(Arc::clone(&scheduler), event_bus.subscribe());

    // Services
    let device_service = DeviceService::new(
        SqliteDeviceRepository::new(pool.clone()),
        SqliteDeviceLogRepository::new(pool.clone()),
        Arc::clone(&event_bus),
    );
    let room_service = RoomService::new(SqliteRoomRepository::new(pool.clone()));
    let automation_service = AutomationService::new(
        SqliteAutomationRepository::new(pool.clone()),
        Arc::clone(&event_bus),
    );
    let auth_service = AuthService::new(
        SqliteUserRepository::new(pool.clone()),
        SqliteRefreshTokenRepository::new(pool.clone()),
        Arc::clone(&jwt),
    );
    let analytics_service = AnalyticsService::new(
        SqliteDeviceLogRepository::new(pool.clone()),
        SqliteDeviceRepository::new(pool),
    );

    // HTTP
    let state = AppState::new(
        device_service,
        room_service,
        automation_service,
        auth_service,
        analytics_service,
        hub,
        jwt,
    );
    let app = techhome_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "techhomed listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
