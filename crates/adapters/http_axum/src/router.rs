//! Axum router assembly.

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the JSON API under `/api`, a health probe at `/health`, and an
/// endpoint index at `/`. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level and a permissive [`CorsLayer`]
/// so browser-based clients can talk to the API directly.
pub fn build<DR, RR, AUR, UR, TR, LR, EP, H>(
    state: AppState<DR, RR, AUR, UR, TR, LR, EP, H>,
) -> Router
where
    DR: DeviceRepository + Send + Sync + 'static,
    RR: RoomRepository + Send + Sync + 'static,
    AUR: AutomationRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    TR: RefreshTokenRepository + Send + Sync + 'static,
    LR: DeviceLogRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    H: HubClient + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Smart Home API",
        "endpoints": {
            "devices": "/api/devices",
            "rooms": "/api/rooms",
            "automations": "/api/automations",
            "auth": "/api/auth",
            "analytics": "/api/analytics",
            "hub": "/api/hub/states",
        }
    }))
}
