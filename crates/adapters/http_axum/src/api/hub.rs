//! JSON REST handlers for the remote-hub bridge.

use axum::Json;
use axum::extract::State;

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;

/// `GET /api/hub/states` — proxy the hub's entity-state listing.
///
/// Requires authentication: the response exposes the whole home.
pub async fn states<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    _user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError>
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
    let states = state.hub.states().await?;
    Ok(Json(states))
}
