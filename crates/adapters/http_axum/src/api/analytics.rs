//! JSON REST handlers for usage analytics.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_app::services::analytics_service::{DeviceUsage, MostFrequent, RecentAction, UserUsage};
use techhome_domain::device_log::ActionCount;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/analytics/usage-per-user` — action counts per user.
pub async fn usage_per_user<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Json<Vec<UserUsage>>, ApiError>
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
    let usage = state.analytics_service.usage_per_user().await?;
    Ok(Json(usage))
}

/// `GET /api/analytics/usage-per-device` — action counts per device.
pub async fn usage_per_device<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Json<Vec<DeviceUsage>>, ApiError>
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
    let usage = state.analytics_service.usage_per_device().await?;
    Ok(Json(usage))
}

/// `GET /api/analytics/device-actions/{device}` — most frequent action.
pub async fn device_action<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(device): Path<String>,
) -> Result<Json<MostFrequent>, ApiError>
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
    let top = state
        .analytics_service
        .most_frequent_device_action(&device)
        .await?;
    Ok(Json(top))
}

/// `GET /api/analytics/device-actions/{device}/top` — top actions.
pub async fn device_top_actions<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(device): Path<String>,
) -> Result<Json<Vec<ActionCount>>, ApiError>
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
    let top = state.analytics_service.top_device_actions(&device).await?;
    Ok(Json(top))
}

/// `GET /api/analytics/user-actions/{user}` — most frequent action.
pub async fn user_action<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(user): Path<String>,
) -> Result<Json<MostFrequent>, ApiError>
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
    let top = state.analytics_service.most_frequent_user_action(&user).await?;
    Ok(Json(top))
}

/// `GET /api/analytics/user-actions/{user}/top` — top actions.
pub async fn user_top_actions<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(user): Path<String>,
) -> Result<Json<Vec<ActionCount>>, ApiError>
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
    let top = state.analytics_service.top_user_actions(&user).await?;
    Ok(Json(top))
}

/// `GET /api/analytics/recent-actions` — latest log entries.
pub async fn recent_actions<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Json<Vec<RecentAction>>, ApiError>
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
    let feed = state.analytics_service.recent_actions().await?;
    Ok(Json(feed))
}

/// `GET /api/analytics/export` — the full log as CSV.
pub async fn export<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Response, ApiError>
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
    let csv = state.analytics_service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"device_logs.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
