//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod analytics;
#[allow(clippy::missing_errors_doc)]
pub mod auth;
#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod hub;
#[allow(clippy::missing_errors_doc)]
pub mod rooms;

use axum::Router;
use axum::routing::{get, post};

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<DR, RR, AUR, UR, TR, LR, EP, H>() -> Router<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>
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
        // Devices
        .route(
            "/devices",
            get(devices::list::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .post(devices::create::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/devices/{id}",
            get(devices::get::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .put(devices::update::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .delete(devices::delete::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/devices/{id}/toggle",
            post(devices::toggle::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/devices/{id}/temperature",
            post(devices::set_temperature::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        // Rooms
        .route(
            "/rooms",
            get(rooms::list::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .post(rooms::create::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/rooms/{id}",
            get(rooms::get::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .put(rooms::update::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .delete(rooms::delete::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        // Automations
        .route(
            "/automations",
            get(automations::list::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .post(automations::create::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .put(automations::update::<DR, RR, AUR, UR, TR, LR, EP, H>)
                .delete(automations::delete::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/automations/{id}/toggle",
            post(automations::toggle::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        // Auth
        .route(
            "/auth/register",
            post(auth::register::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route("/auth/login", post(auth::login::<DR, RR, AUR, UR, TR, LR, EP, H>))
        .route(
            "/auth/refresh",
            post(auth::refresh::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/auth/logout",
            post(auth::logout::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/auth/logout-all",
            post(auth::logout_all::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route("/auth/me", get(auth::me::<DR, RR, AUR, UR, TR, LR, EP, H>))
        // Analytics
        .route(
            "/analytics/usage-per-user",
            get(analytics::usage_per_user::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/usage-per-device",
            get(analytics::usage_per_device::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/device-actions/{device}",
            get(analytics::device_action::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/device-actions/{device}/top",
            get(analytics::device_top_actions::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/user-actions/{user}",
            get(analytics::user_action::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/user-actions/{user}/top",
            get(analytics::user_top_actions::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/recent-actions",
            get(analytics::recent_actions::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        .route(
            "/analytics/export",
            get(analytics::export::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
        // Hub bridge
        .route(
            "/hub/states",
            get(hub::states::<DR, RR, AUR, UR, TR, LR, EP, H>),
        )
}
