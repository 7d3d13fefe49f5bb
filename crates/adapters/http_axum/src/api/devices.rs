//! JSON REST handlers for devices.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_domain::device::{Device, DeviceKind};
use techhome_domain::error::ValidationError;
use techhome_domain::id::{DeviceId, RoomId};

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;

/// Request body for creating a device.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<DeviceKind>,
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub is_on: bool,
    pub temperature: Option<f64>,
    #[serde(default)]
    pub is_home_assistant: bool,
    pub entity_id: Option<String>,
}

/// Request body for updating a device. Full replace; id and creation
/// time are preserved from the stored record.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub room_id: Option<RoomId>,
    pub is_on: bool,
    pub temperature: Option<f64>,
    pub is_home_assistant: bool,
    pub entity_id: Option<String>,
}

/// Request body for setting a thermostat temperature.
#[derive(Deserialize)]
pub struct TemperatureRequest {
    pub temperature: f64,
}

fn parse_id(raw: &str) -> Result<DeviceId, ApiError> {
    DeviceId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_string()).into())
}

fn actor(user: Option<AuthUser>) -> String {
    user.map_or_else(|| "unknown".to_string(), |u| u.username)
}

/// `GET /api/devices` — list all devices.
pub async fn list<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Json<Vec<Device>>, ApiError>
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
    let devices = state.device_service.list_devices().await?;
    Ok(Json(devices))
}

/// `GET /api/devices/{id}` — get device by id.
pub async fn get<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError>
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
    let device = state.device_service.get_device(parse_id(&id)?).await?;
    Ok(Json(device))
}

/// `POST /api/devices` — create a new device.
pub async fn create<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError>
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
    let mut builder = Device::builder()
        .name(req.name)
        .kind(req.kind.unwrap_or(DeviceKind::Light))
        .is_on(req.is_on);
    if let Some(room_id) = req.room_id {
        builder = builder.room_id(room_id);
    }
    if let Some(temperature) = req.temperature {
        builder = builder.temperature(temperature);
    }
    if req.is_home_assistant {
        let entity_id = req
            .entity_id
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingEntityId)?;
        builder = builder.home_assistant(entity_id);
    }

    let created = state.device_service.create_device(builder.build()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/devices/{id}` — update an existing device.
pub async fn update<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDeviceRequest>,
) -> Result<Json<Device>, ApiError>
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
    let existing = state.device_service.get_device(parse_id(&id)?).await?;
    let device = Device {
        id: existing.id,
        name: req.name,
        kind: req.kind,
        room_id: req.room_id,
        is_on: req.is_on,
        temperature: req.temperature,
        is_home_assistant: req.is_home_assistant,
        entity_id: req.entity_id,
        created_at: existing.created_at,
    };
    let updated = state.device_service.update_device(device).await?;
    Ok(Json(updated))
}

/// `DELETE /api/devices/{id}` — delete a device.
pub async fn delete<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
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
    state.device_service.delete_device(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/devices/{id}/toggle` — flip the device's on/off state.
///
/// Authentication is optional; a present token only enriches the usage
/// log with the caller's username.
pub async fn toggle<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    user: Option<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError>
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
    let device = state
        .device_service
        .toggle_device(parse_id(&id)?, &actor(user))
        .await?;
    Ok(Json(device))
}

/// `POST /api/devices/{id}/temperature` — set a thermostat's target.
pub async fn set_temperature<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    user: Option<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<TemperatureRequest>,
) -> Result<Json<Device>, ApiError>
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
    let device = state
        .device_service
        .set_temperature(parse_id(&id)?, req.temperature, &actor(user))
        .await?;
    Ok(Json(device))
}
