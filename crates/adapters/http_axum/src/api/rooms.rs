//! JSON REST handlers for rooms.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_domain::error::ValidationError;
use techhome_domain::id::RoomId;
use techhome_domain::room::Room;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or updating a room.
#[derive(Deserialize)]
pub struct RoomRequest {
    pub name: String,
    pub icon: Option<String>,
}

fn parse_id(raw: &str) -> Result<RoomId, ApiError> {
    RoomId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_string()).into())
}

fn room_from(req: RoomRequest) -> Result<Room, ApiError> {
    let mut builder = Room::builder().name(req.name);
    if let Some(icon) = req.icon {
        builder = builder.icon(icon);
    }
    Ok(builder.build()?)
}

/// `GET /api/rooms` — list all rooms.
pub async fn list<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Json<Vec<Room>>, ApiError>
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
    let rooms = state.room_service.list_rooms().await?;
    Ok(Json(rooms))
}

/// `GET /api/rooms/{id}` — get room by id.
pub async fn get<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
) -> Result<Json<Room>, ApiError>
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
    let room = state.room_service.get_room(parse_id(&id)?).await?;
    Ok(Json(room))
}

/// `POST /api/rooms` — create a new room.
pub async fn create<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Json(req): Json<RoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError>
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
    let created = state.room_service.create_room(room_from(req)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/rooms/{id}` — update an existing room.
pub async fn update<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
    Json(req): Json<RoomRequest>,
) -> Result<Json<Room>, ApiError>
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
    let id = parse_id(&id)?;
    // Verify it exists before replacing.
    state.room_service.get_room(id).await?;

    let mut room = room_from(req)?;
    room.id = id;
    let updated = state.room_service.update_room(room).await?;
    Ok(Json(updated))
}

/// `DELETE /api/rooms/{id}` — delete a room.
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
    state.room_service.delete_room(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
