//! JSON REST handlers for registration, login, and token lifecycle.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_app::services::auth_service::NewAccount;
use techhome_domain::error::ValidationError;
use techhome_domain::user::User;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;

/// Request body for `POST /api/auth/register`.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Request body for `POST /api/auth/login`. Either `username` or `email`
/// must be present.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Request body carrying a refresh token.
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for a successful registration or login.
#[derive(Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub user_id: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response carrying a fresh access token.
#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Plain confirmation message.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /api/auth/register` — create an account and log it in.
pub async fn register<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError>
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
    let tokens = state
        .auth_service
        .register(NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "User registered successfully".to_string(),
            user_id: tokens.user.id.to_string(),
            username: tokens.user.username,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

/// `POST /api/auth/login` — log in with username or email.
pub async fn login<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError>
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
    let identifier = req
        .username
        .or(req.email)
        .ok_or(ValidationError::MissingField("username or email"))?;

    let tokens = state.auth_service.login(&identifier, &req.password).await?;

    Ok(Json(SessionResponse {
        message: "Login successful".to_string(),
        user_id: tokens.user.id.to_string(),
        username: tokens.user.username,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// `POST /api/auth/refresh` — exchange a refresh token for an access token.
pub async fn refresh<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError>
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
    let access_token = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

/// `POST /api/auth/logout` — revoke one refresh token.
pub async fn logout<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    _user: AuthUser,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError>
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
    state.auth_service.logout(&req.refresh_token).await?;
    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

/// `POST /api/auth/logout-all` — revoke every refresh token of the caller.
pub async fn logout_all<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, ApiError>
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
    state.auth_service.logout_all(user.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Logged out from all devices".to_string(),
    }))
}

/// `GET /api/auth/me` — the authenticated account, without its hash.
pub async fn me<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    user: AuthUser,
) -> Result<Json<User>, ApiError>
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
    let account = state.auth_service.current_user(user.user_id).await?;
    Ok(Json(account))
}
