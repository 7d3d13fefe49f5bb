//! Request extractors — bearer-token authentication.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::convert::Infallible;

use techhome_app::jwt::TokenKind;
use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_domain::error::AuthError;
use techhome_domain::id::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, extracted from a `Bearer` access token.
///
/// As a required extractor it rejects with 401 when the token is missing
/// or invalid. As `Option<AuthUser>` it yields `None` instead, for
/// endpoints that only use the identity for logging.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
}

fn verify_bearer<DR, RR, AUR, UR, TR, LR, EP, H>(
    parts: &Parts,
    state: &AppState<DR, RR, AUR, UR, TR, LR, EP, H>,
) -> Result<AuthUser, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::InvalidToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    let claims = state.jwt.verify(token, TokenKind::Access)?;
    Ok(AuthUser {
        user_id: claims.user_id()?,
        username: claims.username,
    })
}

impl<DR, RR, AUR, UR, TR, LR, EP, H> FromRequestParts<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>
    for AuthUser
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
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<DR, RR, AUR, UR, TR, LR, EP, H>,
    ) -> Result<Self, Self::Rejection> {
        verify_bearer(parts, state)
    }
}

impl<DR, RR, AUR, UR, TR, LR, EP, H>
    OptionalFromRequestParts<AppState<DR, RR, AUR, UR, TR, LR, EP, H>> for AuthUser
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
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<DR, RR, AUR, UR, TR, LR, EP, H>,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(verify_bearer(parts, state).ok())
    }
}
