//! JSON REST handlers for automation rules.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_domain::automation::{Action, AutomationRule, Condition, RuleKind};
use techhome_domain::error::ValidationError;
use techhome_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an automation rule.
#[derive(Deserialize)]
pub struct CreateAutomationRequest {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<RuleKind>,
    pub condition: Condition,
    pub action: Action,
    pub enabled: Option<bool>,
}

/// Request body for updating an automation rule.
#[derive(Deserialize)]
pub struct UpdateAutomationRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub condition: Condition,
    pub action: Action,
    pub enabled: bool,
}

fn parse_id(raw: &str) -> Result<AutomationId, ApiError> {
    AutomationId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_string()).into())
}

/// `GET /api/automations` — list all rules.
pub async fn list<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
) -> Result<Json<Vec<AutomationRule>>, ApiError>
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
    let rules = state.automation_service.list_automations().await?;
    Ok(Json(rules))
}

/// `GET /api/automations/{id}` — get rule by id.
pub async fn get<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
) -> Result<Json<AutomationRule>, ApiError>
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
    let rule = state.automation_service.get_automation(parse_id(&id)?).await?;
    Ok(Json(rule))
}

/// `POST /api/automations` — create a new rule.
pub async fn create<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Json(req): Json<CreateAutomationRequest>,
) -> Result<(StatusCode, Json<AutomationRule>), ApiError>
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
    let mut builder = AutomationRule::builder()
        .name(req.name)
        .kind(req.kind.unwrap_or(RuleKind::Time))
        .condition(req.condition)
        .action(req.action);
    if let Some(enabled) = req.enabled {
        builder = builder.enabled(enabled);
    }

    let created = state
        .automation_service
        .create_automation(builder.build()?)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/automations/{id}` — update an existing rule.
pub async fn update<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAutomationRequest>,
) -> Result<Json<AutomationRule>, ApiError>
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
    state.automation_service.get_automation(id).await?;

    let rule = AutomationRule::builder()
        .id(id)
        .name(req.name)
        .kind(req.kind)
        .condition(req.condition)
        .action(req.action)
        .enabled(req.enabled)
        .build()?;
    let updated = state.automation_service.update_automation(rule).await?;
    Ok(Json(updated))
}

/// `POST /api/automations/{id}/toggle` — flip the rule's enabled flag.
pub async fn toggle<DR, RR, AUR, UR, TR, LR, EP, H>(
    State(state): State<AppState<DR, RR, AUR, UR, TR, LR, EP, H>>,
    Path(id): Path<String>,
) -> Result<Json<AutomationRule>, ApiError>
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
    let current = state.automation_service.get_automation(id).await?;
    let updated = state
        .automation_service
        .set_enabled(id, !current.enabled)
        .await?;
    Ok(Json(updated))
}

/// `DELETE /api/automations/{id}` — delete a rule.
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
    state.automation_service.delete_automation(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
