//! Shared application state for axum handlers.

use std::sync::Arc;

use techhome_app::jwt::JwtService;
use techhome_app::ports::{
    AutomationRepository, DeviceLogRepository, DeviceRepository, EventPublisher, HubClient,
    RefreshTokenRepository, RoomRepository, UserRepository,
};
use techhome_app::services::analytics_service::AnalyticsService;
use techhome_app::services::auth_service::AuthService;
use techhome_app::services::automation_service::AutomationService;
use techhome_app::services::device_service::DeviceService;
use techhome_app::services::room_service::RoomService;

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do
/// not need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<DR, RR, AUR, UR, TR, LR, EP, H> {
    /// Device CRUD and state changes.
    pub device_service: Arc<DeviceService<DR, LR, EP>>,
    /// Room CRUD.
    pub room_service: Arc<RoomService<RR>>,
    /// Automation-rule CRUD.
    pub automation_service: Arc<AutomationService<AUR, EP>>,
    /// Accounts and tokens.
    pub auth_service: Arc<AuthService<UR, TR>>,
    /// Usage analytics read models.
    pub analytics_service: Arc<AnalyticsService<LR, DR>>,
    /// Remote hub client, for the bridge endpoints.
    pub hub: Arc<H>,
    /// Token verification for the auth extractor.
    pub jwt: Arc<JwtService>,
}

impl<DR, RR, AUR, UR, TR, LR, EP, H> Clone for AppState<DR, RR, AUR, UR, TR, LR, EP, H> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            room_service: Arc::clone(&self.room_service),
            automation_service: Arc::clone(&self.automation_service),
            auth_service: Arc::clone(&self.auth_service),
            analytics_service: Arc::clone(&self.analytics_service),
            hub: Arc::clone(&self.hub),
            jwt: Arc::clone(&self.jwt),
        }
    }
}

impl<DR, RR, AUR, UR, TR, LR, EP, H> AppState<DR, RR, AUR, UR, TR, LR, EP, H>
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
    /// Create a new application state from service instances.
    pub fn new(
        device_service: DeviceService<DR, LR, EP>,
        room_service: RoomService<RR>,
        automation_service: AutomationService<AUR, EP>,
        auth_service: AuthService<UR, TR>,
        analytics_service: AnalyticsService<LR, DR>,
        hub: Arc<H>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            device_service: Arc::new(device_service),
            room_service: Arc::new(room_service),
            automation_service: Arc::new(automation_service),
            auth_service: Arc::new(auth_service),
            analytics_service: Arc::new(analytics_service),
            hub,
            jwt,
        }
    }
}
