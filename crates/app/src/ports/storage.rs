//! Storage port — repository traits for persistence.

use std::future::Future;

use techhome_domain::device::Device;
use techhome_domain::device_log::{ActionCount, DeviceLog, UsageCount};
use techhome_domain::error::HomeError;
use techhome_domain::id::{DeviceId, RoomId, UserId};
use techhome_domain::room::Room;
use techhome_domain::time::Timestamp;
use techhome_domain::user::{RefreshToken, User};

/// Repository for persisting and querying [`Device`]s.
pub trait DeviceRepository {
    /// Create a new device in storage.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HomeError>> + Send;

    /// Get a device by its unique identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeError>> + Send;

    /// Get all devices.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeError>> + Send;

    /// Find the device mirroring a given hub entity, if any.
    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HomeError>> + Send;

    /// Update an existing device.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HomeError>> + Send;

    /// Write just the on/off state for a device.
    ///
    /// This is a blind single-field write: last writer wins, no
    /// read-modify-write guard. Both the executor and user toggles go
    /// through here.
    fn set_state(
        &self,
        id: DeviceId,
        is_on: bool,
    ) -> impl Future<Output = Result<(), HomeError>> + Send;

    /// Delete a device by its unique identifier.
    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), HomeError>> + Send;
}

/// Repository for persisting and querying [`Room`]s.
pub trait RoomRepository {
    /// Create a new room in storage.
    fn create(&self, room: Room) -> impl Future<Output = Result<Room, HomeError>> + Send;

    /// Get a room by its unique identifier.
    fn get_by_id(&self, id: RoomId)
    -> impl Future<Output = Result<Option<Room>, HomeError>> + Send;

    /// Get all rooms.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Room>, HomeError>> + Send;

    /// Update an existing room.
    fn update(&self, room: Room) -> impl Future<Output = Result<Room, HomeError>> + Send;

    /// Delete a room by its unique identifier.
    fn delete(&self, id: RoomId) -> impl Future<Output = Result<(), HomeError>> + Send;
}

/// Repository for persisting and querying [`User`]s.
pub trait UserRepository {
    /// Create a new user in storage.
    fn create(&self, user: User) -> impl Future<Output = Result<User, HomeError>> + Send;

    /// Get a user by its unique identifier.
    fn get_by_id(&self, id: UserId)
    -> impl Future<Output = Result<Option<User>, HomeError>> + Send;

    /// Find a user by exact username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, HomeError>> + Send;

    /// Find a user by exact email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, HomeError>> + Send;

    /// Record a successful login time.
    fn update_last_login(
        &self,
        id: UserId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), HomeError>> + Send;
}

/// Repository for stored refresh tokens.
pub trait RefreshTokenRepository {
    /// Persist a freshly issued token.
    fn store(&self, token: RefreshToken) -> impl Future<Output = Result<(), HomeError>> + Send;

    /// Look up a token by its exact string value.
    fn find(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<RefreshToken>, HomeError>> + Send;

    /// Revoke a single token. No-op if unknown.
    fn revoke(&self, token: &str) -> impl Future<Output = Result<(), HomeError>> + Send;

    /// Revoke every token belonging to a user.
    fn revoke_all_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), HomeError>> + Send;
}

/// Repository for the device-usage log, including the aggregation queries
/// analytics is built on.
pub trait DeviceLogRepository {
    /// Append one log entry.
    fn insert(&self, log: DeviceLog) -> impl Future<Output = Result<(), HomeError>> + Send;

    /// Action counts grouped by user, most active first.
    fn usage_per_user(&self) -> impl Future<Output = Result<Vec<UsageCount>, HomeError>> + Send;

    /// Action counts grouped by device reference, most used first.
    fn usage_per_device(&self) -> impl Future<Output = Result<Vec<UsageCount>, HomeError>> + Send;

    /// The most frequent actions for one device reference.
    fn top_actions_for_device(
        &self,
        device: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ActionCount>, HomeError>> + Send;

    /// The most frequent actions for one user.
    fn top_actions_for_user(
        &self,
        user: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ActionCount>, HomeError>> + Send;

    /// The most recent entries, newest first.
    fn recent(&self, limit: i64) -> impl Future<Output = Result<Vec<DeviceLog>, HomeError>> + Send;

    /// Every entry, newest first (CSV export).
    fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceLog>, HomeError>> + Send;
}
