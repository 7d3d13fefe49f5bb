//! `SQLite` implementation of [`DeviceRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techhome_app::ports::DeviceRepository;
use techhome_domain::device::{Device, DeviceKind};
use techhome_domain::error::HomeError;
use techhome_domain::id::{DeviceId, RoomId};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let kind: String = row.try_get("kind")?;
        let room_id: Option<String> = row.try_get("room_id")?;
        let is_on: bool = row.try_get("is_on")?;
        let temperature: Option<f64> = row.try_get("temperature")?;
        let is_home_assistant: bool = row.try_get("is_home_assistant")?;
        let entity_id: Option<String> = row.try_get("entity_id")?;
        let created_at: String = row.try_get("created_at")?;

        let id = DeviceId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let room_id = room_id
            .map(|s| RoomId::from_str(&s))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let kind = DeviceKind::from_str(&kind).unwrap_or(DeviceKind::Other);
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Device {
            id,
            name,
            kind,
            room_id,
            is_on,
            temperature,
            is_home_assistant,
            entity_id,
            created_at,
        }))
    }
}

const INSERT: &str = "INSERT INTO devices (id, name, kind, room_id, is_on, temperature, is_home_assistant, entity_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM devices ORDER BY name";
const SELECT_BY_ENTITY_ID: &str = "SELECT * FROM devices WHERE entity_id = ?";
const UPDATE: &str = "UPDATE devices SET name = ?, kind = ?, room_id = ?, is_on = ?, temperature = ?, is_home_assistant = ?, entity_id = ? WHERE id = ?";
const SET_STATE: &str = "UPDATE devices SET is_on = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE id = ?";

/// `SQLite`-backed device repository.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    async fn create(&self, device: Device) -> Result<Device, HomeError> {
        sqlx::query(INSERT)
            .bind(device.id.to_string())
            .bind(&device.name)
            .bind(device.kind.as_str())
            .bind(device.room_id.map(|id| id.to_string()))
            .bind(device.is_on)
            .bind(device.temperature)
            .bind(device.is_home_assistant)
            .bind(&device.entity_id)
            .bind(device.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(device)
    }

    async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Device>, HomeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Device>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ENTITY_ID)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn update(&self, device: Device) -> Result<Device, HomeError> {
        sqlx::query(UPDATE)
            .bind(&device.name)
            .bind(device.kind.as_str())
            .bind(device.room_id.map(|id| id.to_string()))
            .bind(device.is_on)
            .bind(device.temperature)
            .bind(device.is_home_assistant)
            .bind(&device.entity_id)
            .bind(device.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(device)
    }

    async fn set_state(&self, id: DeviceId, is_on: bool) -> Result<(), HomeError> {
        sqlx::query(SET_STATE)
            .bind(is_on)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete(&self, id: DeviceId) -> Result<(), HomeError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
