//! `SQLite` implementation of [`DeviceLogRepository`].
//!
//! The aggregation queries analytics is built on live here as plain
//! `GROUP BY` statements over the `device_logs` table.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techhome_app::ports::DeviceLogRepository;
use techhome_domain::device_log::{ActionCount, DeviceLog, UsageCount};
use techhome_domain::error::HomeError;

use crate::error::StorageError;

struct Wrapper(DeviceLog);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let user: String = row.try_get("user")?;
        let device: String = row.try_get("device")?;
        let action: String = row.try_get("action")?;
        let result: String = row.try_get("result")?;
        let timestamp: String = row.try_get("timestamp")?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(DeviceLog {
            user,
            device,
            action,
            result,
            timestamp,
        }))
    }
}

struct UsageRow(UsageCount);

impl<'r> FromRow<'r, SqliteRow> for UsageRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(UsageCount {
            key: row.try_get("key")?,
            actions: row.try_get("actions")?,
        }))
    }
}

struct ActionRow(ActionCount);

impl<'r> FromRow<'r, SqliteRow> for ActionRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(ActionCount {
            action: row.try_get("action")?,
            count: row.try_get("count")?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO device_logs (user, device, action, result, timestamp) VALUES (?, ?, ?, ?, ?)";
const USAGE_PER_USER: &str =
    "SELECT user AS key, COUNT(*) AS actions FROM device_logs GROUP BY user ORDER BY actions DESC, key";
const USAGE_PER_DEVICE: &str =
    "SELECT device AS key, COUNT(*) AS actions FROM device_logs GROUP BY device ORDER BY actions DESC, key";
const TOP_ACTIONS_FOR_DEVICE: &str =
    "SELECT action, COUNT(*) AS count FROM device_logs WHERE device = ? GROUP BY action ORDER BY count DESC, action LIMIT ?";
const TOP_ACTIONS_FOR_USER: &str =
    "SELECT action, COUNT(*) AS count FROM device_logs WHERE user = ? GROUP BY action ORDER BY count DESC, action LIMIT ?";
const SELECT_RECENT: &str = "SELECT * FROM device_logs ORDER BY timestamp DESC LIMIT ?";
const SELECT_ALL: &str = "SELECT * FROM device_logs ORDER BY timestamp DESC";

/// `SQLite`-backed device-log repository.
pub struct SqliteDeviceLogRepository {
    pool: SqlitePool,
}

impl SqliteDeviceLogRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceLogRepository for SqliteDeviceLogRepository {
    async fn insert(&self, log: DeviceLog) -> Result<(), HomeError> {
        sqlx::query(INSERT)
            .bind(&log.user)
            .bind(&log.device)
            .bind(&log.action)
            .bind(&log.result)
            .bind(log.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn usage_per_user(&self) -> Result<Vec<UsageCount>, HomeError> {
        let rows: Vec<UsageRow> = sqlx::query_as(USAGE_PER_USER)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn usage_per_device(&self) -> Result<Vec<UsageCount>, HomeError> {
        let rows: Vec<UsageRow> = sqlx::query_as(USAGE_PER_DEVICE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn top_actions_for_device(
        &self,
        device: &str,
        limit: i64,
    ) -> Result<Vec<ActionCount>, HomeError> {
        let rows: Vec<ActionRow> = sqlx::query_as(TOP_ACTIONS_FOR_DEVICE)
            .bind(device)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn top_actions_for_user(
        &self,
        user: &str,
        limit: i64,
    ) -> Result<Vec<ActionCount>, HomeError> {
        let rows: Vec<ActionRow> = sqlx::query_as(TOP_ACTIONS_FOR_USER)
            .bind(user)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<DeviceLog>, HomeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_all(&self) -> Result<Vec<DeviceLog>, HomeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
