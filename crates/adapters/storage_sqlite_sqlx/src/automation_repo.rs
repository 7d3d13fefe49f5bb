//! `SQLite` implementation of [`AutomationRepository`].
//!
//! Condition and action payloads are stored as JSON text columns so the
//! structured shapes round-trip unchanged, legacy key spellings included.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techhome_app::ports::AutomationRepository;
use techhome_domain::automation::{Action, AutomationRule, Condition, RuleKind};
use techhome_domain::error::HomeError;
use techhome_domain::id::AutomationId;

use crate::error::StorageError;

struct Wrapper(AutomationRule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let kind_json: String = row.try_get("kind")?;
        let condition_json: String = row.try_get("condition_data")?;
        let action_json: String = row.try_get("action_data")?;
        let enabled: bool = row.try_get("enabled")?;

        let id = AutomationId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let kind: RuleKind = serde_json::from_str(&kind_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let condition: Condition = serde_json::from_str(&condition_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let action: Action = serde_json::from_str(&action_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(AutomationRule {
            id,
            name,
            kind,
            condition,
            action,
            enabled,
        }))
    }
}

const INSERT: &str = "INSERT INTO automations (id, name, kind, condition_data, action_data, enabled) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM automations WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM automations ORDER BY name";
const SELECT_ENABLED: &str = "SELECT * FROM automations WHERE enabled = 1 ORDER BY name";
const UPDATE: &str = "UPDATE automations SET name = ?, kind = ?, condition_data = ?, action_data = ?, enabled = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM automations WHERE id = ?";

/// `SQLite`-backed automation repository.
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, HomeError> {
        let kind_json = serde_json::to_string(&rule.kind).map_err(StorageError::from)?;
        let condition_json = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let action_json = serde_json::to_string(&rule.action).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(rule.id.to_string())
            .bind(&rule.name)
            .bind(&kind_json)
            .bind(&condition_json)
            .bind(&action_json)
            .bind(rule.enabled)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<AutomationRule>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<AutomationRule>, HomeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_enabled(&self) -> Result<Vec<AutomationRule>, HomeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ENABLED)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, HomeError> {
        let kind_json = serde_json::to_string(&rule.kind).map_err(StorageError::from)?;
        let condition_json = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let action_json = serde_json::to_string(&rule.action).map_err(StorageError::from)?;

        sqlx::query(UPDATE)
            .bind(&rule.name)
            .bind(&kind_json)
            .bind(&condition_json)
            .bind(&action_json)
            .bind(rule.enabled)
            .bind(rule.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn delete(&self, id: AutomationId) -> Result<(), HomeError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
