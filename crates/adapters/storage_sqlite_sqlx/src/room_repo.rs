//! `SQLite` implementation of [`RoomRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techhome_app::ports::RoomRepository;
use techhome_domain::error::HomeError;
use techhome_domain::id::RoomId;
use techhome_domain::room::Room;

use crate::error::StorageError;

struct Wrapper(Room);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Room> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let icon: Option<String> = row.try_get("icon")?;

        let id = RoomId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Room { id, name, icon }))
    }
}

const INSERT: &str = "INSERT INTO rooms (id, name, icon) VALUES (?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM rooms WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM rooms ORDER BY name";
const UPDATE: &str = "UPDATE rooms SET name = ?, icon = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM rooms WHERE id = ?";

/// `SQLite`-backed room repository.
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RoomRepository for SqliteRoomRepository {
    async fn create(&self, room: Room) -> Result<Room, HomeError> {
        sqlx::query(INSERT)
            .bind(room.id.to_string())
            .bind(&room.name)
            .bind(&room.icon)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(room)
    }

    async fn get_by_id(&self, id: RoomId) -> Result<Option<Room>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Room>, HomeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, room: Room) -> Result<Room, HomeError> {
        sqlx::query(UPDATE)
            .bind(&room.name)
            .bind(&room.icon)
            .bind(room.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(room)
    }

    async fn delete(&self, id: RoomId) -> Result<(), HomeError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
