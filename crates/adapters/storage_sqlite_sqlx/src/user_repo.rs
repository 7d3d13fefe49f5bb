//! `SQLite` implementation of [`UserRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techhome_app::ports::UserRepository;
use techhome_domain::error::HomeError;
use techhome_domain::id::UserId;
use techhome_domain::time::Timestamp;
use techhome_domain::user::{Role, User};

use crate::error::StorageError;

struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let username: String = row.try_get("username")?;
        let email: String = row.try_get("email")?;
        let password_hash: String = row.try_get("password_hash")?;
        let first_name: Option<String> = row.try_get("first_name")?;
        let last_name: Option<String> = row.try_get("last_name")?;
        let role: String = row.try_get("role")?;
        let is_active: bool = row.try_get("is_active")?;
        let created_at: String = row.try_get("created_at")?;
        let last_login: Option<String> = row.try_get("last_login")?;

        let id = UserId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let role = Role::from_str(&role).unwrap_or(Role::User);
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_login = last_login
            .map(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.to_utc())
                    .map_err(|err| sqlx::Error::Decode(Box::new(err)))
            })
            .transpose()?;

        Ok(Self(User {
            id,
            username,
            email,
            password_hash,
            first_name,
            last_name,
            role,
            is_active,
            created_at,
            last_login,
        }))
    }
}

const INSERT: &str = "INSERT INTO users (id, username, email, password_hash, first_name, last_name, role, is_active, created_at, last_login) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_BY_USERNAME: &str = "SELECT * FROM users WHERE username = ?";
const SELECT_BY_EMAIL: &str = "SELECT * FROM users WHERE email = ?";
const UPDATE_LAST_LOGIN: &str = "UPDATE users SET last_login = ? WHERE id = ?";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: User) -> Result<User, HomeError> {
        sqlx::query(INSERT)
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(user.is_active)
            .bind(user.created_at.to_rfc3339())
            .bind(user.last_login.map(|ts| ts.to_rfc3339()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn update_last_login(&self, id: UserId, at: Timestamp) -> Result<(), HomeError> {
        sqlx::query(UPDATE_LAST_LOGIN)
            .bind(at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteUserRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteUserRepository::new(db.pool().clone())
    }

    fn alice() -> User {
        User::builder()
            .username("alice_1")
            .email("alice@example.com")
            .password_hash("$2b$12$hash")
            .first_name("Alice")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_user() {
        let repo = setup().await;
        let user = alice();
        let id = user.id;

        repo.create(user).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice_1");
        assert_eq!(fetched.first_name.as_deref(), Some("Alice"));
        assert_eq!(fetched.role, Role::User);
        assert!(fetched.is_active);
        assert!(fetched.last_login.is_none());
    }

    #[tokio::test]
    async fn should_find_user_by_username_and_email() {
        let repo = setup().await;
        repo.create(alice()).await.unwrap();

        assert!(repo.find_by_username("alice_1").await.unwrap().is_some());
        assert!(repo.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_username() {
        let repo = setup().await;
        repo.create(alice()).await.unwrap();

        let mut dup = User::builder()
            .username("alice_1")
            .email("other@example.com")
            .password_hash("x")
            .build()
            .unwrap();
        dup.id = UserId::new();

        let result = repo.create(dup).await;
        assert!(matches!(result, Err(HomeError::Storage(_))));
    }

    #[tokio::test]
    async fn should_stamp_last_login() {
        let repo = setup().await;
        let user = alice();
        let id = user.id;
        repo.create(user).await.unwrap();

        let now = techhome_domain::time::now();
        repo.update_last_login(id, now).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        let stamped = fetched.last_login.unwrap();
        assert!((stamped - now).num_seconds().abs() < 1);
    }
}
