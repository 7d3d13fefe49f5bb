//! `SQLite` implementation of [`RefreshTokenRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techhome_app::ports::RefreshTokenRepository;
use techhome_domain::error::HomeError;
use techhome_domain::id::UserId;
use techhome_domain::user::RefreshToken;

use crate::error::StorageError;

struct Wrapper(RefreshToken);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<RefreshToken> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let token: String = row.try_get("token")?;
        let user_id: String = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;
        let revoked: bool = row.try_get("revoked")?;

        let user_id =
            UserId::from_str(&user_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let expires_at = chrono::DateTime::parse_from_rfc3339(&expires_at)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(RefreshToken {
            user_id,
            token,
            expires_at,
            revoked,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO refresh_tokens (token, user_id, expires_at, revoked) VALUES (?, ?, ?, ?)";
const SELECT_BY_TOKEN: &str = "SELECT * FROM refresh_tokens WHERE token = ?";
const REVOKE: &str = "UPDATE refresh_tokens SET revoked = 1 WHERE token = ?";
const REVOKE_ALL_FOR_USER: &str = "UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ?";

/// `SQLite`-backed refresh-token repository.
pub struct SqliteRefreshTokenRepository {
    pool: SqlitePool,
}

impl SqliteRefreshTokenRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RefreshTokenRepository for SqliteRefreshTokenRepository {
    async fn store(&self, token: RefreshToken) -> Result<(), HomeError> {
        sqlx::query(INSERT)
            .bind(&token.token)
            .bind(token.user_id.to_string())
            .bind(token.expires_at.to_rfc3339())
            .bind(token.revoked)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, HomeError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_TOKEN)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn revoke(&self, token: &str) -> Result<(), HomeError> {
        sqlx::query(REVOKE)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<(), HomeError> {
        sqlx::query(REVOKE_ALL_FOR_USER)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
