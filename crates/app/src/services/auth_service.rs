//! Auth service — registration, login, and token lifecycle.
//!
//! Passwords are stored as bcrypt hashes. Access tokens are stateless
//! JWTs; refresh tokens are JWTs *and* server-side records so they can be
//! revoked one at a time or per user.

use std::sync::Arc;

use techhome_domain::error::{AuthError, HomeError, NotFoundError};
use techhome_domain::id::UserId;
use techhome_domain::user::{self, RefreshToken, User};

use crate::jwt::{JwtService, TokenKind};
use crate::ports::{RefreshTokenRepository, UserRepository};

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A successful registration or login: the account plus both tokens.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Application service for account management and authentication.
pub struct AuthService<U, T> {
    users: U,
    tokens: T,
    jwt: Arc<JwtService>,
}

impl<U, T> AuthService<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    /// Create a new service backed by the given ports.
    pub fn new(users: U, tokens: T, jwt: Arc<JwtService>) -> Self {
        Self { users, tokens, jwt }
    }

    /// Register a new account and log it in.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] for a malformed username, email,
    /// or password; [`AuthError::UsernameTaken`] / [`AuthError::EmailTaken`]
    /// for duplicates; or a storage error from the repositories.
    #[tracing::instrument(skip(self, account), fields(username = %account.username))]
    pub async fn register(&self, account: NewAccount) -> Result<AuthTokens, HomeError> {
        user::validate_username(&account.username)?;
        user::validate_email(&account.email)?;
        user::validate_password(&account.password)?;

        if self.users.find_by_username(&account.username).await?.is_some() {
            return Err(AuthError::UsernameTaken.into());
        }
        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(AuthError::EmailTaken.into());
        }

        let password_hash = bcrypt::hash(&account.password, bcrypt::DEFAULT_COST)
            .map_err(|_| AuthError::HashingFailed)?;

        let mut builder = User::builder()
            .username(account.username)
            .email(account.email)
            .password_hash(password_hash);
        if let Some(name) = account.first_name {
            builder = builder.first_name(name);
        }
        if let Some(name) = account.last_name {
            builder = builder.last_name(name);
        }
        let user = self.users.create(builder.build()?).await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.issue_session(user).await
    }

    /// Log in with a username *or* email plus password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown identifier
    /// or wrong password (deliberately indistinct),
    /// [`AuthError::AccountDisabled`] for deactivated accounts, or a
    /// storage error from the repositories.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthTokens, HomeError> {
        let user = match self.users.find_by_username(identifier).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(identifier).await?,
        };
        let Some(user) = user else {
            return Err(AuthError::InvalidCredentials.into());
        };

        let verified = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
        if !verified {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        tracing::info!(user_id = %user.id, "login successful");
        self.issue_session(user).await
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for a token that fails
    /// verification, [`AuthError::TokenRevoked`] for a revoked/expired
    /// stored token, or a storage error from the repositories.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, HomeError> {
        let claims = self.jwt.verify(refresh_token, TokenKind::Refresh)?;

        let record = self
            .tokens
            .find(refresh_token)
            .await?
            .ok_or(AuthError::TokenRevoked)?;
        if !record.is_usable(techhome_domain::time::now()) {
            return Err(AuthError::TokenRevoked.into());
        }

        let user = self
            .users
            .get_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        self.jwt.issue_access(&user)
    }

    /// Revoke a single refresh token. Unknown tokens are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the token repository.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: &str) -> Result<(), HomeError> {
        self.tokens.revoke(refresh_token).await
    }

    /// Revoke every refresh token belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the token repository.
    #[tracing::instrument(skip(self))]
    pub async fn logout_all(&self, user_id: UserId) -> Result<(), HomeError> {
        self.tokens.revoke_all_for_user(user_id).await
    }

    /// Fetch the account behind an authenticated request.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when the account no longer exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn current_user(&self, id: UserId) -> Result<User, HomeError> {
        self.users.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "User",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Issue both tokens, persist the refresh record, and stamp the login.
    async fn issue_session(&self, user: User) -> Result<AuthTokens, HomeError> {
        let access_token = self.jwt.issue_access(&user)?;
        let (refresh_token, expires_at) = self.jwt.issue_refresh(&user)?;

        self.tokens
            .store(RefreshToken {
                user_id: user.id,
                token: refresh_token.clone(),
                expires_at,
                revoked: false,
            })
            .await?;
        self.users
            .update_last_login(user.id, techhome_domain::time::now())
            .await?;

        Ok(AuthTokens {
            user,
            access_token,
            refresh_token,
        })
    }
}
