//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HomeError`]
//! via `#[from]`. Adapters wrap their infrastructure errors (sqlx, reqwest)
//! in the boxed [`HomeError::Storage`] / [`HomeError::Hub`] variants so the
//! domain never depends on those crates.

/// Top-level error for the techhome system.
#[derive(Debug, thiserror::Error)]
pub enum HomeError {
    /// A domain invariant or input validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Authentication or account-state failure.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Failure in the persistence layer.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Failure talking to the remote hub.
    #[error("hub error")]
    Hub(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant and input validation failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A name field was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A hub-linked device is missing its hub entity id.
    #[error("hub-linked device requires an entity id")]
    MissingEntityId,

    /// An identifier string could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A request is missing a required field.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Username does not match the required shape.
    #[error("username must be 3-20 characters of letters, numbers, and underscores")]
    InvalidUsername,

    /// Email address is not structurally valid.
    #[error("invalid email address")]
    InvalidEmail,

    /// Password does not meet the minimum requirements.
    #[error("password must be at least 8 characters and contain at least one letter and one number")]
    WeakPassword,

    /// A temperature command was sent to a device that has no thermostat.
    #[error("device is not a thermostat")]
    NotAThermostat,
}

/// A referenced record does not exist.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Human-readable record kind (e.g. `"Device"`).
    pub entity: &'static str,
    /// The identifier that failed to resolve.
    pub id: String,
}

/// Authentication and account-state failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown user or wrong password. Deliberately indistinct.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is disabled")]
    AccountDisabled,

    /// The presented token failed verification or has expired.
    #[error("invalid token")]
    InvalidToken,

    /// The refresh token was revoked or is unknown.
    #[error("refresh token revoked")]
    TokenRevoked,

    /// Password hashing failed; should not happen with valid cost settings.
    #[error("password hashing failed")]
    HashingFailed,

    /// Registration with a username that is already taken.
    #[error("username already exists")]
    UsernameTaken,

    /// Registration with an email that is already registered.
    #[error("email already registered")]
    EmailTaken,
}
