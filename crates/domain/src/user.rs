//! User accounts and refresh-token records.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HomeError, ValidationError};
use crate::id::UserId;
use crate::time::Timestamp;

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("static regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Structural check only: something@something.tld without whitespace.
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

/// Role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Lowercase wire/storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "admin" => Self::Admin,
            _ => Self::User,
        })
    }
}

/// A registered account.
///
/// The password hash never leaves the backend; serialization skips it so a
/// `User` can be returned from the API directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub last_login: Option<Timestamp>,
}

impl User {
    /// Create a builder for constructing a [`User`].
    #[must_use]
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// Check domain invariants (username and email shape).
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when the username or email does
    /// not match the required shape.
    pub fn validate(&self) -> Result<(), HomeError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

/// Check that `username` is 3-20 characters of letters, digits, and underscores.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUsername`] otherwise.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_re().is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername)
    }
}

/// Check that `email` is structurally an email address.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] otherwise.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email_re().is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Check the minimum password policy: at least 8 characters, at least one
/// letter, and at least one digit.
///
/// # Errors
///
/// Returns [`ValidationError::WeakPassword`] otherwise.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    if long_enough && has_digit && has_letter {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Step-by-step builder for [`User`].
#[derive(Debug, Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    username: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<Role>,
    is_active: Option<bool>,
    created_at: Option<Timestamp>,
    last_login: Option<Timestamp>,
}

impl UserBuilder {
    #[must_use]
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    #[must_use]
    pub fn last_login(mut self, ts: Timestamp) -> Self {
        self.last_login = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`User`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if the username or email is
    /// missing or malformed.
    pub fn build(self) -> Result<User, HomeError> {
        let user = User {
            id: self.id.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password_hash: self.password_hash.unwrap_or_default(),
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role.unwrap_or(Role::User),
            is_active: self.is_active.unwrap_or(true),
            created_at: self.created_at.unwrap_or_else(crate::time::now),
            last_login: self.last_login,
        };
        user.validate()?;
        Ok(user)
    }
}

/// A stored refresh token, revocable per token or per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: Timestamp,
    pub revoked: bool,
}

impl RefreshToken {
    /// Whether the token can still be exchanged for an access token.
    #[must_use]
    pub fn is_usable(&self, at: Timestamp) -> bool {
        !self.revoked && self.expires_at > at
    }
}
