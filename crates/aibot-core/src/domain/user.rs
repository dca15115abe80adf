//! User domain types.

use serde::{Deserialize, Serialize};

/// Authorization level of a user.
///
/// `None` is the unset value and is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    #[default]
    None,
    User,
    Admin,
}

impl AuthLevel {
    /// Integer representation used by storage.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::None => 0,
            Self::User => 1,
            Self::Admin => 2,
        }
    }

    /// Inverse of [`AuthLevel::as_i64`].
    #[must_use]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::User),
            2 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Parse a level from its lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert the level to its lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Whether this is a concrete (persistable) level.
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub bcrypt: String,
    pub name: String,
    pub auth: AuthLevel,
    pub profile_photo: i64,
}

/// Data for creating a new user.
///
/// Every field is required; a missing one is reported as
/// `RepositoryError::InvalidParameter` naming the field.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: Option<String>,
    pub bcrypt: Option<String>,
    pub name: Option<String>,
    pub auth: AuthLevel,
    pub profile_photo: Option<i64>,
}

impl NewUser {
    /// Build a fully populated insert payload.
    pub fn new(
        email: impl Into<String>,
        bcrypt: impl Into<String>,
        name: impl Into<String>,
        auth: AuthLevel,
        profile_photo: i64,
    ) -> Self {
        Self {
            email: Some(email.into()),
            bcrypt: Some(bcrypt.into()),
            name: Some(name.into()),
            auth,
            profile_photo: Some(profile_photo),
        }
    }
}

/// Partial user update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub bcrypt: Option<String>,
    pub name: Option<String>,
    pub auth: Option<AuthLevel>,
    pub profile_photo: Option<i64>,
}

impl UserUpdate {
    /// True when no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bcrypt.is_none()
            && self.name.is_none()
            && self.auth.is_none()
            && self.profile_photo.is_none()
    }
}

/// An answer id together with the question it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerIdInfo {
    pub answer_id: i64,
    pub question_id: i64,
}
