use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Moderator => "moderator",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            other => Err(ParseError::UnknownRole(other.to_string())),
        }
    }
}

/// Identity record mirrored from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,
    pub discord_id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_server_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether admin-only actions should be offered to this user.
    ///
    /// Client-side gating only; the backend authorizes independently.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// `username#discriminator`, or just the username for migrated accounts.
    pub fn display_name(&self) -> String {
        match self.discriminator.as_str() {
            "" | "0" => self.username.clone(),
            d => format!("{}#{d}", self.username),
        }
    }
}
