//! User account record managed by the admin registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::status::{Role, UserStatus};

/// A registered account. Passwords are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Case-insensitive match on email or name. `needle_lower` must already
    /// be lowercase.
    #[must_use]
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.email.contains_ignore_case(needle_lower)
            || self.name.to_lowercase().contains(needle_lower)
    }
}
