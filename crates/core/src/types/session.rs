//! The client-asserted login session.
//!
//! There is no credential check behind a [`Session`]: whatever is stored in
//! the profile is believed. It only gates page navigation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::Role;

/// The hard-coded administrator address.
pub const ADMIN_EMAIL: &str = "admin@homecare.app";

/// Stored session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_authenticated: bool,
    pub user: SessionUser,
}

/// Who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
}

impl Session {
    /// An authenticated session for the given user.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        login_time: DateTime<Utc>,
    ) -> Self {
        Self {
            is_authenticated: true,
            user: SessionUser {
                email: email.into(),
                name: name.into(),
                role,
                login_time,
            },
        }
    }

    /// Admin when the role says so or the address is the admin address.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin() || self.user.email == ADMIN_EMAIL
    }
}

/// Display name for an email: the text before the first `@`, or `User`.
#[must_use]
pub fn display_name_from_email(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_owned(),
        _ => "User".to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_email() {
        assert_eq!(display_name_from_email("sarah@homecare.app"), "sarah");
        assert_eq!(display_name_from_email("no-at-sign"), "no-at-sign");
        assert_eq!(display_name_from_email("@homecare.app"), "User");
        assert_eq!(display_name_from_email(""), "User");
    }

    #[test]
    fn test_is_admin_by_role_or_email() {
        let now = Utc::now();
        assert!(Session::new("boss@x.io", "Boss", Role::Admin, now).is_admin());
        assert!(Session::new(ADMIN_EMAIL, "Admin User", Role::User, now).is_admin());
        assert!(!Session::new("demo@homecare.app", "demo", Role::User, now).is_admin());
    }

    #[test]
    fn test_serde_field_names() {
        let session = Session::new("demo@homecare.app", "demo", Role::User, Utc::now());
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["isAuthenticated"], true);
        assert_eq!(value["user"]["role"], "user");
        assert!(value["user"]["loginTime"].is_string());
    }
}
