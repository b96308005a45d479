//! Mock session handling.
//!
//! Nothing here verifies a credential. "Logging in" writes a plausible
//! [`Session`] into the profile after a simulated delay, and access checks
//! believe whatever the profile contains. Only the hard-coded admin pair is
//! special-cased.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use homecare_core::{ADMIN_EMAIL, Role, Session, display_name_from_email};

use crate::config::Delays;
use crate::store::{LocalStore, StoreError, keys};

/// Password of the hard-coded admin account.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Display name given to the admin account.
pub const ADMIN_NAME: &str = "Admin User";
/// Domain appended to phone-number usernames.
pub const PHONE_EMAIL_DOMAIN: &str = "homecare.app";
/// Minimum length accepted by account creation.
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const QUICK_ACCOUNT_EMAIL: &str = "newuser@homecare.app";
pub const QUICK_ACCOUNT_NAME: &str = "New User";
pub const GUEST_EMAIL: &str = "guest@homecare.app";
pub const GUEST_NAME: &str = "Guest User";

/// Errors from the session stub.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter your email address.")]
    MissingEmail,

    #[error("Please enter your name.")]
    MissingName,

    #[error("Please enter an email address or phone number.")]
    MissingUsername,

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long!")]
    PasswordTooShort,

    #[error("Please log in to continue.")]
    NotAuthenticated,

    #[error("Access denied. Administrator privileges required.")]
    AdminRequired,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// How the create-account username should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernameType {
    #[default]
    Email,
    Phone,
}

/// Input of the create-account form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub username_type: UsernameType,
    pub password: String,
    pub confirm_password: String,
}

impl NewAccount {
    /// Email the account will be known by.
    #[must_use]
    pub fn email(&self) -> String {
        let username = self.username.trim();
        match self.username_type {
            UsernameType::Email => username.to_owned(),
            UsernameType::Phone => format!("{username}@{PHONE_EMAIL_DOMAIN}"),
        }
    }

    /// Check the form without touching the store.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }
        if self.name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }
        if self.username.trim().is_empty() {
            return Err(AuthError::MissingUsername);
        }
        Ok(())
    }
}

/// Resolve a login attempt to the session it would produce.
///
/// The admin pair yields an admin session; anything else a user session
/// named after the email's local part.
#[must_use]
pub fn session_for_login(email: &str, password: &str, now: DateTime<Utc>) -> Session {
    if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
        Session::new(ADMIN_EMAIL, ADMIN_NAME, Role::Admin, now)
    } else {
        Session::new(email, display_name_from_email(email), Role::User, now)
    }
}

/// Session operations on one profile.
pub struct SessionStub<'a> {
    store: &'a LocalStore,
    delays: Delays,
}

impl<'a> SessionStub<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore, delays: Delays) -> Self {
        Self { store, delays }
    }

    /// The current session, if any.
    ///
    /// A missing or malformed session record falls back to the legacy
    /// `isLoggedIn` marker.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend fails.
    pub fn current(&self) -> Result<Option<Session>, AuthError> {
        if let Some(session) = self.store.read::<Session>(keys::SESSION)?
            && session.is_authenticated
        {
            return Ok(Some(session));
        }

        let logged_in = self.store.get_raw(keys::LEGACY_LOGGED_IN)?;
        if logged_in.as_deref() != Some("true") {
            return Ok(None);
        }

        let email = self
            .store
            .get_raw(keys::LEGACY_USER_EMAIL)?
            .unwrap_or_default();
        let role = if email == ADMIN_EMAIL {
            Role::Admin
        } else {
            Role::User
        };
        let name = if role.is_admin() {
            ADMIN_NAME.to_owned()
        } else {
            display_name_from_email(&email)
        };
        Ok(Some(Session::new(email, name, role, Utc::now())))
    }

    /// Gate a page.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session and
    /// [`AuthError::AdminRequired`] when `required` is admin and the session
    /// is not.
    pub fn check_access(&self, required: Option<Role>) -> Result<Session, AuthError> {
        let session = self.current()?.ok_or(AuthError::NotAuthenticated)?;
        if required == Some(Role::Admin) && !session.is_admin() {
            return Err(AuthError::AdminRequired);
        }
        Ok(session)
    }

    /// Log in with any email; the admin pair grants admin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingEmail`] for a blank email, or a store error.
    #[instrument(skip(self, password), fields(profile = %self.store.profile()))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        simulate_latency(self.delays.login).await;
        let session = session_for_login(email, password, Utc::now());
        self.persist(&session)?;
        tracing::info!(role = %session.user.role, "Logged in");
        Ok(session)
    }

    /// The "log in as admin" shortcut.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[instrument(skip(self), fields(profile = %self.store.profile()))]
    pub async fn admin_quick_login(&self) -> Result<Session, AuthError> {
        simulate_latency(self.delays.admin_login).await;
        let session = Session::new(ADMIN_EMAIL, ADMIN_NAME, Role::Admin, Utc::now());
        self.persist(&session)?;
        tracing::info!("Admin quick login");
        Ok(session)
    }

    /// Create an account and log into it. The password is checked for shape
    /// only and then dropped.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a store error.
    #[instrument(skip(self, account), fields(profile = %self.store.profile()))]
    pub async fn create_account(&self, account: &NewAccount) -> Result<Session, AuthError> {
        account.validate()?;
        simulate_latency(self.delays.account).await;
        let session = Session::new(
            account.email(),
            account.name.trim(),
            Role::User,
            Utc::now(),
        );
        self.persist(&session)?;
        tracing::info!(email = %session.user.email, "Account created");
        Ok(session)
    }

    /// Log in as the placeholder "New User".
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn quick_account(&self) -> Result<Session, AuthError> {
        let session = Session::new(QUICK_ACCOUNT_EMAIL, QUICK_ACCOUNT_NAME, Role::User, Utc::now());
        self.persist(&session)?;
        Ok(session)
    }

    /// Continue as guest.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn guest_login(&self) -> Result<Session, AuthError> {
        let session = Session::new(GUEST_EMAIL, GUEST_NAME, Role::User, Utc::now());
        self.persist(&session)?;
        Ok(session)
    }

    /// Forget the session and legacy markers.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[instrument(skip(self), fields(profile = %self.store.profile()))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(keys::SESSION)?;
        self.store.remove(keys::LEGACY_LOGGED_IN)?;
        self.store.remove(keys::LEGACY_USER_EMAIL)?;
        tracing::info!("Logged out");
        Ok(())
    }

    fn persist(&self, session: &Session) -> Result<(), AuthError> {
        self.store.write(keys::SESSION, session)?;
        self.store.set_raw(keys::LEGACY_LOGGED_IN, "true")?;
        self.store
            .set_raw(keys::LEGACY_USER_EMAIL, &session.user.email)?;
        Ok(())
    }
}

/// Sleep for a simulated delay; zero returns immediately.
pub async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn store() -> LocalStore {
        LocalStore::new(Arc::new(MemoryStore::new()), "test").unwrap()
    }

    fn account(password: &str, confirm: &str) -> NewAccount {
        NewAccount {
            name: "Sam".to_owned(),
            username: "sam@example.com".to_owned(),
            username_type: UsernameType::Email,
            password: password.to_owned(),
            confirm_password: confirm.to_owned(),
        }
    }

    #[test]
    fn test_session_for_login_admin_pair() {
        let session = session_for_login(ADMIN_EMAIL, ADMIN_PASSWORD, Utc::now());
        assert_eq!(session.user.role, Role::Admin);
        assert_eq!(session.user.name, ADMIN_NAME);
    }

    #[test]
    fn test_session_for_login_anything_else_is_user() {
        let wrong_password = session_for_login(ADMIN_EMAIL, "hunter2", Utc::now());
        assert_eq!(wrong_password.user.role, Role::User);
        assert_eq!(wrong_password.user.name, "admin");

        let other = session_for_login("sarah@homecare.app", "", Utc::now());
        assert_eq!(other.user.role, Role::User);
        assert_eq!(other.user.name, "sarah");
    }

    #[tokio::test]
    async fn test_login_persists_session_and_legacy_markers() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        stub.login("demo@homecare.app", "whatever").await.unwrap();

        let current = stub.current().unwrap().unwrap();
        assert_eq!(current.user.email, "demo@homecare.app");
        assert_eq!(
            store.get_raw(keys::LEGACY_LOGGED_IN).unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            store.get_raw(keys::LEGACY_USER_EMAIL).unwrap().as_deref(),
            Some("demo@homecare.app")
        );
    }

    #[tokio::test]
    async fn test_login_rejects_blank_email() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        assert!(matches!(
            stub.login("   ", "x").await,
            Err(AuthError::MissingEmail)
        ));
        assert!(stub.current().unwrap().is_none());
    }

    #[test]
    fn test_malformed_session_without_legacy_marker_is_anonymous() {
        let store = store();
        store.set_raw(keys::SESSION, "{\"isAuthenticated\": tru").unwrap();
        let stub = SessionStub::new(&store, Delays::none());
        assert!(stub.current().unwrap().is_none());
        assert!(matches!(
            stub.check_access(None),
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_legacy_marker_authenticates_when_session_is_malformed() {
        let store = store();
        store.set_raw(keys::SESSION, "garbage").unwrap();
        store.set_raw(keys::LEGACY_LOGGED_IN, "true").unwrap();
        store.set_raw(keys::LEGACY_USER_EMAIL, ADMIN_EMAIL).unwrap();
        let stub = SessionStub::new(&store, Delays::none());
        let session = stub.check_access(Some(Role::Admin)).unwrap();
        assert_eq!(session.user.role, Role::Admin);
    }

    #[test]
    fn test_unauthenticated_flag_is_not_a_session() {
        let store = store();
        let mut session = Session::new("demo@homecare.app", "demo", Role::User, Utc::now());
        session.is_authenticated = false;
        store.write(keys::SESSION, &session).unwrap();
        let stub = SessionStub::new(&store, Delays::none());
        assert!(stub.current().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_access_admin_required() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        stub.login("demo@homecare.app", "x").await.unwrap();
        assert!(stub.check_access(None).is_ok());
        let err = stub.check_access(Some(Role::Admin)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Access denied. Administrator privileges required."
        );
    }

    #[tokio::test]
    async fn test_admin_quick_login() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        let session = stub.admin_quick_login().await.unwrap();
        assert!(session.is_admin());
        assert!(stub.check_access(Some(Role::Admin)).is_ok());
    }

    #[test]
    fn test_new_account_validation_order() {
        assert!(matches!(
            account("secret1", "secret2").validate(),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            account("abc", "abc").validate(),
            Err(AuthError::PasswordTooShort)
        ));
        assert!(account("secret1", "secret1").validate().is_ok());
    }

    #[test]
    fn test_phone_username_becomes_email() {
        let mut form = account("secret1", "secret1");
        form.username = "5551234567".to_owned();
        form.username_type = UsernameType::Phone;
        assert_eq!(form.email(), "5551234567@homecare.app");
    }

    #[tokio::test]
    async fn test_create_account_logs_in_as_user() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        let session = stub
            .create_account(&account("secret1", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.user.name, "Sam");
        assert_eq!(session.user.role, Role::User);
    }

    #[tokio::test]
    async fn test_create_account_failure_writes_nothing() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        assert!(stub.create_account(&account("a", "b")).await.is_err());
        assert!(store.get_raw(keys::SESSION).unwrap().is_none());
    }

    #[test]
    fn test_guest_and_quick_account() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        assert_eq!(stub.guest_login().unwrap().user.name, GUEST_NAME);
        assert_eq!(
            stub.quick_account().unwrap().user.email,
            QUICK_ACCOUNT_EMAIL
        );
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = store();
        let stub = SessionStub::new(&store, Delays::none());
        stub.login("demo@homecare.app", "x").await.unwrap();
        stub.logout().unwrap();
        assert!(stub.current().unwrap().is_none());
        assert!(store.get_raw(keys::LEGACY_USER_EMAIL).unwrap().is_none());
    }
}
