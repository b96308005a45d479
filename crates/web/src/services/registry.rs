//! Admin user registry.
//!
//! Accounts created here are bookkeeping only; they are not consulted when
//! someone logs in, and passwords are validated then dropped.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use homecare_core::{
    ADMIN_EMAIL, Email, EmailError, Role, UserId, UserRecord, UserStatus, next_id,
};

use crate::store::{LocalStore, StoreError, keys};

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Please enter a name.")]
    MissingName,

    #[error("User with this email already exists!")]
    DuplicateEmail(Email),

    #[error("Administrator accounts cannot be deleted.")]
    CannotDeleteAdmin,

    #[error("User {0} not found.")]
    NotFound(UserId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Input of the create-user form.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: String,
    pub confirm_password: String,
}

/// Header counts on the admin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub active: usize,
    pub admins: usize,
}

/// The three accounts every profile starts with.
#[must_use]
pub fn seed_users() -> Vec<UserRecord> {
    let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single();
    let user = |id: i64, email: &str, name: &str, role: Role, created: Option<DateTime<Utc>>| {
        Email::parse(email).ok().map(|email| UserRecord {
            id: UserId::new(id),
            email,
            name: name.to_owned(),
            role,
            status: UserStatus::Active,
            created_at: created.unwrap_or_default(),
            last_login: None,
        })
    };

    let mut admin = user(1, ADMIN_EMAIL, "Admin User", Role::Admin, at(2024, 1, 1));
    if let Some(admin) = admin.as_mut() {
        admin.last_login = at(2024, 1, 20);
    }

    [
        admin,
        user(2, "demo@homecare.app", "Demo User", Role::User, at(2024, 1, 5)),
        user(3, "guest@homecare.app", "Guest User", Role::User, at(2024, 1, 10)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Registry operations on one profile.
pub struct UserRegistry<'a> {
    store: &'a LocalStore,
}

impl<'a> UserRegistry<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// All users, seeding an empty profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn load(&self) -> Result<Vec<UserRecord>, RegistryError> {
        if let Some(users) = self.store.read::<Vec<UserRecord>>(keys::USERS)? {
            return Ok(users);
        }
        tracing::info!(profile = %self.store.profile(), "Seeding default users");
        let users = seed_users();
        self.save(&users)?;
        Ok(users)
    }

    /// Users whose email or name contains `search` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn list(&self, search: &str) -> Result<Vec<UserRecord>, RegistryError> {
        let needle = search.trim().to_lowercase();
        let users = self.load()?;
        if needle.is_empty() {
            return Ok(users);
        }
        Ok(users.into_iter().filter(|u| u.matches(&needle)).collect())
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn stats(&self) -> Result<RegistryStats, RegistryError> {
        let users = self.load()?;
        Ok(RegistryStats {
            total: users.len(),
            active: users.iter().filter(|u| u.is_active()).count(),
            admins: users.iter().filter(|u| u.is_admin()).count(),
        })
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id, or a store error.
    pub fn get(&self, id: UserId) -> Result<UserRecord, RegistryError> {
        self.load()?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Append an active user.
    ///
    /// # Errors
    ///
    /// Fails without changing anything when the passwords differ, the email is
    /// malformed or already registered, or the name is blank.
    #[instrument(skip(self, input), fields(profile = %self.store.profile(), email = %input.email))]
    pub fn create(&self, input: NewUser, now: DateTime<Utc>) -> Result<UserRecord, RegistryError> {
        if input.password != input.confirm_password {
            return Err(RegistryError::PasswordMismatch);
        }
        let email = Email::parse(&input.email)?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(RegistryError::MissingName);
        }

        let mut users = self.load()?;
        if users.iter().any(|u| u.email == email) {
            return Err(RegistryError::DuplicateEmail(email));
        }

        let id = next_id(now.timestamp_millis(), users.iter().map(|u| u.id.as_i64()));
        let user = UserRecord {
            id: UserId::new(id),
            email,
            name: name.to_owned(),
            role: input.role,
            status: UserStatus::Active,
            created_at: now,
            last_login: None,
        };
        users.push(user.clone());
        self.save(&users)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Flip between active and disabled.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id, or a store error.
    #[instrument(skip(self), fields(profile = %self.store.profile()))]
    pub fn toggle_status(&self, id: UserId) -> Result<UserRecord, RegistryError> {
        let mut users = self.load()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        user.status = user.status.toggled();
        let updated = user.clone();
        self.save(&users)?;
        tracing::info!(status = %updated.status, "User status changed");
        Ok(updated)
    }

    /// Remove a non-admin user.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CannotDeleteAdmin`] for admins,
    /// [`RegistryError::NotFound`] for an unknown id, or a store error.
    #[instrument(skip(self), fields(profile = %self.store.profile()))]
    pub fn delete(&self, id: UserId) -> Result<UserRecord, RegistryError> {
        let mut users = self.load()?;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        if users.get(index).is_some_and(UserRecord::is_admin) {
            return Err(RegistryError::CannotDeleteAdmin);
        }
        let removed = users.remove(index);
        self.save(&users)?;
        tracing::info!(email = %removed.email, "User deleted");
        Ok(removed)
    }

    /// "Reset" a password. Nothing is stored; the returned message is the
    /// whole effect.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PasswordMismatch`] or
    /// [`RegistryError::NotFound`].
    #[instrument(skip(self, new_password, confirm), fields(profile = %self.store.profile()))]
    pub fn reset_password(
        &self,
        id: UserId,
        new_password: &str,
        confirm: &str,
    ) -> Result<String, RegistryError> {
        let user = self.get(id)?;
        if new_password != confirm {
            return Err(RegistryError::PasswordMismatch);
        }
        Ok(format!(
            "Password reset for {} has been completed.",
            user.email
        ))
    }

    /// Drop every user (the next load reseeds).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<(), RegistryError> {
        self.store.remove(keys::USERS)?;
        Ok(())
    }

    fn save(&self, users: &[UserRecord]) -> Result<(), RegistryError> {
        self.store.write(keys::USERS, users)?;
        Ok(())
    }
}
