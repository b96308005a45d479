//! Registry user commands.

use chrono::Utc;

use homecare_core::UserId;
use homecare_web::services::registry::{NewUser, UserRegistry};
use homecare_web::store::LocalStore;

use super::{CliError, parse_arg};

/// Log every user matching `search`.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list(store: &LocalStore, search: &str) -> Result<(), CliError> {
    let registry = UserRegistry::new(store);
    let stats = registry.stats()?;
    tracing::info!(
        total = stats.total,
        active = stats.active,
        admins = stats.admins,
        "Users"
    );
    for user in registry.list(search)? {
        tracing::info!(
            "  {:>14}  {:<28} {:<20} {:<13} {}",
            user.id,
            user.email,
            user.name,
            user.role.label(),
            user.status.label()
        );
    }
    Ok(())
}

/// Create a user with the given password.
///
/// # Errors
///
/// Returns an error for an unknown role, a validation failure or a store
/// failure.
pub fn create(
    store: &LocalStore,
    email: String,
    name: String,
    role: &str,
    password: String,
) -> Result<(), CliError> {
    let user = UserRegistry::new(store).create(
        NewUser {
            email,
            name,
            role: parse_arg("role", role)?,
            confirm_password: password.clone(),
            password,
        },
        Utc::now(),
    )?;
    tracing::info!(id = %user.id, email = %user.email, role = %user.role, "User created");
    Ok(())
}

/// Enable or disable a user.
///
/// # Errors
///
/// Returns an error for an unknown id or a store failure.
pub fn toggle(store: &LocalStore, id: i64) -> Result<(), CliError> {
    let user = UserRegistry::new(store).toggle_status(UserId::new(id))?;
    tracing::info!(email = %user.email, status = %user.status, "User updated");
    Ok(())
}

/// Delete a non-admin user.
///
/// # Errors
///
/// Returns an error for an unknown id, an admin account or a store failure.
pub fn delete(store: &LocalStore, id: i64) -> Result<(), CliError> {
    let user = UserRegistry::new(store).delete(UserId::new(id))?;
    tracing::info!(email = %user.email, "User deleted");
    Ok(())
}
