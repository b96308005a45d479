//! Whole-profile commands.

use chrono::Utc;

use homecare_web::config::Delays;
use homecare_web::services::auth::SessionStub;
use homecare_web::services::registry::UserRegistry;
use homecare_web::services::tasks::TaskStore;
use homecare_web::store::LocalStore;

use super::CliError;

/// Load tasks and users, which seeds whichever is missing.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn seed(store: &LocalStore) -> Result<(), CliError> {
    let tasks = TaskStore::new(store).load(Utc::now())?;
    let users = UserRegistry::new(store).load()?;
    tracing::info!(
        profile = store.profile(),
        tasks = tasks.len(),
        users = users.len(),
        "Profile ready"
    );
    Ok(())
}

/// Remove tasks, users and the login state.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn reset(store: &LocalStore) -> Result<(), CliError> {
    TaskStore::new(store).clear()?;
    UserRegistry::new(store).clear()?;
    SessionStub::new(store, Delays::none()).logout()?;
    tracing::info!(profile = store.profile(), "Profile reset");
    Ok(())
}
