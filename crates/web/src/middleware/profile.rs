//! Binding requests to a store profile.
//!
//! Each browser gets its own profile, named by a random UUID kept in the
//! cookie session. When `HOMECARE_PROFILE` is set every request shares that
//! profile instead.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::{LocalStore, validate_component};

/// Cookie session key holding the profile name.
pub const PROFILE_SESSION_KEY: &str = "profile";

/// Extractor for the current profile's store.
pub struct Profile(pub LocalStore);

impl FromRequestParts<AppState> for Profile {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let name = match &state.config().fixed_profile {
            Some(fixed) => fixed.clone(),
            None => {
                let session = parts
                    .extensions
                    .get::<tower_sessions::Session>()
                    .cloned()
                    .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;
                bound_profile(&session).await?
            }
        };

        Span::current().record("profile", name.as_str());
        Ok(Self(state.store_for(&name)?))
    }
}

/// The profile stored in `session`, binding a fresh one if there is none.
async fn bound_profile(session: &tower_sessions::Session) -> Result<String, AppError> {
    let existing = session
        .get::<String>(PROFILE_SESSION_KEY)
        .await
        .map_err(session_error)?;
    if let Some(name) = existing
        && validate_component(&name).is_ok()
    {
        return Ok(name);
    }

    let name = Uuid::new_v4().simple().to_string();
    session
        .insert(PROFILE_SESSION_KEY, &name)
        .await
        .map_err(session_error)?;
    tracing::debug!(profile = %name, "Bound new profile");
    Ok(name)
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}
