//! Cookie session configuration.
//!
//! The cookie session only binds a browser to a store profile; the mock
//! login state itself lives in the profile store.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::HomecareConfig;

pub const SESSION_COOKIE_NAME: &str = "homecare_session";

/// Seven days of inactivity, the same idle window as in-memory profiles.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer backed by process memory.
#[must_use]
pub fn create_session_layer(config: &HomecareConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PROFILE_IDLE;

    #[test]
    fn test_session_and_profile_expire_together() {
        assert_eq!(SESSION_EXPIRY_SECONDS.unsigned_abs(), PROFILE_IDLE.as_secs());
    }
}
