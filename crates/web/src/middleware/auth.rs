//! Access extractors.
//!
//! These wrap [`SessionStub::check_access`]: a page behind [`RequireSession`]
//! sends visitors without a session to the login page, and one behind
//! [`RequireAdmin`] also turns away non-admins with the access-denied alert.
//! Paths under `/api/` get bare 401/403 responses instead of redirects.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use homecare_core::{Role, Session};

use super::profile::Profile;
use crate::error::{AppError, set_sentry_user};
use crate::routes::login_redirect;
use crate::services::auth::{AuthError, SessionStub};
use crate::state::AppState;
use crate::store::LocalStore;

/// A signed-in visitor and their profile store.
pub struct RequireSession {
    pub store: LocalStore,
    pub session: Session,
}

/// A signed-in administrator and their profile store.
pub struct RequireAdmin {
    pub store: LocalStore,
    pub session: Session,
}

/// Why an access check failed.
#[derive(Debug)]
pub enum AccessRejection {
    /// Send the browser to the login page, optionally with an alert.
    RedirectToLogin(Option<String>),
    Unauthorized,
    Forbidden,
    Error(AppError),
}

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(message) => {
                Redirect::to(&login_redirect(message.as_deref())).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::Error(err) => err.into_response(),
        }
    }
}

async fn check(
    parts: &mut Parts,
    state: &AppState,
    required: Option<Role>,
) -> Result<(LocalStore, Session), AccessRejection> {
    let is_api = parts.uri.path().starts_with("/api/");
    let Profile(store) = Profile::from_request_parts(parts, state)
        .await
        .map_err(AccessRejection::Error)?;

    match SessionStub::new(&store, state.config().delays).check_access(required) {
        Ok(session) => {
            set_sentry_user(store.profile(), &session.user.email);
            Ok((store, session))
        }
        Err(AuthError::Store(err)) => Err(AccessRejection::Error(err.into())),
        Err(AuthError::AdminRequired) if is_api => Err(AccessRejection::Forbidden),
        Err(_) if is_api => Err(AccessRejection::Unauthorized),
        Err(err @ AuthError::AdminRequired) => {
            tracing::warn!(profile = %store.profile(), "Non-admin tried to open an admin page");
            Err(AccessRejection::RedirectToLogin(Some(err.to_string())))
        }
        Err(_) => Err(AccessRejection::RedirectToLogin(None)),
    }
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AccessRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (store, session) = check(parts, state, None).await?;
        Ok(Self { store, session })
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AccessRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (store, session) = check(parts, state, Some(Role::Admin)).await?;
        Ok(Self { store, session })
    }
}
