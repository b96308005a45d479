//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Validation failures are usually
//! turned into a redirect with an `error` message before they get here; what
//! reaches [`AppError::into_response`] is rendered as a plain status page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::classifier::UploadError;
use crate::services::registry::RegistryError;
use crate::services::tasks::TaskError;
use crate::store::StoreError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Profile store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error comes from the server rather than the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Store(_))
                | Self::Task(TaskError::Store(_))
                | Self::Registry(RegistryError::Store(_))
        )
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.is_server_error() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            Self::Auth(AuthError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::AdminRequired)
            | Self::Registry(RegistryError::CannotDeleteAdmin) => StatusCode::FORBIDDEN,
            Self::Registry(RegistryError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            Self::Upload(UploadError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Task(TaskError::NotFound(_))
            | Self::Registry(RegistryError::NotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_owned();
        }
        match self {
            Self::Auth(err) => err.to_string(),
            Self::Task(err) => err.to_string(),
            Self::Registry(err) => err.to_string(),
            Self::Upload(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), self.user_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Associate subsequent Sentry events with the signed-in email.
pub fn set_sentry_user(profile: &str, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(profile.to_owned()),
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use homecare_core::{TaskId, UserId};

    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("task 7".to_owned());
        assert_eq!(err.to_string(), "Not found: task 7");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status(AppError::Auth(AuthError::NotAuthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AppError::Auth(AuthError::AdminRequired)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(AppError::Task(TaskError::NotFound(TaskId::new(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Registry(RegistryError::NotFound(UserId::new(9)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Registry(RegistryError::CannotDeleteAdmin)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(AppError::Upload(UploadError::Empty)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AppError::Upload(UploadError::TooLarge)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status(AppError::Store(StoreError::Poisoned)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::Task(TaskError::Store(StoreError::Poisoned))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("disk on fire".to_owned());
        assert_eq!(err.user_message(), "Internal server error");

        let err = AppError::Registry(RegistryError::PasswordMismatch);
        assert_eq!(err.user_message(), "Passwords do not match!");
    }
}
