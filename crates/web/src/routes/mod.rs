//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//!
//! # Auth
//! GET  /login                          - Login and create-account page
//! POST /login                          - Log in (any email; admin pair grants admin)
//! POST /login/admin                    - "Log in as admin" shortcut
//! POST /login/guest                    - Continue as guest
//! POST /login/quick-account            - Log in as "New User"
//! POST /register                       - Create account
//! POST /logout                         - Log out
//!
//! # Snap (requires session)
//! GET  /                               - Upload form, reminder cards, recent AI tasks
//! POST /snap                           - Analyze a photo (multipart `photo`)
//! GET  /snap/{id}                      - Analysis result
//! POST /snap/{id}/accept               - Turn the suggestion into a task
//! POST /snap/{id}/dismiss              - Discard the suggestion
//!
//! # Tasks (requires session)
//! GET  /tasks                          - List with summary, filters, sort and explorer
//! GET  /tasks/new                      - Template picker and form
//! POST /tasks                          - Create task
//! POST /tasks/{id}/status              - Change status
//! POST /tasks/{id}/delete              - Delete task
//!
//! # Admin (requires admin)
//! GET  /admin                          - User list and create form
//! POST /admin/users                    - Create user
//! POST /admin/users/{id}/toggle        - Enable or disable
//! POST /admin/users/{id}/delete        - Delete (non-admins only)
//! GET  /admin/users/{id}/reset-password - Reset form
//! POST /admin/users/{id}/reset-password - "Reset" (no state change)
//!
//! # API (requires session)
//! GET  /api/reminders                  - Reminder cards as JSON
//! ```
//!
//! Validation failures redirect back with `?error=`; confirmations use
//! `?notice=`. Templates render both as alert dialogs.

pub mod admin;
pub mod api;
pub mod auth;
pub mod snap;
pub mod tasks;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Deserialize;

use homecare_core::Session;

use crate::state::AppState;

/// Messages carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// The signed-in user as shown in the page header.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub name: String,
    pub email: String,
    pub role_label: &'static str,
    pub is_admin: bool,
}

impl From<&Session> for CurrentUser {
    fn from(session: &Session) -> Self {
        Self {
            name: session.user.name.clone(),
            email: session.user.email.clone(),
            role_label: session.user.role.label(),
            is_admin: session.is_admin(),
        }
    }
}

/// `path` with an `error` message attached.
#[must_use]
pub fn with_error(path: &str, message: &str) -> String {
    with_param(path, "error", message)
}

/// `path` with a `notice` message attached.
#[must_use]
pub fn with_notice(path: &str, message: &str) -> String {
    with_param(path, "notice", message)
}

fn with_param(path: &str, key: &str, value: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{key}={}", urlencoding::encode(value))
}

/// The login page, optionally with an alert.
#[must_use]
pub fn login_redirect(error: Option<&str>) -> String {
    error.map_or_else(|| "/login".to_owned(), |message| with_error("/login", message))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login/admin", post(auth::admin_login))
        .route("/login/guest", post(auth::guest))
        .route("/login/quick-account", post(auth::quick_account))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

fn snap_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(snap::analyze))
        .route("/{id}", get(snap::show))
        .route("/{id}/accept", post(snap::accept))
        .route("/{id}/dismiss", post(snap::dismiss))
        .layer(DefaultBodyLimit::max(snap::MAX_UPLOAD_BYTES))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::index).post(tasks::create))
        .route("/new", get(tasks::new_task))
        .route("/{id}/status", post(tasks::update_status))
        .route("/{id}/delete", post(tasks::delete))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/users", post(admin::create_user))
        .route("/users/{id}/toggle", post(admin::toggle_user))
        .route("/users/{id}/delete", post(admin::delete_user))
        .route(
            "/users/{id}/reset-password",
            get(admin::reset_password_page).post(admin::reset_password),
        )
}

/// All application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(snap::index))
        .merge(auth_routes())
        .nest("/snap", snap_routes())
        .nest("/tasks", task_routes())
        .nest("/admin", admin_routes())
        .route("/api/reminders", get(api::reminders))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_params() {
        assert_eq!(
            with_error("/admin", "Passwords do not match!"),
            "/admin?error=Passwords%20do%20not%20match%21"
        );
        assert_eq!(
            with_notice("/tasks?sort=title", "Saved"),
            "/tasks?sort=title&notice=Saved"
        );
        assert_eq!(login_redirect(None), "/login");
    }
}
