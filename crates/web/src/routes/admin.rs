//! User management pages. Every handler requires an admin session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use homecare_core::{Role, UserId, UserRecord};

use super::{CurrentUser, with_error, with_notice};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::services::registry::{NewUser, RegistryError, RegistryStats, UserRegistry};

const ROLES: [Role; 2] = [Role::User, Role::Admin];

const DATE_FORMAT: &str = "%b %-d, %Y";

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    pub search: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Create-user form data.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Reset-password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

pub struct RoleOption {
    pub value: String,
    pub label: &'static str,
}

pub struct UserRow {
    pub user: UserRecord,
    pub created_label: String,
    pub last_login_label: String,
}

impl From<UserRecord> for UserRow {
    fn from(user: UserRecord) -> Self {
        Self {
            created_label: user.created_at.format(DATE_FORMAT).to_string(),
            last_login_label: format_login(user.last_login),
            user,
        }
    }
}

fn format_login(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "Never".to_owned(), |t| t.format(DATE_FORMAT).to_string())
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub search: String,
    pub stats: RegistryStats,
    pub users: Vec<UserRow>,
    pub roles: Vec<RoleOption>,
}

/// Reset-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub target: UserRecord,
}

/// Registry failures that belong on the page rather than an error response.
fn shown_inline(err: &RegistryError) -> bool {
    matches!(
        err,
        RegistryError::PasswordMismatch
            | RegistryError::InvalidEmail(_)
            | RegistryError::MissingName
            | RegistryError::DuplicateEmail(_)
            | RegistryError::CannotDeleteAdmin
    )
}

/// Redirect to `path` with the error, or fail the request.
fn redirect_or_fail(path: &str, err: RegistryError) -> Result<Redirect, AppError> {
    if shown_inline(&err) {
        tracing::warn!(error = %err, "Admin action rejected");
        Ok(Redirect::to(&with_error(path, &err.to_string())))
    } else {
        Err(err.into())
    }
}

/// Display the user list.
#[instrument(skip(store, session, query))]
pub async fn index(
    RequireAdmin { store, session }: RequireAdmin,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, AppError> {
    let registry = UserRegistry::new(&store);
    let users = registry
        .list(&query.search)?
        .into_iter()
        .map(UserRow::from)
        .collect();

    Ok(AdminTemplate {
        user: CurrentUser::from(&session),
        error: query.error,
        notice: query.notice,
        search: query.search,
        stats: registry.stats()?,
        users,
        roles: ROLES
            .into_iter()
            .map(|role| RoleOption {
                value: role.to_string(),
                label: role.label(),
            })
            .collect(),
    })
}

/// Create a user.
#[instrument(skip(store, form), fields(email = %form.email))]
pub async fn create_user(
    RequireAdmin { store, .. }: RequireAdmin,
    Form(form): Form<CreateUserForm>,
) -> Result<Redirect, AppError> {
    let input = NewUser {
        email: form.email,
        name: form.name,
        role: form.role.parse().unwrap_or_default(),
        password: form.password,
        confirm_password: form.confirm_password,
    };
    match UserRegistry::new(&store).create(input, Utc::now()) {
        Ok(user) => Ok(Redirect::to(&with_notice(
            "/admin",
            &format!("User {} created.", user.email),
        ))),
        Err(err) => redirect_or_fail("/admin", err),
    }
}

/// Enable or disable a user.
#[instrument(skip(store))]
pub async fn toggle_user(
    RequireAdmin { store, .. }: RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Redirect, AppError> {
    let user = UserRegistry::new(&store).toggle_status(id)?;
    Ok(Redirect::to(&with_notice(
        "/admin",
        &format!("{} is now {}.", user.email, user.status),
    )))
}

/// Delete a non-admin user.
#[instrument(skip(store))]
pub async fn delete_user(
    RequireAdmin { store, .. }: RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Redirect, AppError> {
    match UserRegistry::new(&store).delete(id) {
        Ok(user) => Ok(Redirect::to(&with_notice(
            "/admin",
            &format!("User {} deleted.", user.email),
        ))),
        Err(err) => redirect_or_fail("/admin", err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    pub error: Option<String>,
}

/// Display the reset-password form.
#[instrument(skip(store, session, query))]
pub async fn reset_password_page(
    RequireAdmin { store, session }: RequireAdmin,
    Path(id): Path<UserId>,
    Query(query): Query<ResetQuery>,
) -> Result<Response, AppError> {
    let target = UserRegistry::new(&store).get(id)?;
    Ok(ResetPasswordTemplate {
        user: CurrentUser::from(&session),
        error: query.error,
        target,
    }
    .into_response())
}

/// "Reset" a password. Only the confirmation is real.
#[instrument(skip(store, form))]
pub async fn reset_password(
    RequireAdmin { store, .. }: RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Redirect, AppError> {
    match UserRegistry::new(&store).reset_password(id, &form.new_password, &form.confirm_password)
    {
        Ok(message) => Ok(Redirect::to(&with_notice("/admin", &message))),
        Err(err) => redirect_or_fail(&format!("/admin/users/{id}/reset-password"), err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use homecare_core::Email;

    use super::*;

    #[test]
    fn test_validation_errors_redirect() {
        let redirect = redirect_or_fail("/admin", RegistryError::PasswordMismatch).unwrap();
        let response = redirect.into_response();
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert_eq!(location, "/admin?error=Passwords%20do%20not%20match%21");

        let dup = RegistryError::DuplicateEmail(Email::parse("a@b.co").unwrap());
        assert!(redirect_or_fail("/admin", dup).is_ok());
    }

    #[test]
    fn test_missing_user_is_an_error_response() {
        let err = redirect_or_fail("/admin", RegistryError::NotFound(UserId::new(9))).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_last_login_label() {
        assert_eq!(format_login(None), "Never");
        let at: DateTime<Utc> = "2024-01-20T10:30:00Z".parse().unwrap();
        assert_eq!(format_login(Some(at)), "Jan 20, 2024");
    }
}
