//! Login, account creation and logout.
//!
//! All of this is a mock: any email logs in, and the only thing checked is
//! whether the pair matches the hard-coded admin account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use homecare_core::Session;

use super::{login_redirect, with_error, with_notice};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::Profile;
use crate::services::auth::{AuthError, NewAccount, SessionStub};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
    pub tab: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
    pub register: bool,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        notice: query.notice,
        register: query.tab.as_deref() == Some("register"),
    }
}

/// Where a fresh session lands.
fn landing(session: &Session) -> &'static str {
    if session.is_admin() { "/admin" } else { "/" }
}

/// Turn a login outcome into a redirect.
fn finish(store_profile: &str, outcome: Result<Session, AuthError>, retry: &str) -> Response {
    match outcome {
        Ok(session) => {
            set_sentry_user(store_profile, &session.user.email);
            Redirect::to(landing(&session)).into_response()
        }
        Err(AuthError::Store(err)) => AppError::from(err).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Login rejected");
            Redirect::to(&with_error(retry, &err.to_string())).into_response()
        }
    }
}

/// Handle the sign-in form.
#[instrument(skip(state, store, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Profile(store): Profile,
    Form(form): Form<LoginForm>,
) -> Response {
    let stub = SessionStub::new(&store, state.config().delays);
    let outcome = stub.login(&form.email, &form.password).await;
    finish(store.profile(), outcome, "/login")
}

/// "Log in as admin" shortcut.
#[instrument(skip(state, store))]
pub async fn admin_login(State(state): State<AppState>, Profile(store): Profile) -> Response {
    let stub = SessionStub::new(&store, state.config().delays);
    let outcome = stub.admin_quick_login().await;
    finish(store.profile(), outcome, "/login")
}

/// Continue as guest.
#[instrument(skip(state, store))]
pub async fn guest(State(state): State<AppState>, Profile(store): Profile) -> Response {
    let outcome = SessionStub::new(&store, state.config().delays).guest_login();
    finish(store.profile(), outcome, "/login")
}

/// Log in as the placeholder account.
#[instrument(skip(state, store))]
pub async fn quick_account(State(state): State<AppState>, Profile(store): Profile) -> Response {
    let outcome = SessionStub::new(&store, state.config().delays).quick_account();
    finish(store.profile(), outcome, "/login?tab=register")
}

/// Handle the create-account form.
#[instrument(skip(state, store, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Profile(store): Profile,
    Form(form): Form<NewAccount>,
) -> Response {
    let stub = SessionStub::new(&store, state.config().delays);
    let outcome = stub.create_account(&form).await;
    finish(store.profile(), outcome, "/login?tab=register")
}

/// Log out and return to the login page.
#[instrument(skip(state, store))]
pub async fn logout(
    State(state): State<AppState>,
    Profile(store): Profile,
) -> Result<Redirect, AppError> {
    SessionStub::new(&store, state.config().delays).logout()?;
    clear_sentry_user();
    let target = login_redirect(None);
    Ok(Redirect::to(&with_notice(&target, "You have been logged out.")))
}
