//! JSON endpoints.

use axum::{Json, extract::State};
use chrono::Utc;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireSession;
use crate::services::reminders::{self, Reminders};
use crate::services::tasks::TaskStore;
use crate::state::AppState;

/// Reminder cards with their timelines, for clients that animate them
/// themselves.
#[instrument(skip(state, store))]
pub async fn reminders(
    State(state): State<AppState>,
    RequireSession { store, .. }: RequireSession,
) -> Result<Json<Reminders>, AppError> {
    let now = Utc::now();
    let tasks = TaskStore::new(&store).load(now)?;
    Ok(Json(reminders::build(&tasks, now, state.card_schedule())))
}
