//! Snap page: photo upload, analysis result and reminder cards.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use tracing::instrument;
use uuid::Uuid;

use homecare_core::Task;

use super::{CurrentUser, MessageQuery, with_error, with_notice};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireSession;
use crate::services::analyses::PendingAnalysis;
use crate::services::classifier::{MAX_PHOTO_BYTES, PhotoUpload, UploadError};
use crate::services::reminders::{self, Reminders};
use crate::services::tasks::{TaskStore, default_due_date};
use crate::state::AppState;

/// Request body limit: the largest photo plus room for multipart framing.
pub const MAX_UPLOAD_BYTES: usize = MAX_PHOTO_BYTES + 64 * 1024;

/// Multipart field carrying the photo.
const PHOTO_FIELD: &str = "photo";

/// Recent AI-created tasks shown under the upload form.
const RECENT_LIMIT: usize = 5;

const PHOTO_TIPS: [&str; 4] = [
    "Take clear, well-lit photos for better detection",
    "Include context (surrounding area) in your shots",
    "Multiple angles help identify issues accurately",
    "Review AI suggestions before saving tasks",
];

const EXPIRED_MESSAGE: &str = "This analysis has expired. Please snap the photo again.";

/// Snap page template.
#[derive(Template, WebTemplate)]
#[template(path = "snap/index.html")]
pub struct SnapTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub reminders: Reminders,
    pub recent: Vec<Task>,
    pub tips: &'static [&'static str],
}

/// Analysis result template.
#[derive(Template, WebTemplate)]
#[template(path = "snap/analysis.html")]
pub struct AnalysisTemplate {
    pub user: CurrentUser,
    pub id: Uuid,
    pub pending: PendingAnalysis,
    pub due_date: NaiveDate,
}

/// Display the snap page.
#[instrument(skip(state, store, session, query))]
pub async fn index(
    State(state): State<AppState>,
    RequireSession { store, session }: RequireSession,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let tasks = TaskStore::new(&store).load(now)?;
    let reminders = reminders::build(&tasks, now, state.card_schedule());
    let recent = tasks
        .into_iter()
        .filter(|t| t.ai_generated)
        .take(RECENT_LIMIT)
        .collect();

    Ok(SnapTemplate {
        user: CurrentUser::from(&session),
        error: query.error,
        notice: query.notice,
        reminders,
        recent,
        tips: &PHOTO_TIPS,
    })
}

/// A body over the size limit is an upload rejection, anything else is a
/// malformed request.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge.into()
    } else {
        AppError::BadRequest(err.to_string())
    }
}

/// Read the `photo` part of an upload.
async fn read_photo(multipart: &mut Multipart) -> Result<PhotoUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(PhotoUpload::new(file_name, content_type, bytes.to_vec())?);
    }
    Err(UploadError::Empty.into())
}

/// Analyze an uploaded photo and show the result.
#[instrument(skip_all, fields(profile = %store.profile()))]
pub async fn analyze(
    State(state): State<AppState>,
    RequireSession { store, .. }: RequireSession,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let photo = match read_photo(&mut multipart).await {
        Ok(photo) => photo,
        Err(AppError::Upload(err)) => {
            tracing::warn!(error = %err, "Upload rejected");
            return Ok(Redirect::to(&with_error("/", &err.to_string())).into_response());
        }
        Err(err) => return Err(err),
    };

    let result = state.classifier().analyze(&photo).await;
    tracing::info!(
        issue = %result.issue,
        confidence = result.confidence,
        size = photo.bytes.len(),
        "Photo analyzed"
    );

    let id = state
        .analyses()
        .stash(PendingAnalysis {
            profile: store.profile().to_owned(),
            file_name: photo.file_name,
            result,
        })
        .await;
    Ok(Redirect::to(&format!("/snap/{id}")).into_response())
}

/// Display an analysis result.
#[instrument(skip(state, store, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireSession { store, session }: RequireSession,
    Path(id): Path<Uuid>,
) -> Response {
    match state.analyses().get(store.profile(), id).await {
        Some(pending) => AnalysisTemplate {
            user: CurrentUser::from(&session),
            id,
            pending,
            due_date: default_due_date(Utc::now()),
        }
        .into_response(),
        None => Redirect::to(&with_error("/", EXPIRED_MESSAGE)).into_response(),
    }
}

/// Save the suggested task.
#[instrument(skip(state, store))]
pub async fn accept(
    State(state): State<AppState>,
    RequireSession { store, .. }: RequireSession,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let Some(pending) = state.analyses().take(store.profile(), id).await else {
        return Ok(Redirect::to(&with_error("/", EXPIRED_MESSAGE)));
    };
    let task = TaskStore::new(&store).create_from_analysis(&pending.result, Utc::now())?;
    tracing::info!(task_id = %task.id, issue = %pending.result.issue, "Analysis accepted");
    Ok(Redirect::to(&with_notice(
        "/tasks",
        &format!("Task \"{}\" added to your list.", task.title),
    )))
}

/// Throw the suggestion away.
#[instrument(skip(state, store))]
pub async fn dismiss(
    State(state): State<AppState>,
    RequireSession { store, .. }: RequireSession,
    Path(id): Path<Uuid>,
) -> Redirect {
    if state.analyses().take(store.profile(), id).await.is_some() {
        tracing::info!("Analysis dismissed");
    }
    Redirect::to("/")
}
