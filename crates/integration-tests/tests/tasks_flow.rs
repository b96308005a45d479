//! Task list, filters, sorting, creation and status changes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use homecare_integration_tests::TestApp;

async fn signed_in() -> TestApp {
    let mut app = TestApp::new();
    app.login("sam@example.com").await;
    app
}

#[tokio::test]
async fn test_new_profile_is_seeded() {
    let mut app = signed_in().await;
    let resp = app.get("/tasks").await;
    assert_eq!(resp.status, StatusCode::OK);
    for title in ["Replace HVAC Filter", "Clean Gutters", "Check Smoke Detectors"] {
        assert!(resp.body.contains(title), "{title}");
    }
    assert!(resp.body.contains("By Type"));
    assert!(resp.body.contains("By Area"));
}

#[tokio::test]
async fn test_search_and_status_filter() {
    let mut app = signed_in().await;

    let resp = app.get("/tasks?search=GUTTER").await;
    assert!(resp.body.contains("Clean Gutters"));
    assert!(!resp.body.contains("Replace HVAC Filter"));

    let resp = app.get("/tasks?status=completed").await;
    assert!(resp.body.contains("Check Smoke Detectors"));
    assert!(!resp.body.contains("Clean Gutters"));
}

#[tokio::test]
async fn test_malformed_query_is_ignored() {
    let mut app = signed_in().await;
    let resp = app.get("/tasks?status=someday&sort=colour&offset=99").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Clean Gutters"));

    let resp = app.get("/tasks?offset=abc&per_view=-2").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Clean Gutters"));
}

#[tokio::test]
async fn test_facet_filter() {
    let mut app = signed_in().await;
    let resp = app.get("/tasks?facet=category&value=safety").await;
    assert!(resp.body.contains("Check Smoke Detectors"));
    assert!(!resp.body.contains("Clean Gutters"));
}

#[tokio::test]
async fn test_sort_by_cost_descending() {
    let mut app = signed_in().await;
    let body = app.get("/tasks?sort=cost&dir=desc").await.body;
    let gutters = body.find("Clean Gutters").unwrap();
    let filter = body.find("Replace HVAC Filter").unwrap();
    let detectors = body.find("Check Smoke Detectors").unwrap();
    assert!(gutters < filter && filter < detectors);
}

#[tokio::test]
async fn test_create_task() {
    let mut app = signed_in().await;

    let form = app.get("/tasks/new?template=gutter_cleaning").await;
    assert_eq!(form.status, StatusCode::OK);

    let resp = app
        .post_form(
            "/tasks",
            &[
                ("title", "Seal driveway"),
                ("description", "Fill cracks before winter"),
                ("category", "structural"),
                ("priority", "high"),
                ("room", "exterior"),
                ("due_date", "2099-05-01"),
                ("assignee", ""),
                ("cost", "$120"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(
        resp.location_param("notice").as_deref(),
        Some("Task \"Seal driveway\" created.")
    );

    let list = app.get("/tasks?search=driveway").await;
    assert!(list.body.contains("Seal driveway"));
    assert!(list.body.contains("$120"));
    assert!(list.body.contains("May 1, 2099"));
}

#[tokio::test]
async fn test_create_task_validation() {
    let mut app = signed_in().await;

    let resp = app.post_form("/tasks", &[("title", "  ")]).await;
    assert!(resp.location().unwrap().starts_with("/tasks/new"));
    assert_eq!(
        resp.location_param("error").as_deref(),
        Some("Task title is required.")
    );

    let resp = app
        .post_form("/tasks", &[("title", "Paint"), ("due_date", "soon")])
        .await;
    assert_eq!(
        resp.location_param("error").as_deref(),
        Some("Please enter a valid due date.")
    );

    let resp = app
        .post_form(
            "/tasks",
            &[("title", "Gold roof"), ("cost", "79228162514264337593543950335")],
        )
        .await;
    assert_eq!(
        resp.location_param("error").as_deref(),
        Some("Invalid cost: cost cannot exceed $1,000,000,000.")
    );
    assert!(!app.get("/tasks").await.body.contains("Gold roof"));
}

#[tokio::test]
async fn test_status_change_and_delete() {
    let mut app = signed_in().await;

    let resp = app
        .post_form(
            "/tasks/2/status",
            &[("status", "completed"), ("back", "/tasks?status=completed")],
        )
        .await;
    assert_eq!(resp.location(), Some("/tasks?status=completed"));
    assert!(app.get("/tasks?status=completed").await.body.contains("Clean Gutters"));

    let resp = app.post_form("/tasks/2/delete", &[]).await;
    assert_eq!(
        resp.location_param("notice").as_deref(),
        Some("Task \"Clean Gutters\" deleted.")
    );
    assert!(!app.get("/tasks").await.body.contains("Clean Gutters"));
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let mut app = signed_in().await;
    let resp = app.post_form("/tasks/424242/delete", &[]).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .post_form("/tasks/1/status", &[("status", "finished")])
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reminders_api() {
    let mut app = signed_in().await;
    let resp = app.get("/api/reminders").await;
    assert_eq!(resp.status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    let cards = json["cards"].as_array().unwrap();
    // The seeded pending and in-progress tasks are long past due.
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["urgency"], "overdue");
    assert_eq!(cards[0]["title"], "Replace HVAC Filter");
    assert_eq!(cards[1]["appear_at_ms"], 500);
}
