//! User registry pages.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use homecare_integration_tests::TestApp;

async fn admin() -> TestApp {
    let mut app = TestApp::new();
    assert_eq!(app.login_admin().await.location(), Some("/admin"));
    app
}

#[tokio::test]
async fn test_admin_page_lists_seeded_users() {
    let mut app = admin().await;
    let resp = app.get("/admin").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("admin@homecare.app"));
    assert!(resp.body.contains("demo@homecare.app"));
    assert!(resp.body.contains("guest@homecare.app"));
    assert!(resp.body.contains("Jan 20, 2024"));

    let filtered = app.get("/admin?search=GUEST").await;
    assert!(filtered.body.contains("guest@homecare.app"));
    assert!(!filtered.body.contains("demo@homecare.app"));
}

#[tokio::test]
async fn test_create_user() {
    let mut app = admin().await;
    let fields = [
        ("email", "kim@example.com"),
        ("name", "Kim Park"),
        ("role", "admin"),
        ("password", "secret1"),
        ("confirm_password", "secret1"),
    ];

    let resp = app.post_form("/admin/users", &fields).await;
    assert_eq!(
        resp.location_param("notice").as_deref(),
        Some("User kim@example.com created.")
    );
    assert!(app.get("/admin").await.body.contains("Kim Park"));

    let dup = app.post_form("/admin/users", &fields).await;
    assert_eq!(
        dup.location_param("error").as_deref(),
        Some("User with this email already exists!")
    );
}

#[tokio::test]
async fn test_create_user_password_mismatch() {
    let mut app = admin().await;
    let resp = app
        .post_form(
            "/admin/users",
            &[
                ("email", "kim@example.com"),
                ("name", "Kim Park"),
                ("password", "secret1"),
                ("confirm_password", "secret9"),
            ],
        )
        .await;
    assert_eq!(
        resp.location_param("error").as_deref(),
        Some("Passwords do not match!")
    );
    assert!(!app.get("/admin").await.body.contains("Kim Park"));
}

#[tokio::test]
async fn test_toggle_and_delete() {
    let mut app = admin().await;

    let resp = app.post_form("/admin/users/2/toggle", &[]).await;
    assert_eq!(
        resp.location_param("notice").as_deref(),
        Some("demo@homecare.app is now disabled.")
    );

    let resp = app.post_form("/admin/users/2/delete", &[]).await;
    assert_eq!(
        resp.location_param("notice").as_deref(),
        Some("User demo@homecare.app deleted.")
    );
    assert!(!app.get("/admin").await.body.contains("demo@homecare.app"));
}

#[tokio::test]
async fn test_admin_cannot_be_deleted() {
    let mut app = admin().await;
    let resp = app.post_form("/admin/users/1/delete", &[]).await;
    assert_eq!(
        resp.location_param("error").as_deref(),
        Some("Administrator accounts cannot be deleted.")
    );
    assert!(app.get("/admin").await.body.contains("admin@homecare.app"));
}

#[tokio::test]
async fn test_reset_password() {
    let mut app = admin().await;

    let page = app.get("/admin/users/3/reset-password").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("guest@homecare.app"));

    let resp = app
        .post_form(
            "/admin/users/3/reset-password",
            &[("new_password", "abc123"), ("confirm_password", "abc124")],
        )
        .await;
    assert!(
        resp.location()
            .unwrap()
            .starts_with("/admin/users/3/reset-password?error=")
    );

    let resp = app
        .post_form(
            "/admin/users/3/reset-password",
            &[("new_password", "abc123"), ("confirm_password", "abc123")],
        )
        .await;
    assert_eq!(
        resp.location_param("notice").as_deref(),
        Some("Password reset for guest@homecare.app has been completed.")
    );
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let mut app = admin().await;
    let resp = app.get("/admin/users/99/reset-password").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
