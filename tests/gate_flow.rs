mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use common::{acquire_db_lock, TestApp};

fn location(response: &hyper::Response<axum::body::Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_sign_in() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let response = app.get("/", None).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/api/auth/signin"));

    let response = app.get("/admin/dashboard", None).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/api/auth/signin"));

    let response = app.get("/api/health", None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn fall_through_policy_only_redirects_root() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::with_gate_policy(false).await?;

    let response = app.get("/", None).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let response = app.get("/client/dashboard", None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(location(&response).is_none());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn signed_in_roles_land_on_their_dashboard() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    app.seed_staff("Sam Staff", "sam@firm.test", "staff-pass").await?;
    app.seed_client("Cleo Client", "cleo@firm.test", "client-pass")
        .await?;

    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let staff = app.signin_token("sam@firm.test", "staff-pass").await?;
    let client = app.signin_token("cleo@firm.test", "client-pass").await?;

    let response = app.get_with_cookie("/", &staff).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/staff/dashboard"));

    let response = app.get_with_cookie("/admin/dashboard", &staff).await?;
    assert_eq!(location(&response), Some("/staff/dashboard"));

    let response = app.get_with_cookie("/staff/cases", &client).await?;
    assert_eq!(location(&response), Some("/client/dashboard"));

    let response = app.get("/", Some(&admin)).await?;
    assert_eq!(location(&response), Some("/admin/dashboard"));

    // Allowed page paths reach the router, which serves no pages.
    let response = app.get_with_cookie("/admin/clients/42", &admin).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(location(&response).is_none());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn forged_tokens_count_as_anonymous() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let response = app.get_with_cookie("/staff/dashboard", "forged.token.value").await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/api/auth/signin"));

    app.cleanup().await?;
    Ok(())
}
