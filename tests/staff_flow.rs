mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn staff_accounts_are_created_and_updated() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;

    let response = app
        .post_json(
            "/api/admin/staff",
            &json!({
                "name": "Hana Hale",
                "experience": 12,
                "phone_no": "555-0111",
                "bar_number": "NY-778812",
                "address": "14 Pine Street",
                "specialisation": "Family law",
                "s_role": "Partner",
                "designation": "Managing Partner",
                "email": "hana@firm.test",
                "password": "partner-pass",
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await?;
    assert_eq!(created["status"], "working");
    let staff_id = created["staff_id"].as_str().unwrap_or_default().to_string();

    let staff_token = app.signin_token("hana@firm.test", "partner-pass").await?;
    let response = app.get("/api/staff/dashboard", Some(&staff_token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = json_body(response).await?;
    assert_eq!(dashboard["staff"]["name"], "Hana Hale");
    assert_eq!(dashboard["appointment_count"], 0);

    let response = app
        .patch_json(
            &format!("/api/admin/staff/{staff_id}"),
            &json!({ "experience": 13, "designation": "Senior Partner" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await?;
    assert_eq!(updated["experience"], 13);
    assert_eq!(updated["designation"], "Senior Partner");

    let response = app
        .patch_json(
            &format!("/api/admin/staff/{staff_id}"),
            &json!({ "experience": -1 }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/admin/staff", Some(&admin)).await?;
    assert_eq!(json_body(response).await?.as_array().map(Vec::len), Some(1));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn removing_staff_reassigns_their_client_work() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let client = app.seed_client("Ian Irwin", "ian@firm.test", "client-pass").await?;
    let leaving = app.seed_staff("Liv Leaving", "liv@firm.test", "staff-pass").await?;
    let taking_over = app.seed_staff("Tom Taker", "tom@firm.test", "staff-pass").await?;
    let case_id = app
        .seed_case("Irwin estate", "ACTIVE", &[client.clone()], &[leaving.clone()])
        .await?;

    let response = app
        .post_json(
            "/api/admin/staff/delete",
            &json!({
                "staffId": leaving,
                "action": "reassign",
                "newStaffId": taking_over,
                "clientId": client,
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["success"], true);

    assert_eq!(
        app.count(&format!(
            "SELECT count(*) AS n FROM staff_cases WHERE case_id = '{case_id}' AND staff_id = '{taking_over}'"
        ))
        .await?,
        1
    );

    let response = app
        .get(&format!("/api/admin/staff/{leaving}"), Some(&admin))
        .await?;
    let profile = json_body(response).await?;
    assert_eq!(profile["status"], "not working");
    assert_eq!(profile["cases"], json!([]));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn removing_staff_can_archive_the_client() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let client = app.seed_client("Jo Jones", "jo@firm.test", "client-pass").await?;
    let member = app.seed_staff("Kim Keeper", "kim@firm.test", "staff-pass").await?;
    app.seed_case("Jones lease", "ACTIVE", &[client.clone()], &[member.clone()])
        .await?;

    let response = app
        .post_json(
            "/api/admin/staff/delete",
            &json!({ "staffId": member, "action": "past client", "clientId": client }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get(&format!("/api/admin/client/{client}"), Some(&admin))
        .await?;
    assert_eq!(json_body(response).await?["status"], "PAST CLIENT");

    // Case links are kept, so the staff member is still working.
    let response = app
        .get(&format!("/api/admin/staff/{member}"), Some(&admin))
        .await?;
    assert_eq!(json_body(response).await?["status"], "working");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn staff_removal_requests_are_validated() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let member = app.seed_staff("Ned North", "ned@firm.test", "staff-pass").await?;

    let response = app
        .post_json(
            "/api/admin/staff/delete",
            &json!({ "staffId": member, "action": "reassign" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/admin/staff/delete",
            &json!({ "staffId": member, "action": "fire", "clientId": "c-1" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/admin/staff/delete",
            &json!({ "staffId": member, "action": "reassign", "clientId": "c-1" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/admin/staff/delete",
            &json!({ "staffId": "ghost", "action": "past client", "clientId": "c-1" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}
