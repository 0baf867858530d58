mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;
use common::{acquire_db_lock, json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn bills_move_from_pending_to_paid() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let client = app.seed_client("Olga Owens", "olga@firm.test", "client-pass").await?;
    let other = app.seed_client("Pat Price", "pat@firm.test", "client-pass").await?;
    let member = app.seed_staff("Quinn Quill", "quinn@firm.test", "staff-pass").await?;
    let case_id = app
        .seed_case("Owens contract", "ACTIVE", &[client.clone()], &[member])
        .await?;

    let response = app
        .post_json(
            "/api/admin/billing",
            &json!({
                "client_id": client,
                "case_id": case_id,
                "amount_cents": 125_000,
                "due_date": "2025-06-30",
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let bill = json_body(response).await?;
    assert_eq!(bill["status"], "Pending");
    let billing_id = bill["billing_id"].as_str().unwrap_or_default().to_string();

    let response = app
        .post_json(
            "/api/admin/billing",
            &json!({
                "client_id": other,
                "case_id": case_id,
                "amount_cents": 10,
                "due_date": "2025-06-30",
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/admin/dashboard", Some(&admin)).await?;
    let dashboard = json_body(response).await?;
    assert_eq!(dashboard["pending_bills"], 1);
    assert_eq!(dashboard["paid_bills"], 0);

    let response = app
        .patch_json(
            &format!("/api/admin/billing/{billing_id}"),
            &json!({ "status": "paid", "payment_date": "2025-06-01", "payment_mode": "Card" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let paid = json_body(response).await?;
    assert_eq!(paid["status"], "Paid");
    assert_eq!(paid["payment_mode"], "Card");

    let response = app
        .get(&format!("/api/admin/billing/{billing_id}"), Some(&admin))
        .await?;
    let detail = json_body(response).await?;
    assert_eq!(detail["client"]["name"], "Olga Owens");
    assert_eq!(detail["case"]["title"], "Owens contract");

    let client_token = app.signin_token("olga@firm.test", "client-pass").await?;
    let response = app.get("/api/client/bills_payment", Some(&client_token)).await?;
    let bills = json_body(response).await?;
    assert_eq!(bills[0]["amount_cents"], 125_000);
    assert_eq!(bills[0]["case"]["case_id"], case_id.as_str());

    let other_token = app.signin_token("pat@firm.test", "client-pass").await?;
    let response = app.get("/api/client/bills_payment", Some(&other_token)).await?;
    assert_eq!(json_body(response).await?, json!([]));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn expenses_are_recorded_against_staff() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let member = app.seed_staff("Rae Ross", "rae@firm.test", "staff-pass").await?;
    app.seed_staff("Sid Shaw", "sid@firm.test", "staff-pass").await?;

    let response = app
        .post_json(
            "/api/admin/expences",
            &json!({
                "paid_by": member,
                "description": "Court filing fee",
                "amount_cents": 35_000,
                "expense_date": "2025-02-14",
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let expense_id = json_body(response).await?["expense_id"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let response = app
        .post_json(
            "/api/admin/expences",
            &json!({
                "paid_by": "nobody",
                "description": "Taxi",
                "amount_cents": 1_200,
                "expense_date": "2025-02-14",
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get(&format!("/api/admin/expences/{expense_id}"), Some(&admin))
        .await?;
    assert_eq!(json_body(response).await?["staff_name"], "Rae Ross");

    let rae = app.signin_token("rae@firm.test", "staff-pass").await?;
    let response = app.get("/api/staff/expences", Some(&rae)).await?;
    assert_eq!(json_body(response).await?.as_array().map(Vec::len), Some(1));

    let sid = app.signin_token("sid@firm.test", "staff-pass").await?;
    let response = app.get("/api/staff/expences", Some(&sid)).await?;
    assert_eq!(json_body(response).await?, json!([]));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn dashboards_summarize_today() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin@firm.test", "admin-pass", "ADMIN").await?;
    let admin = app.signin_token("admin@firm.test", "admin-pass").await?;
    let first = app.seed_client("Uma Upton", "uma@firm.test", "client-pass").await?;
    let second = app.seed_client("Vic Vance", "vic@firm.test", "client-pass").await?;
    let member = app.seed_staff("Wes West", "wes@firm.test", "staff-pass").await?;
    let case_id = app
        .seed_case(
            "Upton and Vance",
            "ACTIVE",
            &[first.clone(), second.clone()],
            &[member.clone()],
        )
        .await?;
    app.seed_case("Closed matter", "CLOSED", &[first.clone()], &[member.clone()])
        .await?;

    let response = app
        .post_json(
            &format!("/api/admin/case/{case_id}/documents"),
            &json!({ "title": "Retainer", "doc_type": "Agreement" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let now = Utc::now().to_rfc3339();
    let response = app
        .post_json(
            "/api/admin/appointments/add",
            &json!({
                "purpose": "Status call",
                "location": "Phone",
                "appointment_date": now,
                "case_id": case_id,
                "clients": [first],
                "staff": [member],
            }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.get("/api/admin/dashboard", Some(&admin)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = json_body(response).await?;
    assert_eq!(dashboard["appointments_today"], 1);
    assert_eq!(dashboard["active_cases"], 1);
    assert_eq!(dashboard["staff_count"], 1);
    assert_eq!(dashboard["client_count"], 2);
    assert_eq!(dashboard["today_appointments"][0]["clients"], json!(["Uma Upton"]));
    assert_eq!(dashboard["today_appointments"][0]["staff"], json!(["Wes West"]));
    assert_eq!(dashboard["active_cases_list"][0]["title"], "Upton and Vance");

    let wes = app.signin_token("wes@firm.test", "staff-pass").await?;
    let response = app.get("/api/staff/dashboard", Some(&wes)).await?;
    let staff_view = json_body(response).await?;
    assert_eq!(staff_view["appointment_count"], 1);
    assert_eq!(staff_view["client_count"], 2);
    assert_eq!(staff_view["cases"].as_array().map(Vec::len), Some(2));
    assert_eq!(staff_view["today_appointments"][0]["purpose"], "Status call");

    let response = app.get("/api/staff/documents", Some(&wes)).await?;
    let documents = json_body(response).await?;
    assert_eq!(documents[0]["title"], "Retainer");
    assert_eq!(documents[0]["case"]["case_id"], case_id.as_str());

    let response = app.get("/api/staff/appointments", Some(&wes)).await?;
    assert_eq!(json_body(response).await?[0]["clients"][0]["name"], "Uma Upton");

    let uma = app.signin_token("uma@firm.test", "client-pass").await?;
    let response = app.get("/api/client/dashboard", Some(&uma)).await?;
    let client_view = json_body(response).await?;
    assert_eq!(client_view["name"], "Uma Upton");
    assert_eq!(client_view["cases"].as_array().map(Vec::len), Some(2));
    assert_eq!(client_view["appointments"][0]["case"]["title"], "Upton and Vance");

    app.cleanup().await?;
    Ok(())
}
