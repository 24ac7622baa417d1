//! Daily operation lifecycle: start, one-per-date, lookup, close, re-close.

mod common;

use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn starting_an_operation_returns_open_state() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let vehicle_id = app.create_vehicle().await;
    let response = app
        .post_json(
            "/operations",
            &json!({
                "operation_date": "2025-03-10",
                "vehicle_id": vehicle_id,
                "created_by": Uuid::new_v4()
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "open");
    assert_eq!(body["operation_date"], "2025-03-10");
    assert!(body["closed_utc"].is_null());
}

#[tokio::test]
async fn second_operation_on_same_date_is_rejected() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    app.start_operation("2025-03-11").await;

    let vehicle_id = app.create_vehicle().await;
    let response = app
        .post_json(
            "/operations",
            &json!({
                "operation_date": "2025-03-11",
                "vehicle_id": vehicle_id,
                "created_by": Uuid::new_v4()
            }),
        )
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn operation_is_retrievable_by_id_and_date() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let operation_id = app.start_operation("2025-03-12").await;

    let response = app.get_json(&format!("/operations/{}", operation_id)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        common::id_field(&body["operation"], "operation_id"),
        operation_id
    );
    assert!(body["farm_transactions"].as_array().unwrap().is_empty());
    assert!(body["distribution"].is_null());

    let response = app.get_json("/operations/by-date/2025-03-12").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        common::id_field(&body["operation"], "operation_id"),
        operation_id
    );
}

#[tokio::test]
async fn unknown_operation_returns_not_found() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let response = app.get_json(&format!("/operations/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), 404);

    let response = app
        .post_json(&format!("/operations/{}/close", Uuid::new_v4()), &json!({}))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn closing_an_empty_operation_distributes_zero() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    app.create_partner("Sole Partner", "100", false).await;
    let operation_id = app.start_operation("2025-03-13").await;

    let response = app
        .post_json(&format!("/operations/{}/close", operation_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    let distribution = &body["distribution"];
    assert_eq!(common::dec_field(distribution, "total_revenue"), common::dec("0"));
    assert_eq!(common::dec_field(distribution, "net_profit"), common::dec("0"));

    let shares = body["partner_shares"].as_array().unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(
        common::dec_field(&shares[0], "final_profit"),
        common::dec("0")
    );

    // Status flipped and the close timestamp is recorded.
    let response = app.get_json(&format!("/operations/{}", operation_id)).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["operation"]["status"], "closed");
    assert!(!body["operation"]["closed_utc"].is_null());
}

#[tokio::test]
async fn closing_twice_is_rejected() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let operation_id = app.start_operation("2025-03-14").await;

    let response = app
        .post_json(&format!("/operations/{}/close", operation_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .post_json(&format!("/operations/{}/close", operation_id), &json!({}))
        .await;
    assert_eq!(response.status(), 409);
}
