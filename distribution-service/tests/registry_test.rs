//! Entity registries: farms, buyers, partners, vehicles, catalogs.

mod common;

use common::{dec, dec_field};
use serde_json::{json, Value};

#[tokio::test]
async fn farm_update_never_touches_the_debt_balance() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let farm_id = app.create_farm("Before").await;

    let response = app
        .client
        .put(app.url(&format!("/farms/{}", farm_id)))
        .json(&json!({ "name": "After", "phone": "555-0101" }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "After");
    assert_eq!(body["phone"], "555-0101");
    assert_eq!(dec_field(&body, "total_debt"), dec("0"));
}

#[tokio::test]
async fn farm_with_transactions_cannot_be_deleted() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let operation_id = app.start_operation("2025-07-01").await;
    let farm_id = app.create_farm("Sticky").await;
    let chicken_type_id = app.create_chicken_type().await;

    let response = app
        .post_json(
            &format!("/operations/{}/purchases", operation_id),
            &json!({
                "farm_id": farm_id,
                "chicken_type_id": chicken_type_id,
                "empty_vehicle_weight": "0",
                "loaded_vehicle_weight": "100.00",
                "cage_count": 0,
                "cage_weight_per_unit": "0",
                "price_per_kg": "4.00"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .client
        .delete(app.url(&format!("/farms/{}", farm_id)))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 409);

    // A farm with no history deletes cleanly.
    let clean_id = app.create_farm("Clean").await;
    let response = app
        .client
        .delete(app.url(&format!("/farms/{}", clean_id)))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn partner_percentage_is_bounded() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let response = app
        .post_json(
            "/partners",
            &json!({ "name": "Overcommitted", "investment_percentage": "140" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .post_json(
            "/partners",
            &json!({ "name": "Measured", "investment_percentage": "35.50" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(dec_field(&body, "investment_percentage"), dec("35.50"));
    assert_eq!(body["is_vehicle_partner"], false);
}

#[tokio::test]
async fn duplicate_vehicle_plate_is_rejected() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let response = app
        .post_json("/vehicles", &json!({ "plate_number": "TN-01-XY-9999" }))
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .post_json("/vehicles", &json!({ "plate_number": "TN-01-XY-9999" }))
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn catalogs_list_what_was_created() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    app.create_chicken_type().await;
    app.create_cost_category(true).await;

    let response = app.get_json("/chicken-types").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app.get_json("/cost-categories").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let categories = body.as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["is_vehicle_cost"], true);
}
