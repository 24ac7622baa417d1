//! Standalone debt payments and debt histories.

mod common;

use common::{dec, dec_field};
use serde_json::{json, Value};
use uuid::Uuid;

async fn seed_farm_debt(app: &common::TestApp, farm_id: Uuid, date: &str) {
    let operation_id = app.start_operation(date).await;
    let chicken_type_id = app.create_chicken_type().await;
    let response = app
        .post_json(
            &format!("/operations/{}/purchases", operation_id),
            &json!({
                "farm_id": farm_id,
                "chicken_type_id": chicken_type_id,
                "empty_vehicle_weight": "0",
                "loaded_vehicle_weight": "300.00",
                "cage_count": 0,
                "cage_weight_per_unit": "0",
                "price_per_kg": "4.00",
                "paid_amount": "0"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn farm_payment_reduces_debt_and_overpayment_goes_negative() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let farm_id = app.create_farm("Hilltop").await;
    seed_farm_debt(&app, farm_id, "2025-05-01").await;

    let response = app.get_json(&format!("/farms/{}", farm_id)).await;
    let farm: Value = response.json().await.unwrap();
    assert_eq!(dec_field(&farm, "total_debt"), dec("1200.00"));

    let response = app
        .post_json(
            &format!("/farms/{}/payments", farm_id),
            &json!({ "amount": "500.00", "payment_date": "2025-05-02" }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app.get_json(&format!("/farms/{}", farm_id)).await;
    let farm: Value = response.json().await.unwrap();
    assert_eq!(dec_field(&farm, "total_debt"), dec("700.00"));

    // The balance is not floored; an advance payment goes negative.
    let response = app
        .post_json(
            &format!("/farms/{}/payments", farm_id),
            &json!({ "amount": "1500.00", "payment_date": "2025-05-03" }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app.get_json(&format!("/farms/{}", farm_id)).await;
    let farm: Value = response.json().await.unwrap();
    assert_eq!(dec_field(&farm, "total_debt"), dec("-800.00"));
}

#[tokio::test]
async fn non_positive_payment_amounts_are_rejected() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let farm_id = app.create_farm("Strict").await;

    for amount in ["0", "-25.00"] {
        let response = app
            .post_json(
                &format!("/farms/{}/payments", farm_id),
                &json!({ "amount": amount, "payment_date": "2025-05-04" }),
            )
            .await;
        assert_eq!(response.status(), 422);
    }
}

#[tokio::test]
async fn payment_to_unknown_entity_is_not_found() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let body = json!({ "amount": "100.00", "payment_date": "2025-05-05" });

    let response = app
        .post_json(&format!("/farms/{}/payments", Uuid::new_v4()), &body)
        .await;
    assert_eq!(response.status(), 404);

    let response = app
        .post_json(&format!("/buyers/{}/payments", Uuid::new_v4()), &body)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn buyer_payment_reduces_debt() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let operation_id = app.start_operation("2025-05-06").await;
    let buyer_id = app.create_buyer("Corner Shop").await;
    let chicken_type_id = app.create_chicken_type().await;

    let response = app
        .post_json(
            &format!("/operations/{}/sales", operation_id),
            &json!({
                "buyer_id": buyer_id,
                "chicken_type_id": chicken_type_id,
                "loaded_cages_weight": "200.00",
                "empty_cages_weight": "0",
                "cage_count": 5,
                "price_per_kg": "5.00",
                "paid_amount": "400.00"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .post_json(
            &format!("/buyers/{}/payments", buyer_id),
            &json!({ "amount": "250.00", "payment_date": "2025-05-07" }),
        )
        .await;
    assert_eq!(response.status(), 201);

    // 1000 - 400 paid at sale - 250 payment
    let response = app.get_json(&format!("/buyers/{}", buyer_id)).await;
    let buyer: Value = response.json().await.unwrap();
    assert_eq!(dec_field(&buyer, "total_debt"), dec("350.00"));
}

#[tokio::test]
async fn farm_debt_history_reconciles_transactions_and_payments() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let farm_id = app.create_farm("Ledgered").await;
    seed_farm_debt(&app, farm_id, "2025-05-08").await;

    let response = app
        .post_json(
            &format!("/farms/{}/payments", farm_id),
            &json!({ "amount": "450.00", "payment_date": "2025-05-09", "notes": "cash" }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app.get_json(&format!("/farms/{}/debt", farm_id)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    let history = &body["history"];
    assert_eq!(dec_field(history, "current_debt"), dec("750.00"));
    assert_eq!(dec_field(history, "total_transacted"), dec("1200.00"));
    assert_eq!(dec_field(history, "total_paid"), dec("450.00"));
    assert_eq!(history["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(history["payments"].as_array().unwrap().len(), 1);
}
