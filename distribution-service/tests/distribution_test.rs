//! Close-time profit distribution and the reports built on top of it.

mod common;

use common::{dec, dec_field, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

/// Seed a full day: purchases 4000, revenue 8000, losses 200, vehicle costs
/// 500, other costs 300. Net profit is 3000.
async fn seed_full_day(app: &TestApp, date: &str) -> Uuid {
    let operation_id = app.start_operation(date).await;
    let farm_id = app.create_farm(&format!("Farm {}", date)).await;
    let buyer_id = app.create_buyer(&format!("Buyer {}", date)).await;
    let chicken_type_id = app.create_chicken_type().await;
    let vehicle_category = app.create_cost_category(true).await;
    let other_category = app.create_cost_category(false).await;

    // 800 kg at 5/kg = 4000
    let response = app
        .post_json(
            &format!("/operations/{}/purchases", operation_id),
            &json!({
                "farm_id": farm_id,
                "chicken_type_id": chicken_type_id,
                "empty_vehicle_weight": "200.00",
                "loaded_vehicle_weight": "1000.00",
                "cage_count": 0,
                "cage_weight_per_unit": "0",
                "price_per_kg": "5.00",
                "paid_amount": "4000.00"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    // 800 kg at 10/kg = 8000
    let response = app
        .post_json(
            &format!("/operations/{}/sales", operation_id),
            &json!({
                "buyer_id": buyer_id,
                "chicken_type_id": chicken_type_id,
                "loaded_cages_weight": "850.00",
                "empty_cages_weight": "50.00",
                "cage_count": 20,
                "price_per_kg": "10.00",
                "paid_amount": "8000.00"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    // 40 kg at 5/kg = 200
    let response = app
        .post_json(
            &format!("/operations/{}/losses", operation_id),
            &json!({
                "chicken_type_id": chicken_type_id,
                "dead_weight": "40.00",
                "price_per_kg": "5.00"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    for (category, amount) in [(vehicle_category, "500.00"), (other_category, "300.00")] {
        let response = app
            .post_json(
                &format!("/operations/{}/costs", operation_id),
                &json!({ "cost_category_id": category, "amount": amount }),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    operation_id
}

#[tokio::test]
async fn close_distributes_profit_with_vehicle_cost_deduction() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    // Partner A funds 40% and does not co-own the vehicle; Partner B funds
    // 60% and does.
    app.create_partner("Partner A", "40", false).await;
    app.create_partner("Partner B", "60", true).await;

    let operation_id = seed_full_day(&app, "2025-06-01").await;

    let response = app
        .post_json(&format!("/operations/{}/close", operation_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    let distribution = &body["distribution"];
    assert_eq!(dec_field(distribution, "total_revenue"), dec("8000.00"));
    assert_eq!(dec_field(distribution, "total_purchases"), dec("4000.00"));
    assert_eq!(dec_field(distribution, "total_losses"), dec("200.00"));
    assert_eq!(dec_field(distribution, "total_costs"), dec("800.00"));
    assert_eq!(dec_field(distribution, "vehicle_costs"), dec("500.00"));
    assert_eq!(dec_field(distribution, "net_profit"), dec("3000.00"));
    assert_eq!(dec_field(&body, "other_costs"), dec("300.00"));

    let shares = body["partner_shares"].as_array().unwrap();
    assert_eq!(shares.len(), 2);

    // Ordered by partner name.
    assert_eq!(shares[0]["partner_name"], "Partner A");
    assert_eq!(dec_field(&shares[0], "base_profit_share"), dec("1200.00"));
    assert_eq!(dec_field(&shares[0], "vehicle_cost_share"), dec("200.00"));
    assert_eq!(dec_field(&shares[0], "final_profit"), dec("1000.00"));

    assert_eq!(shares[1]["partner_name"], "Partner B");
    assert_eq!(dec_field(&shares[1], "base_profit_share"), dec("1800.00"));
    assert_eq!(dec_field(&shares[1], "vehicle_cost_share"), dec("0"));
    assert_eq!(dec_field(&shares[1], "final_profit"), dec("1800.00"));

    // The distribution is persisted on the operation detail.
    let response = app.get_json(&format!("/operations/{}", operation_id)).await;
    let detail: Value = response.json().await.unwrap();
    assert_eq!(
        dec_field(&detail["distribution"]["distribution"], "net_profit"),
        dec("3000.00")
    );
}

#[tokio::test]
async fn daily_report_totals_each_section() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    app.create_partner("Reporter", "100", false).await;
    seed_full_day(&app, "2025-06-02").await;

    let response = app.get_json("/reports/daily/2025-06-02").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(dec_field(&body, "purchase_total"), dec("4000.00"));
    assert_eq!(dec_field(&body, "sale_total"), dec("8000.00"));
    assert_eq!(dec_field(&body, "loss_total"), dec("200.00"));
    assert_eq!(dec_field(&body, "cost_total"), dec("800.00"));

    let response = app.get_json("/reports/daily/2025-06-03").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn period_report_aggregates_closed_days_per_partner() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    app.create_partner("Partner A", "40", false).await;
    app.create_partner("Partner B", "60", true).await;

    for date in ["2025-06-10", "2025-06-11"] {
        let operation_id = seed_full_day(&app, date).await;
        let response = app
            .post_json(&format!("/operations/{}/close", operation_id), &json!({}))
            .await;
        assert_eq!(response.status(), 200);
    }

    // A third day stays open and must not be counted.
    seed_full_day(&app, "2025-06-12").await;

    let response = app
        .get_json("/reports/profit?from_date=2025-06-10&to_date=2025-06-12")
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["operations_closed"], 2);
    let totals = &body["totals"];
    assert_eq!(dec_field(totals, "total_revenue"), dec("16000.00"));
    assert_eq!(dec_field(totals, "net_profit"), dec("6000.00"));
    assert_eq!(dec_field(totals, "vehicle_costs"), dec("1000.00"));

    let partner_totals = body["partner_totals"].as_array().unwrap();
    assert_eq!(partner_totals.len(), 2);
    assert_eq!(partner_totals[0]["partner_name"], "Partner A");
    assert_eq!(
        dec_field(&partner_totals[0], "total_final_profit"),
        dec("2000.00")
    );
    assert_eq!(partner_totals[1]["partner_name"], "Partner B");
    assert_eq!(
        dec_field(&partner_totals[1], "total_final_profit"),
        dec("3600.00")
    );

    let response = app
        .get_json("/reports/profit?from_date=2025-06-12&to_date=2025-06-10")
        .await;
    assert_eq!(response.status(), 400);
}
