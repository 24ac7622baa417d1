//! Concurrent recorders against one operation: sequence numbers stay dense
//! and nothing lands on a closed operation.

mod common;

use common::{dec, dec_field};
use serde_json::{json, Value};
use uuid::Uuid;

fn purchase_body(farm_id: Uuid, chicken_type_id: Uuid) -> Value {
    // 100 kg at 4/kg, nothing paid: each recorded purchase adds 400 debt.
    json!({
        "farm_id": farm_id,
        "chicken_type_id": chicken_type_id,
        "empty_vehicle_weight": "0",
        "loaded_vehicle_weight": "100.00",
        "cage_count": 0,
        "cage_weight_per_unit": "0",
        "price_per_kg": "4.00",
        "paid_amount": "0"
    })
}

#[tokio::test]
async fn concurrent_purchases_get_dense_sequence_numbers() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let operation_id = app.start_operation("2025-08-01").await;
    let farm_id = app.create_farm("Contended").await;
    let chicken_type_id = app.create_chicken_type().await;

    const N: usize = 8;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let client = app.client.clone();
        let url = app.url(&format!("/operations/{}/purchases", operation_id));
        let body = purchase_body(farm_id, chicken_type_id);
        handles.push(tokio::spawn(async move {
            let response = client
                .post(url)
                .json(&body)
                .send()
                .await
                .expect("Request failed");
            assert_eq!(response.status(), 201);
            let body: Value = response.json().await.unwrap();
            body["sequence_number"].as_i64().unwrap()
        }));
    }

    let mut sequence_numbers = Vec::with_capacity(N);
    for handle in handles {
        sequence_numbers.push(handle.await.expect("Task panicked"));
    }
    sequence_numbers.sort_unstable();

    // Exactly 1..N, no gaps, no duplicates.
    assert_eq!(sequence_numbers, (1..=N as i64).collect::<Vec<_>>());

    // Every debt delta survived too.
    let response = app.get_json(&format!("/farms/{}", farm_id)).await;
    let farm: Value = response.json().await.unwrap();
    assert_eq!(
        dec_field(&farm, "total_debt"),
        dec("400.00") * rust_decimal::Decimal::from(N as i64)
    );
}

#[tokio::test]
async fn close_racing_recorders_leaves_no_transaction_on_a_closed_operation() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    app.create_partner("Racer", "100", false).await;
    let operation_id = app.start_operation("2025-08-02").await;
    let farm_id = app.create_farm("Photo Finish").await;
    let chicken_type_id = app.create_chicken_type().await;

    const N: usize = 6;
    let mut recorders = Vec::with_capacity(N);
    for _ in 0..N {
        let client = app.client.clone();
        let url = app.url(&format!("/operations/{}/purchases", operation_id));
        let body = purchase_body(farm_id, chicken_type_id);
        recorders.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&body)
                .send()
                .await
                .expect("Request failed")
                .status()
                .as_u16()
        }));
    }

    let close_client = app.client.clone();
    let close_url = app.url(&format!("/operations/{}/close", operation_id));
    let closer = tokio::spawn(async move {
        close_client
            .post(close_url)
            .json(&json!({}))
            .send()
            .await
            .expect("Request failed")
            .status()
            .as_u16()
    });

    let mut recorded = 0u32;
    for handle in recorders {
        match handle.await.expect("Task panicked") {
            201 => recorded += 1,
            409 => {} // Lost the race to the close.
            status => panic!("Unexpected recorder status {}", status),
        }
    }
    assert_eq!(closer.await.expect("Task panicked"), 200);

    let response = app.get_json(&format!("/operations/{}", operation_id)).await;
    let detail: Value = response.json().await.unwrap();
    assert_eq!(detail["operation"]["status"], "closed");

    // Exactly the accepted recordings exist, densely sequenced, and the
    // close aggregated every one of them.
    let transactions = detail["farm_transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), recorded as usize);
    let mut sequence_numbers: Vec<i64> = transactions
        .iter()
        .map(|t| t["sequence_number"].as_i64().unwrap())
        .collect();
    sequence_numbers.sort_unstable();
    assert_eq!(sequence_numbers, (1..=recorded as i64).collect::<Vec<_>>());

    let expected_purchases = dec("400.00") * rust_decimal::Decimal::from(recorded);
    assert_eq!(
        dec_field(&detail["distribution"]["distribution"], "total_purchases"),
        expected_purchases
    );

    let response = app.get_json(&format!("/farms/{}", farm_id)).await;
    let farm: Value = response.json().await.unwrap();
    assert_eq!(dec_field(&farm, "total_debt"), expected_purchases);
}
