mod common;

#[tokio::test]
async fn health_and_metrics_endpoints_respond() {
    let Some(app) = common::TestApp::try_spawn().await else {
        eprintln!("Test database not reachable; skipping");
        return;
    };

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "distribution-service");

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 200);
}
