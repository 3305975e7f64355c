use farm_acreage::core::PredictionApi;
use farm_acreage::inference::{FarmData, SoilData};
use farm_acreage::{AreaUnit, InferenceSettings, PredictionClient};
use httpmock::prelude::*;
use std::time::Duration;

fn client_for(server: &MockServer, max_attempts: u32) -> PredictionClient {
    let settings = InferenceSettings::new("test-token")
        .with_base_url(server.base_url())
        .with_poll(Duration::from_millis(5), max_attempts);
    PredictionClient::new(settings)
}

fn soil() -> SoilData {
    SoilData {
        ph: Some(6.8),
        moisture: Some("moderate".to_string()),
        nutrients: None,
        area: 12.5,
        unit: AreaUnit::Hectares,
    }
}

#[tokio::test]
async fn test_analyze_soil_succeeds_with_joined_output() {
    let server = MockServer::start();

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/predictions")
            .header("Authorization", "Token test-token")
            .body_contains("pH: 6.8")
            .body_contains("Area: 12.5 hectares")
            .json_body_partial(r#"{"input": {"max_new_tokens": 512}}"#);
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": "pred-1", "status": "starting"}));
    });

    let status_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/predictions/pred-1")
            .header("Authorization", "Token test-token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "id": "pred-1",
                "status": "succeeded",
                "output": ["Plant ", "sorghum ", "and lime the soil."]
            }));
    });

    let client = client_for(&server, 30);
    let result = client.analyze_soil(&soil()).await;

    create_mock.assert();
    status_mock.assert_hits(1);
    assert!(result.success);
    assert_eq!(
        result.data.as_deref(),
        Some("Plant sorghum and lime the soil.")
    );
    assert_eq!(result.prediction.unwrap()["id"], "pred-1");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_failed_status_is_reported() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/predictions");
        then.status(201)
            .json_body(serde_json::json!({"id": "pred-2", "status": "starting"}));
    });
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/predictions/pred-2");
        then.status(200)
            .json_body(serde_json::json!({"id": "pred-2", "status": "failed", "output": null}));
    });

    let client = client_for(&server, 30);
    let result = client
        .predict_yield(&FarmData {
            area: 40.0,
            unit: AreaUnit::Acres,
            crop: Some("maize".to_string()),
            ..Default::default()
        })
        .await;

    status_mock.assert_hits(1);
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Prediction failed"));
}

#[tokio::test]
async fn test_pending_until_attempts_exhausted() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/predictions");
        then.status(201)
            .json_body(serde_json::json!({"id": "pred-3", "status": "starting"}));
    });
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/predictions/pred-3");
        then.status(200)
            .json_body(serde_json::json!({"id": "pred-3", "status": "processing"}));
    });

    let client = client_for(&server, 3);
    let result = client.analyze_soil(&soil()).await;

    status_mock.assert_hits(3);
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Prediction timed out"));
}

#[tokio::test]
async fn test_creation_failure_reports_operation_error() {
    let server = MockServer::start();

    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/predictions");
        then.status(401)
            .json_body(serde_json::json!({"detail": "Invalid token"}));
    });

    let client = client_for(&server, 3);

    let soil_result = client.analyze_soil(&soil()).await;
    assert!(!soil_result.success);
    assert_eq!(soil_result.error.as_deref(), Some("Failed to analyze soil data"));

    let yield_result = client.predict_yield(&FarmData::default()).await;
    assert_eq!(yield_result.error.as_deref(), Some("Failed to predict yield"));

    create_mock.assert_hits(2);
}

#[tokio::test]
async fn test_status_transport_failure_stops_polling() {
    let server = MockServer::start();

    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/predictions/pred-4");
        then.status(500);
    });

    let client = client_for(&server, 10);
    let result = client.get_prediction_result("pred-4").await;

    status_mock.assert_hits(1);
    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to get prediction result")
    );
}

#[tokio::test]
async fn test_unreachable_server_is_structured_failure() {
    let settings = InferenceSettings::new("test-token")
        .with_base_url("http://127.0.0.1:1")
        .with_poll(Duration::from_millis(5), 2);
    let client = PredictionClient::new(settings);

    let result = client.analyze_soil(&soil()).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Failed to analyze soil data"));
}
