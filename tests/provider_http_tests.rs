use parcelbot::TrackerError;
use parcelbot::core::models::CarrierHint;
use parcelbot::tracking::{TrackingApiClient, TrackingProvider};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> TrackingApiClient {
    TrackingApiClient::new("test-key", &format!("{}/track/v2.2", server.uri())).unwrap()
}

#[tokio::test]
async fn test_query_sends_token_and_parses_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track/v2.2/gettrackinfo"))
        .and(header("17token", "test-key"))
        .and(body_json(json!([{ "number": "5532417763" }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "accepted": [{ "number": "5532417763", "carrier": 100001, "track": { "z1": [] } }],
                "rejected": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.query("5532417763", None).await.unwrap();

    let record = response.into_accepted().expect("one accepted record");
    assert_eq!(record.number(), Some("5532417763"));
    assert_eq!(record.carrier_code(), Some(100001));
}

#[tokio::test]
async fn test_query_with_hint_sends_carrier_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track/v2.2/gettrackinfo"))
        .and(body_json(json!([{ "number": "JJD0001234567", "carrier": 7041 }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": { "accepted": [], "rejected": [{ "number": "JJD0001234567" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .query("JJD0001234567", Some(CarrierHint::DhlPaket))
        .await
        .unwrap();

    assert!(response.into_accepted().is_none());
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track/v2.2/gettrackinfo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.query("5532417763", None).await.unwrap_err();

    match err {
        TrackerError::HttpError(msg) => assert!(msg.contains("500"), "got: {msg}"),
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_rejects_non_zero_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track/v2.2/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": -18019901 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.register("5532417763", None).await.unwrap_err();

    assert!(matches!(err, TrackerError::ProviderError(_)));
}

#[tokio::test]
async fn test_register_accepts_zero_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track/v2.2/register"))
        .and(body_json(json!([{ "number": "5532417763", "carrier": 100001 }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": { "accepted": [{ "number": "5532417763" }], "rejected": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .register("5532417763", Some(CarrierHint::DhlExpress))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track/v2.2/gettrackinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.query("5532417763", None).await.unwrap_err();

    assert!(matches!(err, TrackerError::ParseError(_)));
}
