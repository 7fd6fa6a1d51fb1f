//! Integration tests for IP geolocation using wiremock.

use nimbus_weather::{IpGeolocation, LocationError, LocationGateway, PermissionStatus, PositionSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_ip_lookup_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .and(query_param("fields", "status,message,lat,lon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "lat": 52.52,
            "lon": 13.405
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = IpGeolocation::new(&mock_server.uri()).unwrap();
    let fix = source.current_position().await.unwrap();

    assert_eq!(fix.latitude, 52.52);
    assert_eq!(fix.longitude, 13.405);
}

#[tokio::test]
async fn test_ip_lookup_failure_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&mock_server)
        .await;

    let source = IpGeolocation::new(&mock_server.uri()).unwrap();
    let result = source.current_position().await;

    match result {
        Err(LocationError::PositionUnavailable(message)) => assert_eq!(message, "private range"),
        other => panic!("expected PositionUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ip_lookup_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let source = IpGeolocation::new(&mock_server.uri()).unwrap();
    let result = source.current_position().await;

    assert!(matches!(result, Err(LocationError::ServiceUnavailable)));
}

#[tokio::test]
async fn test_denied_gateway_never_calls_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let source = IpGeolocation::new(&mock_server.uri()).unwrap();
    let gateway = LocationGateway::new(PermissionStatus::Denied, source);

    let result = gateway.acquire_location().await;

    assert!(matches!(result, Err(LocationError::PermissionDenied)));
}
