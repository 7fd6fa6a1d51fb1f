//! End-to-end session tests: permission -> position -> weather -> screen,
//! against a mock OpenWeatherMap server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use nimbus_ui::screen::{format_timestamp, Body, ToggleIcon};
use nimbus_ui::{FetchFailurePolicy, Phase, Session, ThemePalette, ThemeSelection, ThemeStore};
use nimbus_weather::{
    FixedPosition, IpGeolocation, LocationGateway, PermissionStatus, WeatherProvider,
};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(policy: FetchFailurePolicy) -> Session {
    Session::new(ThemeStore::new(ThemeSelection::Light), policy)
}

fn provider(server: &MockServer) -> Arc<WeatherProvider> {
    Arc::new(WeatherProvider::new(&server.uri(), "test-key").unwrap())
}

fn berlin_position() -> FixedPosition {
    FixedPosition::new(52.52, 13.405)
}

async fn mount_berlin(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Poll until the session reaches a terminal phase
async fn settle(session: &mut Session) {
    for _ in 0..300 {
        session.poll();
        if session.state().phase().is_terminal() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session did not settle: {:?}", session.state().phase());
}

/// Poll until `check` holds
async fn wait_for(session: &mut Session, check: impl Fn(&Session) -> bool) {
    for _ in 0..300 {
        session.poll();
        if check(session) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached, phase {:?}", session.state().phase());
}

#[tokio::test]
async fn test_granted_permission_shows_weather_card() {
    let server = MockServer::start().await;
    mount_berlin(
        &server,
        200,
        serde_json::json!({ "name": "Berlin", "main": { "temp": 18.3 } }),
    )
    .await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    assert!(session.mount(&Handle::current(), gateway, provider(&server)));

    settle(&mut session).await;

    assert_eq!(session.state().phase(), Phase::WeatherDisplayed);
    let fix = session.state().location().cloned().unwrap();
    match session.screen().body {
        Body::Weather(card) => {
            assert_eq!(card.headline, "Berlin, 18.3°C");
            assert_eq!(
                card.timestamp,
                Some(format_timestamp(&fix.timestamp, &Local))
            );
        }
        other => panic!("expected weather card, got {:?}", other),
    }
}

#[tokio::test]
async fn test_denied_permission_shows_only_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for theme in [ThemeSelection::Light, ThemeSelection::Dark] {
        let mut session = Session::new(ThemeStore::new(theme), FetchFailurePolicy::Surface);
        let gateway = LocationGateway::new(PermissionStatus::Denied, berlin_position());
        session.mount(&Handle::current(), gateway, provider(&server));

        settle(&mut session).await;

        assert_eq!(session.state().phase(), Phase::PermissionDenied);
        assert!(session.state().weather().is_none());
        assert_eq!(
            session.screen().body,
            Body::Error("Location permission is needed".into())
        );
    }
}

#[tokio::test]
async fn test_location_service_outage_shows_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(FetchFailurePolicy::Surface);
    let source = IpGeolocation::new(&server.uri()).unwrap();
    let gateway = LocationGateway::new(PermissionStatus::Granted, source);
    session.mount(&Handle::current(), gateway, provider(&server));

    settle(&mut session).await;

    assert_eq!(session.state().phase(), Phase::LocationUnavailable);
    assert_eq!(
        session.screen().body,
        Body::Error("Location service unavailable. Please try again later.".into())
    );
}

#[tokio::test]
async fn test_prompt_flow_denied() {
    let server = MockServer::start().await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(session.permission_prompt(), berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));

    wait_for(&mut session, |s| s.is_prompting()).await;
    assert_eq!(session.screen().body, Body::PermissionPrompt);

    assert!(session.answer_permission(false));
    settle(&mut session).await;

    assert_eq!(session.state().phase(), Phase::PermissionDenied);
    assert_eq!(
        session.screen().body,
        Body::Error("Location permission is needed".into())
    );
}

#[tokio::test]
async fn test_prompt_flow_granted() {
    let server = MockServer::start().await;
    mount_berlin(
        &server,
        200,
        serde_json::json!({ "name": "Berlin", "main": { "temp": 18.3 } }),
    )
    .await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(session.permission_prompt(), berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));

    wait_for(&mut session, |s| s.is_prompting()).await;
    session.answer_permission(true);
    settle(&mut session).await;

    assert_eq!(session.state().phase(), Phase::WeatherDisplayed);
    assert!(!session.is_prompting());
}

#[tokio::test]
async fn test_fetch_failure_surfaces_error() {
    let server = MockServer::start().await;
    mount_berlin(&server, 500, serde_json::json!({ "cod": 500 })).await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));

    settle(&mut session).await;

    assert_eq!(session.state().phase(), Phase::FetchFailed);
    assert!(matches!(session.screen().body, Body::Error(_)));
}

#[tokio::test]
async fn test_rejected_api_key_tells_user_where_to_set_it() {
    let server = MockServer::start().await;
    mount_berlin(&server, 401, serde_json::json!({ "cod": 401 })).await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));

    settle(&mut session).await;

    match session.screen().body {
        Body::Error(message) => {
            assert!(message.contains("weather.api_key"));
            assert!(message.contains("NIMBUS_OWM_API_KEY"));
        }
        other => panic!("expected error, got {:?}", other),
    }
}

/// Under the silent policy a failed fetch leaves
/// neither a weather card nor an error on screen.
#[tokio::test]
async fn test_fetch_failure_silent_leaves_screen_empty() {
    let server = MockServer::start().await;
    mount_berlin(&server, 500, serde_json::json!({ "cod": 500 })).await;

    let mut session = session(FetchFailurePolicy::Silent);
    let gateway = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));

    settle(&mut session).await;

    assert_eq!(session.state().phase(), Phase::FetchFailed);
    assert!(session.state().weather().is_none());
    assert_eq!(session.screen().body, Body::Empty);
}

#[tokio::test]
async fn test_mount_runs_sequence_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "name": "Berlin", "main": { "temp": 18.3 } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(FetchFailurePolicy::Surface);
    let first = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    let second = LocationGateway::new(PermissionStatus::Granted, berlin_position());

    assert!(session.mount(&Handle::current(), first, provider(&server)));
    assert!(!session.mount(&Handle::current(), second, provider(&server)));

    settle(&mut session).await;
    // Re-rendering never restarts the sequence
    let _ = session.screen();
    let _ = session.screen();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!session.poll());
}

#[tokio::test]
async fn test_teardown_prevents_late_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "name": "Berlin", "main": { "temp": 18.3 } }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));

    wait_for(&mut session, |s| s.state().phase() == Phase::FetchingWeather).await;
    session.teardown();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!session.poll());
    assert_eq!(session.state().phase(), Phase::FetchingWeather);
    assert!(session.state().weather().is_none());
}

#[tokio::test]
async fn test_theme_toggle_during_session() {
    let server = MockServer::start().await;
    mount_berlin(
        &server,
        200,
        serde_json::json!({ "name": "Berlin", "main": { "temp": 18.3 } }),
    )
    .await;

    let mut session = session(FetchFailurePolicy::Surface);
    let gateway = LocationGateway::new(PermissionStatus::Granted, berlin_position());
    session.mount(&Handle::current(), gateway, provider(&server));
    settle(&mut session).await;

    assert_eq!(session.screen().header.toggle, ToggleIcon::Sun);
    session.toggle_theme();
    let screen = session.screen();
    assert_eq!(screen.header.toggle, ToggleIcon::Moon);
    assert_eq!(screen.palette, &ThemePalette::DARK);
    assert!(matches!(screen.body, Body::Weather(_)));

    session.toggle_theme();
    assert_eq!(session.screen().palette, &ThemePalette::LIGHT);
}
