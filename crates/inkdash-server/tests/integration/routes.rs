//! Router tests against the in-memory Home Assistant.

use axum::http::StatusCode;
use inkdash_core::icons::is_eink_safe;
use inkdash_server::HealthResponse;

use crate::common::{FakeHomeAssistant, TestApp, test_config};

// ------------------------------------------------------------------------
// Home page
// ------------------------------------------------------------------------

#[tokio::test]
async fn test_home_lists_rooms() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"href="/dashboard/all""#));
    assert!(response.body.contains(r#"href="/dashboard/area-kitchen""#));
    assert!(response.body.contains(r#"href="/dashboard/area-attic""#));
    assert!(response.body.contains("[K]"));
    assert!(response.body.contains("[+]"));
    assert!(response.body.contains(r#"<a class="active" href="/?view=rooms">"#));
}

#[tokio::test]
async fn test_home_lists_dashboard_views() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/?view=dashboards").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .body
            .contains(r#"href="/dashboard/lovelace-dashboard_oscar-ada""#)
    );
    assert!(
        response
            .body
            .contains(r#"href="/dashboard/lovelace-dashboard_oscar-energy""#)
    );
    assert!(!response.body.contains("area-kitchen"));
}

#[tokio::test]
async fn test_home_survives_home_assistant_outage() {
    let app = TestApp::new(FakeHomeAssistant::offline());
    let rooms = app.get("/").await;
    assert_eq!(rooms.status, StatusCode::OK);
    assert!(rooms.body.contains("All devices"));
    assert!(!rooms.body.contains("area-kitchen"));

    let dashboards = app.get("/?view=dashboards").await;
    assert_eq!(dashboards.status, StatusCode::OK);
    assert!(dashboards.body.contains("Nothing to show."));
}

// ------------------------------------------------------------------------
// Entity pages
// ------------------------------------------------------------------------

#[tokio::test]
async fn test_all_devices_page() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/all").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = &response.body;
    assert!(body.contains("<h1>All devices</h1>"));
    assert!(body.contains("Kitchen"));
    assert!(body.contains("Office fan"));
    assert!(body.contains("21.5 °C"));
    assert!(!body.contains("media_player.tv"), "unsupported domains are hidden");
    assert!(body.contains(r#"href="/toggle/all/light.kitchen""#));
    assert!(!body.contains("/toggle/all/sensor.hall"));
    assert!(body.contains("Updated "));
}

#[tokio::test]
async fn test_area_page_shows_only_area_entities() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/area-kitchen").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Kitchen"));
    assert!(!response.body.contains("Office fan"));
    assert!(
        response
            .body
            .contains(r#"href="/toggle/area-kitchen/light.kitchen""#)
    );
}

#[tokio::test]
async fn test_empty_area_shows_no_devices() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/area-attic").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("No devices."));
    assert!(!response.body.contains("Office fan"));
}

#[tokio::test]
async fn test_unknown_path_is_empty_page() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/garage").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("No devices."));
}

#[tokio::test]
async fn test_fixed_grid_columns() {
    let mut config = test_config();
    config.page.grid_columns = "4".parse().unwrap();
    let app = TestApp::with_config(FakeHomeAssistant::house(), &config);
    let response = app.get("/dashboard/all").await;

    assert!(response.body.contains(r#"style="width:25%""#));
    assert!(response.body.contains(r#"<div class="grid">"#));
    assert!(!response.body.contains(r#"class="grid grid-auto""#));
}

// ------------------------------------------------------------------------
// Lovelace pages
// ------------------------------------------------------------------------

#[tokio::test]
async fn test_sections_view_on_kindle_is_single_column() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/lovelace-dashboard_oscar-ada").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = &response.body;
    assert!(body.contains("<h1>Ada</h1>"));
    assert!(body.contains(r#"class="sections sections-1""#));
    assert!(body.contains("Lights"));
    assert!(body.contains("<h3>Climate</h3>"));
    assert!(body.contains("Unavailable"), "missing entity renders as unavailable");
    assert!(body.contains(r#"href="/toggle/lovelace-dashboard_oscar-ada/light.kitchen""#));
}

#[tokio::test]
async fn test_width_override_selects_two_columns() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app
        .get("/dashboard/lovelace-dashboard_oscar-ada?width=1400")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"class="sections sections-2""#));
    assert!(response.body.contains(r#"class="section" style="width:50%""#));
}

#[tokio::test]
async fn test_classic_view() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/lovelace-dashboard_oscar-energy").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h1>Energy</h1>"));
    assert!(response.body.contains("card-button"));
    assert!(response.body.contains("Office fan"));
}

#[tokio::test]
async fn test_dashboard_without_view_opens_first_view() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/lovelace-dashboard_oscar").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h1>Ada</h1>"));
}

#[tokio::test]
async fn test_missing_view_is_empty_page() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/lovelace-dashboard_oscar-nope").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("No devices."));
}

// ------------------------------------------------------------------------
// Failures
// ------------------------------------------------------------------------

#[tokio::test]
async fn test_home_assistant_outage_is_bad_gateway() {
    let app = TestApp::new(FakeHomeAssistant::offline());
    let response = app.get("/dashboard/all").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body.contains("Home Assistant unavailable"));
    assert!(response.body.contains("connection refused"));
}

#[tokio::test]
async fn test_invalid_width_is_rejected() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/dashboard/all?width=wide").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ------------------------------------------------------------------------
// Toggle
// ------------------------------------------------------------------------

#[tokio::test]
async fn test_toggle_calls_service_and_redirects() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/toggle/area-kitchen/light.kitchen").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/dashboard/area-kitchen"));
    assert_eq!(app.ha.calls(), vec!["light.toggle light.kitchen"]);
}

#[tokio::test]
async fn test_failed_toggle_still_redirects() {
    let app = TestApp::new(FakeHomeAssistant::offline());
    let response = app.get("/toggle/all/switch.office").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/dashboard/all"));
    assert!(app.ha.calls().is_empty());
}

#[tokio::test]
async fn test_toggle_without_domain_is_not_called() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/toggle/all/kitchen").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(app.ha.calls().is_empty());
}

// ------------------------------------------------------------------------
// Health, static files and page hygiene
// ------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(FakeHomeAssistant::house());
    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_str(&response.body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.name, "inkdash-server");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_static_icons_are_served() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("icons")).unwrap();
    std::fs::write(dir.path().join("icons").join("light_on.png"), b"\x89PNG").unwrap();

    let mut config = test_config();
    config.server.static_dir = dir.path().to_path_buf();
    let app = TestApp::with_config(FakeHomeAssistant::house(), &config);

    let icon = app.get("/static/icons/light_on.png").await;
    assert_eq!(icon.status, StatusCode::OK);
    assert_eq!(icon.bytes, b"\x89PNG");
    assert_eq!(app.get("/static/icons/nope.png").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_icons_point_at_static_dir() {
    let mut config = test_config();
    config.display.icon_mode = inkdash_core::IconMode::Image;
    let app = TestApp::with_config(FakeHomeAssistant::house(), &config);
    let response = app.get("/dashboard/all").await;

    assert!(response.body.contains(r#"src="/static/icons/light_on.png""#));
    assert!(response.body.contains(r#"alt="Light on""#));
}

#[tokio::test]
async fn test_auto_refresh_and_theme() {
    let mut config = test_config();
    config.page.auto_refresh = 300;
    config.page.theme = inkdash_render::Theme::Dark;
    let app = TestApp::with_config(FakeHomeAssistant::house(), &config);
    let response = app.get("/dashboard/all").await;

    assert!(response.body.contains(r#"<meta http-equiv="refresh" content="300">"#));
    assert!(response.body.contains(r#"<body class="theme-dark">"#));
}

#[tokio::test]
async fn test_pages_are_eink_safe() {
    let mut ha = FakeHomeAssistant::house();
    ha.states.push(
        inkdash_core::EntityState::new("light.party", "on")
            .with_attribute("icon", "mdi:party-popper"),
    );
    let app = TestApp::new(ha);

    for uri in [
        "/",
        "/?view=dashboards",
        "/dashboard/all",
        "/dashboard/area-kitchen",
        "/dashboard/lovelace-dashboard_oscar-ada",
        "/dashboard/lovelace-dashboard_oscar-energy",
    ] {
        let response = app.get(uri).await;
        assert!(is_eink_safe(&response.body), "{uri} contains unsafe glyphs");
        assert!(!response.body.contains("<script"), "{uri} contains a script");
        assert!(!response.body.contains("<svg"), "{uri} contains svg");
        assert!(!response.body.contains("display:flex"), "{uri} uses flexbox");
    }
}
