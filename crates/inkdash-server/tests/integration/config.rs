//! Config file round trips through the `config` subcommand handlers.

use inkdash_core::{ColumnPreference, IconMode};
use inkdash_server::InkdashConfig;
use inkdash_server::config_handlers::{config_get, config_init, config_set};

use crate::common::FakeHomeAssistant;
use crate::common::TestApp;

#[test]
fn test_init_then_set_then_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("inkdash.toml");
    let path_str = path.to_str().unwrap();

    config_init(Some(path_str), false).unwrap();
    config_set(Some(path_str), "display.icon_mode", "text").unwrap();
    config_set(Some(path_str), "page.grid_columns", "3").unwrap();
    config_set(Some(path_str), "home_assistant.url", "http://ha.local:8123").unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let config = InkdashConfig::from_toml_str(&content).unwrap();
    assert_eq!(config.display.icon_mode, IconMode::Text);
    assert_eq!(config.page.grid_columns, ColumnPreference::Fixed(3));
    assert_eq!(config.home_assistant.url, "http://ha.local:8123");
    assert_eq!(config_get(Some(path_str), "display.icon_mode").unwrap(), "text");
}

#[tokio::test]
async fn test_icon_overrides_reach_pages() {
    let config = InkdashConfig::from_toml_str(
        r#"
        [display]
        icon_mode = "ascii"

        [[icons]]
        domain = "light"
        state = "on"
        image = "lamp_on.png"
        ascii = "[*]"
        label = "Lamp on"

        [[area_icons]]
        domain = "attic"
        image = "area_attic.png"
        ascii = "[A]"
        label = "Attic"
        "#,
    )
    .unwrap();
    let app = TestApp::with_config(FakeHomeAssistant::house(), &config);

    assert!(app.get("/dashboard/all").await.body.contains("[*]"));
    assert!(app.get("/").await.body.contains("[A]"));
}
