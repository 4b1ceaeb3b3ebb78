//! The `inkdash` binary reading `.env` and environment layers.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// `inkdash --config <dir>/inkdash.toml config get <key>` in `dir`, with a clean environment.
fn config_get(dir: &Path, key: &str, vars: &[(&str, &str)]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_inkdash"))
        .current_dir(dir)
        .env_clear()
        .envs(vars.iter().copied())
        .arg("--config")
        .arg(dir.join("inkdash.toml"))
        .args(["config", "get", key])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "config get {key} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn workdir(toml: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("inkdash.toml"), toml).unwrap();
    dir
}

#[test]
fn test_dotenv_supplies_connection() {
    let dir = workdir("");
    std::fs::write(
        dir.path().join(".env"),
        "HA_URL=http://ha.local:8123\nHA_WS_URL=ws://ha.local:8123/api/websocket\nHA_TOKEN=from-dotenv\n",
    )
    .unwrap();

    assert_eq!(config_get(dir.path(), "home_assistant.url", &[]), "http://ha.local:8123");
    assert_eq!(
        config_get(dir.path(), "home_assistant.ws_url", &[]),
        "ws://ha.local:8123/api/websocket"
    );
    assert_eq!(config_get(dir.path(), "home_assistant.token", &[]), "from-dotenv");
}

#[test]
fn test_process_environment_beats_dotenv() {
    let dir = workdir("");
    std::fs::write(dir.path().join(".env"), "HA_TOKEN=from-dotenv\n").unwrap();

    let token = config_get(dir.path(), "home_assistant.token", &[("HA_TOKEN", "from-shell")]);
    assert_eq!(token, "from-shell");
}

#[test]
fn test_sectioned_variables_override_file() {
    let dir = workdir("[server]\nport = 9000\n\n[display]\nbreakpoint = 1200\n");

    assert_eq!(config_get(dir.path(), "server.port", &[]), "9000");
    assert_eq!(
        config_get(dir.path(), "server.port", &[("INKDASH_SERVER_PORT", "9100")]),
        "9100"
    );
    assert_eq!(
        config_get(dir.path(), "display.breakpoint", &[("INKDASH_DISPLAY_BREAKPOINT", "1400")]),
        "1400"
    );
}

#[test]
fn test_deployment_names_beat_sectioned_variables() {
    let dir = workdir("[home_assistant]\nurl = \"http://file:8123\"\n");
    let url = config_get(
        dir.path(),
        "home_assistant.url",
        &[
            ("INKDASH_HOME_ASSISTANT_URL", "http://sectioned:8123"),
            ("HA_URL", "http://deployment:8123"),
        ],
    );
    assert_eq!(url, "http://deployment:8123");

    let url = config_get(
        dir.path(),
        "home_assistant.url",
        &[("INKDASH_HOME_ASSISTANT_URL", "http://sectioned:8123")],
    );
    assert_eq!(url, "http://sectioned:8123");
}
