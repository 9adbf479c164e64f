use anyhow::Result;
use std::fs;
use transcriber_bridge::Config;

fn write_config(dir: &std::path::Path, body: &str) -> String {
    let path = dir.join("bridge.toml");
    fs::write(&path, body).unwrap();
    // The loader resolves the extension itself
    dir.join("bridge").to_string_lossy().into_owned()
}

#[test]
fn test_full_config_loads() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
[service]
name = "transcriber-bridge"

[service.http]
bind = "127.0.0.1"
port = 9000

[transcriber]
url = "wss://example.test/listen"
api_key_env = "TEST_STT_KEY"
model = "nova-2"
language = "en"
interim_results = true
punctuate = true

[aggregator]
debounce_ms = 800

[recording]
enabled = true
output_dir = "/tmp/calls"
"#,
    );

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.service.name, "transcriber-bridge");
    assert_eq!(cfg.service.http.bind, "127.0.0.1");
    assert_eq!(cfg.service.http.port, 9000);
    assert_eq!(cfg.transcriber.url, "wss://example.test/listen");
    assert_eq!(cfg.transcriber.api_key_env, "TEST_STT_KEY");
    // drain_timeout_ms was not set; the section default applies
    assert_eq!(cfg.transcriber.drain_timeout_ms, 10_000);
    assert_eq!(cfg.aggregator.debounce_ms, 800);
    assert_eq!(cfg.aggregator.debounce(), std::time::Duration::from_millis(800));
    assert!(cfg.recording.enabled);
    assert_eq!(cfg.recording.output_dir, "/tmp/calls");

    Ok(())
}

#[test]
fn test_minimal_config_uses_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
[service]
name = "bridge"

[service.http]
bind = "0.0.0.0"
port = 8090
"#,
    );

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.transcriber.api_key_env, "DEEPGRAM_API_KEY");
    assert!(cfg.transcriber.interim_results);
    assert_eq!(cfg.transcriber.drain_timeout(), std::time::Duration::from_secs(10));
    assert_eq!(cfg.aggregator.debounce_ms, 1500);
    assert!(!cfg.recording.enabled);

    Ok(())
}

#[test]
fn test_missing_config_file_fails() {
    let result = Config::load("/nonexistent/path/to/bridge");
    assert!(result.is_err());
}

#[test]
fn test_missing_service_section_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[aggregator]\ndebounce_ms = 100\n");

    assert!(Config::load(&path).is_err(), "service section is required");
}
