#![allow(clippy::unwrap_used)]
// Round-trips config files on disk through figment.

use std::time::Duration;

use pretty_assertions::assert_eq;

use qubex_config::{
    Config, Defaults, Profile, load_config_from, profile_to_server_config, save_config_to,
};
use qubex_core::TlsVerification;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults.output, "table");
    assert_eq!(cfg.defaults.timeout, 30);
    assert_eq!(cfg.defaults.page_size, 500);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn reads_profiles_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "work"

[defaults]
output = "json"
timeout = 10

[profiles.work]
server = "https://sonar.example.com/sonar"
project = "demo"
insecure = true
page_size = 100
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    let (name, profile) = cfg.profile(None).unwrap();

    assert_eq!(name, "work");
    assert_eq!(profile.project.as_deref(), Some("demo"));
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.color, "auto");

    let server = profile_to_server_config(profile, &name, &cfg.defaults).unwrap();
    assert_eq!(server.url.as_str(), "https://sonar.example.com/sonar");
    assert_eq!(server.tls, TlsVerification::DangerAcceptInvalid);
    assert_eq!(server.timeout, Duration::from_secs(10));
    assert_eq!(server.page_size, 100);
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::sample("https://sonar.example.com");
    cfg.profiles.insert(
        "ci".into(),
        Profile {
            server: "http://localhost:9000".into(),
            timeout: Some(5),
            ..Profile::default()
        },
    );
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.profiles.len(), 2);
    assert_eq!(loaded.profiles["ci"].server, "http://localhost:9000");
    assert_eq!(loaded.profiles["ci"].timeout, Some(5));
    assert_eq!(
        loaded.profiles["default"].token_env.as_deref(),
        Some("QUBEX_TOKEN")
    );
}

#[test]
fn invalid_server_url_is_rejected() {
    let profile = Profile {
        server: "sonar.example.com".into(),
        ..Profile::default()
    };
    let result = profile_to_server_config(&profile, "default", &Defaults::default());
    assert!(result.is_err());
}
