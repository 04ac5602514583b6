//! Shared configuration for qubex.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! to `qubex_core::ServerConfig`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use qubex_core::{ServerConfig, TlsVerification, UserCredentials};

pub const ENV_PREFIX: &str = "QUBEX_";
pub const USERNAME_ENV: &str = "QUBEX_USERNAME";
pub const PASSWORD_ENV: &str = "QUBEX_PASSWORD";
pub const TOKEN_ENV: &str = "QUBEX_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no password configured for user '{username}' in profile '{profile}'")]
    MissingPassword { username: String, profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    500
}

/// A named server profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL, with context path if any.
    pub server: String,

    /// Project key used when a command names none.
    pub project: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// User token (plaintext; prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable name containing a user token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override issues per page.
    pub page_size: Option<u32>,
}

impl Config {
    /// Resolve a profile by explicit name, then `default_profile`, then
    /// `"default"`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { name })
    }

    /// Starter file written by `qubex config init`.
    pub fn sample(server: &str) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "default".to_owned(),
            Profile {
                server: server.to_owned(),
                token_env: Some(TOKEN_ENV.to_owned()),
                ..Profile::default()
            },
        );
        Self {
            profiles,
            ..Self::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "qubex", "qubex").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("qubex");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) layered with `QUBEX_` env vars.
///
/// Nested keys use a double underscore: `QUBEX_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["username", "password", "token", "profile", "server"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve credentials from the process environment and the profile.
///
/// `Ok(None)` means anonymous access.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<UserCredentials>, ConfigError> {
    resolve_credentials_with(profile, profile_name, |name| std::env::var(name).ok())
}

/// Credential chain with an injectable environment lookup.
///
/// A token wins over a username: `token_env` → `QUBEX_TOKEN` → `token`.
/// Otherwise, with a username (profile or `QUBEX_USERNAME`), the password
/// comes from `password_env` → `QUBEX_PASSWORD` → `password`.
pub fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Option<UserCredentials>, ConfigError> {
    let token = profile
        .token_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env(TOKEN_ENV))
        .or_else(|| profile.token.clone());
    if let Some(token) = token {
        return Ok(Some(UserCredentials::token(&SecretString::from(token))));
    }

    let Some(username) = profile.username.clone().or_else(|| env(USERNAME_ENV)) else {
        return Ok(None);
    };

    let password = profile
        .password_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env(PASSWORD_ENV))
        .or_else(|| profile.password.clone())
        .ok_or_else(|| ConfigError::MissingPassword {
            username: username.clone(),
            profile: profile_name.into(),
        })?;

    Ok(Some(UserCredentials::new(
        username,
        SecretString::from(password),
    )))
}

/// TLS strategy for a profile, falling back to the global `insecure` flag.
pub fn resolve_tls(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Parse and validate a server URL.
pub fn parse_server_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build a `ServerConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_server_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ServerConfig, ConfigError> {
    let url = parse_server_url(&profile.server)?;
    let credentials = resolve_credentials(profile, profile_name)?;

    Ok(ServerConfig {
        url,
        credentials,
        tls: resolve_tls(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        page_size: profile.page_size.unwrap_or(defaults.page_size),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn no_username_or_token_is_anonymous() {
        let profile = Profile::default();
        let creds = resolve_credentials_with(&profile, "default", env_of(&[])).unwrap();
        assert!(creds.is_none());
    }

    #[test]
    fn password_env_wins_over_global_env_and_plaintext() {
        let profile = Profile {
            username: Some("admin".into()),
            password: Some("plain".into()),
            password_env: Some("SONAR_PW".into()),
            ..Profile::default()
        };
        let creds = resolve_credentials_with(
            &profile,
            "default",
            env_of(&[("SONAR_PW", "from-profile-env"), (PASSWORD_ENV, "from-global")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.secret.expose_secret(), "from-profile-env");
    }

    #[test]
    fn global_password_env_wins_over_plaintext() {
        let profile = Profile {
            username: Some("admin".into()),
            password: Some("plain".into()),
            ..Profile::default()
        };
        let creds = resolve_credentials_with(&profile, "default", env_of(&[(PASSWORD_ENV, "env")]))
            .unwrap()
            .unwrap();
        assert_eq!(creds.secret.expose_secret(), "env");
    }

    #[test]
    fn username_without_password_is_an_error() {
        let profile = Profile::default();
        let err = resolve_credentials_with(&profile, "ci", env_of(&[(USERNAME_ENV, "bot")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingPassword { ref profile, .. } if profile == "ci"));
    }

    #[test]
    fn token_takes_precedence() {
        let profile = Profile {
            username: Some("admin".into()),
            password: Some("plain".into()),
            token: Some("squ_plain".into()),
            ..Profile::default()
        };
        let creds = resolve_credentials_with(&profile, "default", env_of(&[(TOKEN_ENV, "squ_env")]))
            .unwrap()
            .unwrap();
        assert!(creds.is_token());
        assert_eq!(creds.username, "squ_env");
    }

    #[test]
    fn tls_resolution() {
        let defaults = Defaults::default();
        let mut profile = Profile::default();
        assert_eq!(resolve_tls(&profile, &defaults), TlsVerification::SystemDefaults);

        profile.ca_cert = Some(PathBuf::from("/etc/ssl/sonar.pem"));
        assert_eq!(
            resolve_tls(&profile, &defaults),
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/sonar.pem"))
        );

        profile.insecure = Some(true);
        assert_eq!(resolve_tls(&profile, &defaults), TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(parse_server_url("https://sonar.example.com/sonar").is_ok());
        assert!(matches!(
            parse_server_url("ftp://sonar.example.com"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(parse_server_url("not a url").is_err());
    }

    #[test]
    fn profile_lookup_falls_back_to_default_profile() {
        let mut cfg = Config::sample("https://sonar.example.com");
        assert_eq!(cfg.profile(None).unwrap().0, "default");
        assert!(matches!(
            cfg.profile(Some("prod")),
            Err(ConfigError::UnknownProfile { ref name }) if name == "prod"
        ));

        cfg.default_profile = Some("missing".into());
        assert!(cfg.profile(None).is_err());
    }
}
