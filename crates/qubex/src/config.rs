//! Layers CLI flag overrides on top of the shared config profiles.
//!
//! Profile loading and the credential chain live in `qubex-config`; this
//! module only knows about `GlobalOpts`.

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::SecretString;

use qubex_config::{Config, Profile, PASSWORD_ENV};
use qubex_core::{ServerConfig, TlsVerification, UserCredentials};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a remote command needs from configuration.
#[derive(Debug)]
pub struct Resolved {
    pub server: ServerConfig,
    /// Project key used when the command names none.
    pub project: Option<String>,
    pub profile: String,
}

impl Resolved {
    pub fn timeout_secs(&self) -> u64 {
        self.server.timeout.as_secs()
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection settings from the config file, profile, and CLI
/// overrides (flag > env > profile > defaults).
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let fallback;
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        // No profile: flags and environment alone must name the server.
        None => {
            if global.server.is_none() {
                return Err(CliError::NoConfig {
                    path: qubex_config::config_path().display().to_string(),
                });
            }
            fallback = Profile::default();
            &fallback
        }
    };

    let url_str = global.server.as_deref().unwrap_or(&profile.server);
    let url = qubex_config::parse_server_url(url_str)?;

    let credentials = match flag_credentials(global)? {
        Some(creds) => Some(creds),
        None => qubex_config::resolve_credentials(profile, &profile_name)?,
    };

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        qubex_config::resolve_tls(profile, &cfg.defaults)
    };

    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);

    Ok(Resolved {
        server: ServerConfig {
            url,
            credentials,
            tls,
            timeout: Duration::from_secs(timeout),
            page_size: profile.page_size.unwrap_or(cfg.defaults.page_size),
        },
        project: profile.project.clone(),
        profile: profile_name,
    })
}

/// Credentials given on the command line, if any.
fn flag_credentials(global: &GlobalOpts) -> Result<Option<UserCredentials>, CliError> {
    if let Some(ref token) = global.token {
        return Ok(Some(UserCredentials::token(&SecretString::from(
            token.clone(),
        ))));
    }

    let Some(ref username) = global.username else {
        return Ok(None);
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(pw) => pw,
        Err(_) if std::io::stdin().is_terminal() => {
            rpassword::prompt_password(format!("Password for {username}: "))?
        }
        Err(_) => {
            return Err(CliError::MissingPassword {
                username: username.clone(),
                profile: "(command line)".into(),
            });
        }
    };

    Ok(Some(UserCredentials::new(
        username.clone(),
        SecretString::from(password),
    )))
}
