// ── Runtime connection configuration ──
//
// These types describe *how* to reach a SonarQube server. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ServerConfig` and hands it in.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use qubex_api::{Credentials, SonarClient, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Username and secret for one server.
///
/// A user token is carried as the username with an empty secret.
#[derive(Clone)]
pub struct UserCredentials {
    pub username: String,
    pub secret: SecretString,
}

impl UserCredentials {
    pub fn new(username: impl Into<String>, secret: SecretString) -> Self {
        Self {
            username: username.into(),
            secret,
        }
    }

    /// Credentials for a user token.
    pub fn token(token: &SecretString) -> Self {
        Self {
            username: token.expose_secret().to_owned(),
            secret: SecretString::from(String::new()),
        }
    }

    pub fn is_token(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }

    pub(crate) fn to_api(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.secret.clone())
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens travel in the username slot.
        let username = if self.is_token() {
            "[REDACTED]"
        } else {
            self.username.as_str()
        };
        f.debug_struct("UserCredentials")
            .field("username", &username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single server.
///
/// Built by the CLI, passed to `Explorer` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server URL, including any context path (`https://sonar.example.com/sonar`).
    pub url: Url,
    /// `None` means anonymous access.
    pub credentials: Option<UserCredentials>,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Issues requested per page. The server caps this at 500.
    pub page_size: u32,
}

pub const DEFAULT_PAGE_SIZE: u32 = qubex_api::issues::MAX_PAGE_SIZE;

impl ServerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build the HTTP client this configuration describes.
    pub fn build_client(&self) -> Result<SonarClient, CoreError> {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        let transport = TransportConfig {
            tls,
            timeout: self.timeout,
        };
        Ok(SonarClient::new(self.url.as_str(), &transport)?)
    }

    /// Page size clamped to what the server accepts.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_and_token() {
        let creds = UserCredentials::new("admin", SecretString::from("hunter2".to_string()));
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));

        let token = UserCredentials::token(&SecretString::from("squ_abc".to_string()));
        assert!(token.is_token());
        assert!(!format!("{token:?}").contains("squ_abc"));
    }

    #[test]
    fn page_size_is_clamped() {
        let mut config = ServerConfig::new("https://sonar.example.com".parse().unwrap());
        assert_eq!(config.effective_page_size(), 500);
        config.page_size = 5000;
        assert_eq!(config.effective_page_size(), 500);
        config.page_size = 0;
        assert_eq!(config.effective_page_size(), 1);
    }

    #[test]
    fn builds_client_keeping_context_path() {
        let config = ServerConfig::new("https://sonar.example.com/sonar".parse().unwrap());
        let client = config.build_client().unwrap();
        assert_eq!(client.base_url().path(), "/sonar/");
    }
}
