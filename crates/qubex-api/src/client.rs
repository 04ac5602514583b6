// Hand-crafted async HTTP client for the SonarQube Web API.
//
// Base path: {server}/api/
// Auth: HTTP basic, supplied per call so a caller can retry the same
// client with fresh credentials after a 401.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::ErrorResponse;
use crate::transport::TransportConfig;

/// Async client for a SonarQube server.
///
/// Holds no credentials of its own: every endpoint method takes an
/// `Option<&Credentials>`, `None` meaning anonymous access. Endpoint
/// groups (issues, rules, components, measures, system) are implemented
/// as inherent methods in separate modules.
#[derive(Debug, Clone)]
pub struct SonarClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SonarClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL and transport config.
    pub fn new(server_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(server_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(server_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(server_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with exactly one `/`, keeping any context
    /// path (`https://host/sonar` → `https://host/sonar/`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The server root URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The server root URL without the trailing slash, for display.
    pub fn server_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative API path (e.g. `"api/issues/search"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn request(&self, url: Url, auth: Option<&Credentials>) -> reqwest::RequestBuilder {
        let req = self.http.get(url);
        match auth {
            Some(creds) => creds.apply(req),
            None => req,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        auth: Option<&Credentials>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.request(url, auth).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_text(
        &self,
        path: &str,
        auth: Option<&Credentials>,
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.request(url, auth).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.text().await?)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized {
                status: status.as_u16(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|body| body.joined())
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        match status {
            reqwest::StatusCode::FORBIDDEN => Error::Forbidden { message },
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { message },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}
