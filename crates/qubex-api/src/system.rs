// Server system endpoints

use tracing::debug;

use crate::auth::Credentials;
use crate::client::SonarClient;
use crate::error::Error;

impl SonarClient {
    /// Get the server version string (e.g. `9.9.0.65466`).
    ///
    /// `GET /api/server/version` answers in plain text, not JSON.
    pub async fn server_version(&self, auth: Option<&Credentials>) -> Result<String, Error> {
        debug!("fetching server version");
        let raw = self.get_text("api/server/version", auth).await?;
        let version = raw.trim();
        if version.is_empty() {
            return Err(Error::InvalidVersion(raw));
        }
        Ok(version.to_owned())
    }
}
