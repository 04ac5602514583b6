// Rule lookup endpoint

use tracing::debug;

use crate::auth::Credentials;
use crate::client::SonarClient;
use crate::error::Error;
use crate::models::{RuleEntry, RuleShowResponse};

impl SonarClient {
    /// Fetch a single rule by key.
    ///
    /// `GET /api/rules/show?key={rule_key}`
    ///
    /// Returns `Ok(None)` when the server answers 404, which is how it
    /// reports an unknown rule key. Every other failure is an error.
    pub async fn show_rule(
        &self,
        rule_key: &str,
        auth: Option<&Credentials>,
    ) -> Result<Option<RuleEntry>, Error> {
        debug!(rule_key, "fetching rule");
        match self
            .get_json::<RuleShowResponse>("api/rules/show", &[("key", rule_key.to_owned())], auth)
            .await
        {
            Ok(resp) => Ok(Some(resp.rule)),
            Err(ref e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
