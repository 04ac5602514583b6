// Component measures endpoint

use tracing::debug;

use crate::auth::Credentials;
use crate::client::SonarClient;
use crate::error::Error;
use crate::models::MeasuresResponse;

impl SonarClient {
    /// Fetch the raw value of one metric for a component.
    ///
    /// `GET /api/measures/component?component={key}&metricKeys={metric}`
    ///
    /// Returns `Ok(None)` if the component exists but has no value for the
    /// metric (never analysed, or metric not computed on this server).
    pub async fn component_measure(
        &self,
        component: &str,
        metric: &str,
        auth: Option<&Credentials>,
    ) -> Result<Option<String>, Error> {
        debug!(component, metric, "fetching measure");
        let resp: MeasuresResponse = self
            .get_json(
                "api/measures/component",
                &[
                    ("component", component.to_owned()),
                    ("metricKeys", metric.to_owned()),
                ],
                auth,
            )
            .await?;

        Ok(resp
            .component
            .measures
            .into_iter()
            .find(|m| m.metric == metric)
            .and_then(|m| m.value))
    }
}
