// ── Remote capability ──
//
// The narrow set of server operations the pipeline needs. `SonarClient`
// is the production implementation; tests drive the pipeline through
// in-memory stand-ins. Every api error crosses into `CoreError` through
// the authorization guard (`From<qubex_api::Error>`).

use std::future::Future;

use tracing::debug;

use qubex_api::SonarClient;

use crate::config::UserCredentials;
use crate::convert::IssueRecord;
use crate::error::CoreError;
use crate::filter::IssueQuery;
use crate::model::{ResourceKey, Rule, Version};

/// One page of an issue query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuesPage {
    pub issues: Vec<IssueRecord>,
    /// Total pages the server reports for the whole query.
    pub total_pages: u32,
}

/// Operations the pipeline performs against a server.
pub trait IssueServer: Send + Sync {
    fn server_version(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> impl Future<Output = Result<Version, CoreError>> + Send;

    /// Keys of every project visible with these credentials.
    fn list_project_keys(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> impl Future<Output = Result<Vec<ResourceKey>, CoreError>> + Send;

    /// Fetch the page `query.page_index` of `query`.
    fn query_issues(
        &self,
        credentials: Option<&UserCredentials>,
        query: &IssueQuery,
    ) -> impl Future<Output = Result<IssuesPage, CoreError>> + Send;

    /// `None` if the server has no rule with this key.
    fn lookup_rule(
        &self,
        credentials: Option<&UserCredentials>,
        rule_key: &str,
    ) -> impl Future<Output = Result<Option<Rule>, CoreError>> + Send;

    /// `None` if the component has no value for this metric.
    fn get_measure(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        metric: &str,
    ) -> impl Future<Output = Result<Option<f64>, CoreError>> + Send;
}

impl IssueServer for SonarClient {
    async fn server_version(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Result<Version, CoreError> {
        let auth = credentials.map(UserCredentials::to_api);
        let raw = SonarClient::server_version(self, auth.as_ref()).await?;
        raw.parse::<Version>()
            .map_err(|_| CoreError::Remote(qubex_api::Error::InvalidVersion(raw)))
    }

    async fn list_project_keys(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Result<Vec<ResourceKey>, CoreError> {
        let auth = credentials.map(UserCredentials::to_api);
        let projects = self.list_projects(auth.as_ref()).await?;
        Ok(projects
            .into_iter()
            .map(|p| ResourceKey::new(p.key))
            .collect())
    }

    async fn query_issues(
        &self,
        credentials: Option<&UserCredentials>,
        query: &IssueQuery,
    ) -> Result<IssuesPage, CoreError> {
        let auth = credentials.map(UserCredentials::to_api);
        let resp = self.search_issues(&query.to_search(), auth.as_ref()).await?;
        let total_pages = resp.paging.page_count();
        let issues = resp
            .issues
            .into_iter()
            .map(IssueRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            page = query.page_index,
            total_pages,
            count = issues.len(),
            "received issue page"
        );
        Ok(IssuesPage {
            issues,
            total_pages,
        })
    }

    async fn lookup_rule(
        &self,
        credentials: Option<&UserCredentials>,
        rule_key: &str,
    ) -> Result<Option<Rule>, CoreError> {
        let auth = credentials.map(UserCredentials::to_api);
        Ok(self.show_rule(rule_key, auth.as_ref()).await?.map(Rule::from))
    }

    async fn get_measure(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        metric: &str,
    ) -> Result<Option<f64>, CoreError> {
        let auth = credentials.map(UserCredentials::to_api);
        let raw = self
            .component_measure(project_key.as_str(), metric, auth.as_ref())
            .await?;
        raw.map(|value| {
            value.parse::<f64>().map_err(|_| CoreError::InvalidData {
                message: format!("measure {metric} is not numeric: {value:?}"),
            })
        })
        .transpose()
    }
}
