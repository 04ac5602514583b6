// ── Explorer ──
//
// Entry point of the retrieval pipeline. Every operation is one sequential
// series of remote calls: existence check, then paginated issue queries
// with rule resolution. Nothing is cached across operations.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use qubex_api::SonarClient;
use qubex_api::issues::MAX_RESULT_WINDOW;

use crate::classifier::{Classifier, ClassifierType};
use crate::config::{DEFAULT_PAGE_SIZE, ServerConfig, UserCredentials};
use crate::error::CoreError;
use crate::filter::{IssueFilter, IssueQuery};
use crate::model::{RadarIssue, ResourceKey, Version};
use crate::rule_cache::RuleCache;
use crate::server::IssueServer;
use crate::summary::ClassifierSummary;

/// Metric holding a project's rules compliance ratio, in percent.
pub const RULES_COMPLIANCE_METRIC: &str = "violations_density";

/// Issue retrieval and summarization over one server.
///
/// Credentials are passed per call, so one explorer can serve several
/// users or be reused after a credential change.
#[derive(Debug, Clone)]
pub struct Explorer<S> {
    server: S,
    page_size: u32,
    cancel: Option<CancellationToken>,
}

impl Explorer<SonarClient> {
    /// Explorer over a live server described by `config`.
    pub fn connect(config: &ServerConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        Ok(Self::new(client).with_page_size(config.effective_page_size()))
    }
}

impl<S: IssueServer> Explorer<S> {
    pub fn new(server: S) -> Self {
        Self {
            server,
            page_size: DEFAULT_PAGE_SIZE,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Abort operations once `token` is cancelled. Checked before every
    /// page request and every rule lookup.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn check_cancelled(&self) -> Result<(), CoreError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(CoreError::Cancelled),
            _ => Ok(()),
        }
    }

    pub async fn server_version(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Result<Version, CoreError> {
        self.server.server_version(credentials).await
    }

    /// Keys of every project on the server.
    pub async fn project_keys(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Result<Vec<ResourceKey>, CoreError> {
        self.server.list_project_keys(credentials).await
    }

    /// `true` if `project_key` is among the server's projects.
    pub async fn exists_project(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
    ) -> Result<bool, CoreError> {
        let keys = self.server.list_project_keys(credentials).await?;
        let found = keys.contains(project_key);
        debug!(project = %project_key, found, known = keys.len(), "checked project existence");
        Ok(found)
    }

    async fn ensure_project(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
    ) -> Result<(), CoreError> {
        if self.exists_project(credentials, project_key).await? {
            Ok(())
        } else {
            Err(CoreError::NoSuchProject {
                key: project_key.clone(),
            })
        }
    }

    /// All open issues of `project_key` that pass every filter.
    ///
    /// The server pages through at most [`MAX_RESULT_WINDOW`] results of
    /// one search. A query matching more fails with
    /// [`CoreError::TooManyIssues`] after its first page, before any rule
    /// is resolved; narrowing the filters is the only way through.
    pub async fn get_issues(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        filters: &[IssueFilter],
    ) -> Result<Vec<RadarIssue>, CoreError> {
        self.ensure_project(credentials, project_key).await?;
        let issues = self.fetch(credentials, project_key, filters).await?;
        info!(project = %project_key, count = issues.len(), "fetched issues");
        Ok(issues)
    }

    /// Issue fetch without the existence check.
    async fn fetch(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        filters: &[IssueFilter],
    ) -> Result<Vec<RadarIssue>, CoreError> {
        let query = IssueQuery::new(project_key.clone(), self.page_size).apply_all(filters);
        if query.is_unsatisfiable() {
            debug!(project = %project_key, "filters exclude every issue, skipping query");
            return Ok(Vec::new());
        }

        let mut rules = RuleCache::new();
        let mut issues = Vec::new();
        let mut page = 1;

        loop {
            self.check_cancelled()?;
            let query = query.clone().with_page(page);
            let resp = self.server.query_issues(credentials, &query).await?;
            if u64::from(resp.total_pages) * u64::from(query.page_size) > MAX_RESULT_WINDOW {
                return Err(CoreError::TooManyIssues {
                    project: project_key.clone(),
                    limit: MAX_RESULT_WINDOW,
                });
            }

            for record in resp.issues {
                self.check_cancelled()?;
                let rule = rules
                    .resolve(&self.server, credentials, &record.rule_key)
                    .await?;
                issues.push(record.resolve(rule));
            }

            if page >= resp.total_pages {
                break;
            }
            page += 1;
        }

        debug!(
            pages = page,
            issues = issues.len(),
            rule_lookups = rules.lookups(),
            "issue fetch complete"
        );
        Ok(issues)
    }

    /// Count issues per (classifier value, rule) along `dimension`.
    ///
    /// Runs one full fetch per classifier value, with that value's filter
    /// ahead of `filters`. Values that overlap are counted under each.
    pub async fn get_summary<T: ClassifierType>(
        &self,
        dimension: &T,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        filters: &[IssueFilter],
    ) -> Result<ClassifierSummary<T::Classifier>, CoreError> {
        self.ensure_project(credentials, project_key).await?;

        let mut summary = ClassifierSummary::new(dimension.name());
        for value in dimension.values() {
            let mut value_filters = Vec::with_capacity(filters.len() + 1);
            value_filters.push(value.create_filter());
            value_filters.extend_from_slice(filters);

            let issues = self.fetch(credentials, project_key, &value_filters).await?;
            debug!(classifier = %value, count = issues.len(), "classified issues");
            for issue in &issues {
                summary.increment(value, &issue.rule);
            }
        }

        info!(
            project = %project_key,
            dimension = dimension.name(),
            entries = summary.len(),
            "built summary"
        );
        Ok(summary)
    }

    /// The project's rules compliance ratio, in percent.
    pub async fn rules_compliance(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
    ) -> Result<f64, CoreError> {
        self.ensure_project(credentials, project_key).await?;
        self.server
            .get_measure(credentials, project_key, RULES_COMPLIANCE_METRIC)
            .await?
            .ok_or_else(|| CoreError::MeasureNotFound {
                project: project_key.clone(),
                metric: RULES_COMPLIANCE_METRIC.to_owned(),
            })
    }
}
