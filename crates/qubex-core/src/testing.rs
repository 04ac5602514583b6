// In-memory `IssueServer` for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;

use crate::config::UserCredentials;
use crate::convert::IssueRecord;
use crate::error::CoreError;
use crate::filter::IssueQuery;
use crate::model::{IssueStatus, IssueType, ResourceKey, Rule, Severity, Version};
use crate::server::{IssueServer, IssuesPage};

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub project_lists: usize,
    /// Page index of every issue query, in order.
    pub pages: Vec<u32>,
    pub rule_lookups: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct StubServer {
    pub projects: Vec<ResourceKey>,
    pub issues: Vec<IssueRecord>,
    pub rules: HashMap<String, Rule>,
    pub measures: HashMap<String, f64>,
    /// When set, only this password is accepted.
    pub password: Option<String>,
    /// The first `n` project listings skip the password check.
    pub open_listings: usize,
    /// Issue page answered with a 500.
    pub failing_page: Option<u32>,
    /// Cancelled once the given page has been served.
    pub cancel_after: Option<(u32, CancellationToken)>,
    /// Page count reported instead of the real one.
    pub reported_pages: Option<u32>,
    pub calls: Mutex<Calls>,
}

pub(crate) fn issue(key: &str, rule: &str, severity: Severity, issue_type: IssueType) -> IssueRecord {
    IssueRecord {
        key: key.to_owned(),
        component_key: ResourceKey::new("demo:src/Main.java"),
        line: Some(1),
        message: format!("issue {key}"),
        severity: Some(severity),
        status: IssueStatus::Open,
        issue_type: Some(issue_type),
        rule_key: rule.to_owned(),
        creation_date: None,
        update_date: None,
    }
}

impl StubServer {
    pub fn with_project(key: &str) -> Self {
        Self {
            projects: vec![ResourceKey::new(key)],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rule(mut self, key: &str) -> Self {
        self.rules
            .insert(key.to_owned(), Rule::new(key, format!("Rule {key}")));
        self
    }

    #[must_use]
    pub fn issues(mut self, issues: impl IntoIterator<Item = IssueRecord>) -> Self {
        self.issues.extend(issues);
        self
    }

    #[must_use]
    pub fn requiring_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_owned());
        self
    }

    #[must_use]
    pub fn open_listings(mut self, n: usize) -> Self {
        self.open_listings = n;
        self
    }

    #[must_use]
    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    #[must_use]
    pub fn cancelling_after(mut self, page: u32, token: CancellationToken) -> Self {
        self.cancel_after = Some((page, token));
        self
    }

    #[must_use]
    pub fn reporting_pages(mut self, pages: u32) -> Self {
        self.reported_pages = Some(pages);
        self
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }

    fn authorize(&self, credentials: Option<&UserCredentials>) -> Result<(), CoreError> {
        let Some(expected) = &self.password else {
            return Ok(());
        };
        match credentials {
            Some(c) if c.secret.expose_secret() == expected => Ok(()),
            _ => Err(qubex_api::Error::Unauthorized { status: 401 }.into()),
        }
    }

    fn matches(query: &IssueQuery, issue: &IssueRecord) -> bool {
        fn allowed<T: PartialEq>(set: Option<&[T]>, value: Option<&T>) -> bool {
            set.is_none_or(|s| value.is_some_and(|v| s.contains(v)))
        }
        query.statuses().contains(&issue.status)
            && allowed(query.severities(), issue.severity.as_ref())
            && allowed(query.types(), issue.issue_type.as_ref())
            && allowed(query.rules(), Some(&issue.rule_key))
            && allowed(
                query.components(),
                Some(&issue.component_key.as_str().to_owned()),
            )
    }
}

impl IssueServer for StubServer {
    async fn server_version(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Result<Version, CoreError> {
        self.authorize(credentials)?;
        "10.4.1.88267"
            .parse()
            .map_err(|_| CoreError::InvalidData {
                message: "bad stub version".into(),
            })
    }

    async fn list_project_keys(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Result<Vec<ResourceKey>, CoreError> {
        let listed = {
            let mut calls = self.calls();
            calls.project_lists += 1;
            calls.project_lists
        };
        if listed > self.open_listings {
            self.authorize(credentials)?;
        }
        Ok(self.projects.clone())
    }

    async fn query_issues(
        &self,
        credentials: Option<&UserCredentials>,
        query: &IssueQuery,
    ) -> Result<IssuesPage, CoreError> {
        self.calls().pages.push(query.page_index);
        self.authorize(credentials)?;
        if self.failing_page == Some(query.page_index) {
            return Err(qubex_api::Error::Api {
                status: 500,
                message: "boom".into(),
            }
            .into());
        }
        let selected: Vec<_> = self
            .issues
            .iter()
            .filter(|i| Self::matches(query, i))
            .cloned()
            .collect();
        let size = query.page_size as usize;
        let total_pages = u32::try_from(selected.len().div_ceil(size)).unwrap();
        let start = (query.page_index as usize - 1) * size;
        let issues = selected.into_iter().skip(start).take(size).collect();
        if let Some((page, token)) = &self.cancel_after {
            if *page == query.page_index {
                token.cancel();
            }
        }
        Ok(IssuesPage {
            issues,
            total_pages: self.reported_pages.unwrap_or(total_pages),
        })
    }

    async fn lookup_rule(
        &self,
        credentials: Option<&UserCredentials>,
        rule_key: &str,
    ) -> Result<Option<Rule>, CoreError> {
        self.calls().rule_lookups.push(rule_key.to_owned());
        self.authorize(credentials)?;
        Ok(self.rules.get(rule_key).cloned())
    }

    async fn get_measure(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        metric: &str,
    ) -> Result<Option<f64>, CoreError> {
        self.authorize(credentials)?;
        Ok(self
            .measures
            .get(&format!("{project_key}/{metric}"))
            .copied())
    }
}
