// ── Recovering task ──
//
// Runs one request and, when the server rejects the credentials or does not
// know the project, asks a `Recovery` strategy for a replacement and replays
// the whole request from the start. Any other failure ends the task.

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::classifier::{IssueTypes, Severities};
use crate::config::UserCredentials;
use crate::error::CoreError;
use crate::explorer::Explorer;
use crate::filter::IssueFilter;
use crate::model::{IssueType, RadarIssue, ResourceKey, Severity};
use crate::server::IssueServer;
use crate::summary::ClassifierSummary;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Runtime choice of classification dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Dimension {
    #[default]
    Severity,
    Type,
}

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Summary {
        dimension: Dimension,
        filters: Vec<IssueFilter>,
    },
    Issues {
        filters: Vec<IssueFilter>,
    },
}

/// Result of a request.
#[derive(Debug, Clone)]
pub enum Report {
    BySeverity(ClassifierSummary<Severity>),
    ByType(ClassifierSummary<IssueType>),
    Issues(Vec<RadarIssue>),
}

/// A completed request plus the context it finally ran with.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub report: Report,
    /// Replaced if the strategy supplied new credentials.
    pub credentials: Option<UserCredentials>,
    /// Replaced if the strategy chose another project.
    pub project_key: ResourceKey,
    /// Runs it took, starting at 1.
    pub attempts: u32,
}

/// How to recover from a failed run. Returning `None` gives up.
pub trait Recovery {
    /// The server at `server_url` rejected the current credentials.
    fn credentials_rejected(&mut self, server_url: &str) -> Option<UserCredentials>;

    /// The project is unknown; `known` lists the server's projects.
    fn project_missing(&mut self, known: &[ResourceKey]) -> Option<ResourceKey>;
}

/// Strategy that never recovers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecovery;

impl Recovery for NoRecovery {
    fn credentials_rejected(&mut self, _server_url: &str) -> Option<UserCredentials> {
        None
    }

    fn project_missing(&mut self, _known: &[ResourceKey]) -> Option<ResourceKey> {
        None
    }
}

#[derive(Debug)]
pub struct RecoveringTask<'a, S> {
    explorer: &'a Explorer<S>,
    server_url: String,
    max_attempts: u32,
}

impl<'a, S: IssueServer> RecoveringTask<'a, S> {
    pub fn new(explorer: &'a Explorer<S>, server_url: impl Into<String>) -> Self {
        Self {
            explorer,
            server_url: server_url.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub async fn run<R: Recovery>(
        &self,
        recovery: &mut R,
        mut credentials: Option<UserCredentials>,
        mut project_key: ResourceKey,
        request: &Request,
    ) -> Result<Outcome, CoreError> {
        let mut attempt = 1;
        loop {
            let result = self
                .execute(credentials.as_ref(), &project_key, request)
                .await;
            let err = match result {
                Ok(report) => {
                    if attempt > 1 {
                        info!(attempts = attempt, project = %project_key, "request recovered");
                    }
                    return Ok(Outcome {
                        report,
                        credentials,
                        project_key,
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            if attempt >= self.max_attempts {
                warn!(attempts = attempt, error = %err, "giving up after repeated failures");
                return Err(err);
            }

            let err = match err {
                CoreError::NoSuchProject { .. } => {
                    warn!(project = %project_key, "project not found on server");
                    match self.explorer.project_keys(credentials.as_ref()).await {
                        Ok(known) => {
                            match recovery.project_missing(&known) {
                                Some(key) => project_key = key,
                                None => return Err(err),
                            }
                            attempt += 1;
                            continue;
                        }
                        // Listing the alternatives may itself be refused.
                        Err(listing) => listing,
                    }
                }
                other => other,
            };

            if !err.is_authorization_failure() {
                return Err(err);
            }
            warn!(server = %self.server_url, "credentials rejected");
            match recovery.credentials_rejected(&self.server_url) {
                Some(new) => credentials = Some(new),
                None => return Err(err),
            }
            attempt += 1;
        }
    }

    async fn execute(
        &self,
        credentials: Option<&UserCredentials>,
        project_key: &ResourceKey,
        request: &Request,
    ) -> Result<Report, CoreError> {
        match request {
            Request::Summary {
                dimension: Dimension::Severity,
                filters,
            } => self
                .explorer
                .get_summary(&Severities, credentials, project_key, filters)
                .await
                .map(Report::BySeverity),
            Request::Summary {
                dimension: Dimension::Type,
                filters,
            } => self
                .explorer
                .get_summary(&IssueTypes, credentials, project_key, filters)
                .await
                .map(Report::ByType),
            Request::Issues { filters } => self
                .explorer
                .get_issues(credentials, project_key, filters)
                .await
                .map(Report::Issues),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::testing::{StubServer, issue};

    /// Strategy that replays scripted answers and records what it was asked.
    #[derive(Default)]
    struct Scripted {
        credentials: Vec<UserCredentials>,
        projects: Vec<ResourceKey>,
        offered: Vec<Vec<ResourceKey>>,
        prompts: usize,
    }

    impl Recovery for Scripted {
        fn credentials_rejected(&mut self, _server_url: &str) -> Option<UserCredentials> {
            self.prompts += 1;
            self.credentials.pop()
        }

        fn project_missing(&mut self, known: &[ResourceKey]) -> Option<ResourceKey> {
            self.prompts += 1;
            self.offered.push(known.to_vec());
            self.projects.pop()
        }
    }

    fn user(password: &str) -> UserCredentials {
        UserCredentials::new("admin", SecretString::from(password.to_string()))
    }

    fn server() -> StubServer {
        StubServer::with_project("demo")
            .rule("java:S1")
            .issues([issue("A1", "java:S1", Severity::Major, IssueType::Bug)])
            .requiring_password("good")
    }

    fn issues_request() -> Request {
        Request::Issues {
            filters: Vec::new(),
        }
    }

    #[tokio::test]
    async fn accepted_credentials_replay_the_request() {
        let explorer = Explorer::new(server());
        let task = RecoveringTask::new(&explorer, "https://sonar.example.com");
        let mut recovery = Scripted {
            credentials: vec![user("good")],
            ..Scripted::default()
        };

        let outcome = task
            .run(
                &mut recovery,
                Some(user("bad")),
                ResourceKey::new("demo"),
                &issues_request(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 2);
        assert!(matches!(outcome.report, Report::Issues(ref issues) if issues.len() == 1));
        assert!(outcome.credentials.is_some());
        assert_eq!(recovery.prompts, 1);
    }

    #[tokio::test]
    async fn declining_returns_the_original_error() {
        let explorer = Explorer::new(server());
        let task = RecoveringTask::new(&explorer, "https://sonar.example.com");

        let err = task
            .run(&mut NoRecovery, None, ResourceKey::new("demo"), &issues_request())
            .await
            .unwrap_err();

        assert!(err.is_authorization_failure());
    }

    #[tokio::test]
    async fn missing_project_is_reselected_from_known_keys() {
        let explorer = Explorer::new(server());
        let task = RecoveringTask::new(&explorer, "https://sonar.example.com");
        let mut recovery = Scripted {
            projects: vec![ResourceKey::new("demo")],
            ..Scripted::default()
        };

        let outcome = task
            .run(
                &mut recovery,
                Some(user("good")),
                ResourceKey::new("dmeo"),
                &Request::Summary {
                    dimension: Dimension::Severity,
                    filters: Vec::new(),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.project_key.as_str(), "demo");
        assert_eq!(recovery.offered, vec![vec![ResourceKey::new("demo")]]);
        match outcome.report {
            Report::BySeverity(summary) => {
                assert_eq!(summary.count(Severity::Major, "java:S1"), 1);
            }
            other => panic!("expected severity summary, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_project_listing_asks_for_credentials() {
        // The existence check lists anonymously once, then the password applies.
        let server = StubServer::with_project("demo")
            .rule("java:S1")
            .issues([issue("A1", "java:S1", Severity::Major, IssueType::Bug)])
            .requiring_password("good")
            .open_listings(1);
        let explorer = Explorer::new(server);
        let task = RecoveringTask::new(&explorer, "https://sonar.example.com");
        let mut recovery = Scripted {
            credentials: vec![user("good")],
            projects: vec![ResourceKey::new("demo")],
            ..Scripted::default()
        };

        let outcome = task
            .run(&mut recovery, None, ResourceKey::new("dmeo"), &issues_request())
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.project_key.as_str(), "demo");
        assert!(outcome.credentials.is_some());
        assert_eq!(recovery.prompts, 2);
        assert_eq!(recovery.offered, vec![vec![ResourceKey::new("demo")]]);
    }

    #[tokio::test]
    async fn refused_project_listing_without_new_credentials_fails() {
        let server = server().open_listings(1);
        let explorer = Explorer::new(server);
        let task = RecoveringTask::new(&explorer, "https://sonar.example.com");
        let mut recovery = Scripted {
            projects: vec![ResourceKey::new("demo")],
            ..Scripted::default()
        };

        let err = task
            .run(&mut recovery, None, ResourceKey::new("dmeo"), &issues_request())
            .await
            .unwrap_err();

        assert!(err.is_authorization_failure());
        assert_eq!(recovery.prompts, 1);
        assert!(recovery.offered.is_empty());
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let explorer = Explorer::new(server());
        let task = RecoveringTask::new(&explorer, "https://sonar.example.com").with_max_attempts(2);
        let mut recovery = Scripted {
            credentials: vec![user("worse"), user("still-bad")],
            ..Scripted::default()
        };

        let err = task
            .run(
                &mut recovery,
                Some(user("bad")),
                ResourceKey::new("demo"),
                &issues_request(),
            )
            .await
            .unwrap_err();

        assert!(err.is_authorization_failure());
        assert_eq!(recovery.prompts, 1);
    }

    #[test]
    fn dimension_parses_lowercase() {
        assert_eq!("type".parse::<Dimension>().ok(), Some(Dimension::Type));
        assert_eq!("Severity".parse::<Dimension>().ok(), Some(Dimension::Severity));
        assert_eq!(Dimension::Type.to_string(), "type");
    }
}
