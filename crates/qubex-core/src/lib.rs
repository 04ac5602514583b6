//! Issue retrieval, classification and summarization over a SonarQube server.
//!
//! This crate sits between `qubex-api` and the CLI:
//!
//! - **[`Explorer`]**: the pipeline entry point. Checks that a project
//!   exists, runs paginated issue queries narrowed by [`IssueFilter`]s,
//!   and resolves each issue's rule through a [`RuleCache`] that lives for
//!   exactly one fetch.
//!
//! - **Summaries**: [`Explorer::get_summary`] re-runs the fetch once per
//!   value of a [`ClassifierType`] and folds the results into a
//!   [`ClassifierSummary`] keyed by (value, rule).
//!
//! - **Errors**: every remote failure passes through the authorization
//!   guard, so a credential rejection always surfaces as
//!   [`CoreError::AuthorizationFailure`] and nothing else does.
//!
//! - **[`RecoveringTask`]**: replays a request after a [`Recovery`]
//!   strategy supplies new credentials or another project key.

pub mod classifier;
pub mod config;
pub mod convert;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod model;
pub mod rule_cache;
pub mod server;
pub mod summary;
pub mod task;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classifier::{Classifier, ClassifierType, IssueTypes, Severities};
pub use config::{ServerConfig, TlsVerification, UserCredentials};
pub use convert::IssueRecord;
pub use error::CoreError;
pub use explorer::{Explorer, RULES_COMPLIANCE_METRIC};
pub use filter::{IssueFilter, IssueQuery};
pub use rule_cache::RuleCache;
pub use server::{IssueServer, IssuesPage};
pub use summary::{ClassifierSummary, Summary, SummaryRow};
pub use task::{Dimension, NoRecovery, Outcome, RecoveringTask, Recovery, Report, Request};

pub use model::{IssueStatus, IssueType, RadarIssue, ResourceKey, Rule, Severity, Version};
