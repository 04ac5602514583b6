// ── Issue domain types ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::resource_key::ResourceKey;
use super::rule::Rule;

/// Issue severity, ordered from least to most severe.
///
/// Parses and prints the server's wire names (`MAJOR`), case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

/// Kind of finding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum IssueType {
    Bug,
    Vulnerability,
    CodeSmell,
    SecurityHotspot,
}

/// Workflow status of an issue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum IssueStatus {
    Open,
    Confirmed,
    Reopened,
    Resolved,
    Closed,
}

impl IssueStatus {
    /// Statuses the server considers unresolved.
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Open | Self::Confirmed | Self::Reopened)
    }
}

/// One issue on a project, with its rule already resolved.
///
/// Built only by the issue fetcher and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarIssue {
    pub key: String,
    pub component_key: ResourceKey,
    /// `None` for issues reported on a whole file or project.
    pub line: Option<u32>,
    pub message: String,
    /// Servers from 10.2 on may omit the legacy severity.
    pub severity: Option<Severity>,
    pub status: IssueStatus,
    pub issue_type: Option<IssueType>,
    pub rule_key: String,
    pub rule: Arc<Rule>,
    pub creation_date: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,
}

impl RadarIssue {
    /// Issue severity, falling back to the rule's default severity.
    pub fn effective_severity(&self) -> Option<Severity> {
        self.severity.or(self.rule.default_severity)
    }
}
