// ── Rule metadata ──

use serde::{Deserialize, Serialize};

use super::issue::{IssueType, Severity};

/// A class of finding as described by the server (`java:S1481`,
/// "Unused local variables should be removed").
///
/// Immutable once fetched. Issues hold it as `Arc<Rule>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub key: String,
    pub name: String,
    /// Severity the rule assigns to new issues unless overridden.
    pub default_severity: Option<Severity>,
    pub rule_type: Option<IssueType>,
    pub language: Option<String>,
}

impl Rule {
    /// Rule with only a key and name. Handy for stubs and tests.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            default_severity: None,
            rule_type: None,
            language: None,
        }
    }
}
