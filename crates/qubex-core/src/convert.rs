// ── API-to-domain type conversions ──
//
// Bridges raw `qubex_api` wire types into canonical `qubex_core::model`
// types. Optional enum fields the model does not know are dropped; a
// missing issue status or an unknown one is rejected, since every query
// names the statuses it expects back.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};

use qubex_api::models::{IssueEntry, RuleEntry};

use crate::error::CoreError;
use crate::model::{IssueStatus, IssueType, RadarIssue, ResourceKey, Rule, Severity};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a server timestamp (`2024-03-01T09:15:00+0000`), accepting RFC 3339 too.
fn parse_datetime(raw: Option<&String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn parse_opt<T: std::str::FromStr>(raw: Option<&String>) -> Option<T> {
    raw.and_then(|s| s.parse().ok())
}

// ── Rule ───────────────────────────────────────────────────────────

impl From<RuleEntry> for Rule {
    fn from(r: RuleEntry) -> Self {
        Rule {
            name: r.name.unwrap_or_else(|| r.key.clone()),
            default_severity: parse_opt(r.severity.as_ref()),
            rule_type: parse_opt(r.rule_type.as_ref()),
            language: r.lang_name.or(r.lang),
            key: r.key,
        }
    }
}

// ── Issue ──────────────────────────────────────────────────────────

/// An issue as listed by the server, before its rule is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub key: String,
    pub component_key: ResourceKey,
    pub line: Option<u32>,
    pub message: String,
    pub severity: Option<Severity>,
    pub status: IssueStatus,
    pub issue_type: Option<IssueType>,
    pub rule_key: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,
}

impl IssueRecord {
    /// Attach the resolved rule.
    pub fn resolve(self, rule: Arc<Rule>) -> RadarIssue {
        RadarIssue {
            key: self.key,
            component_key: self.component_key,
            line: self.line,
            message: self.message,
            severity: self.severity,
            status: self.status,
            issue_type: self.issue_type,
            rule_key: self.rule_key,
            rule,
            creation_date: self.creation_date,
            update_date: self.update_date,
        }
    }
}

impl TryFrom<IssueEntry> for IssueRecord {
    type Error = CoreError;

    fn try_from(i: IssueEntry) -> Result<Self, Self::Error> {
        let status = i
            .status
            .as_deref()
            .ok_or_else(|| CoreError::InvalidData {
                message: format!("issue {} has no status", i.key),
            })?
            .parse::<IssueStatus>()
            .map_err(|_| CoreError::InvalidData {
                message: format!(
                    "issue {} has unknown status {:?}",
                    i.key,
                    i.status.as_deref().unwrap_or_default()
                ),
            })?;

        Ok(IssueRecord {
            severity: parse_opt(i.severity.as_ref()),
            issue_type: parse_opt(i.issue_type.as_ref()),
            creation_date: parse_datetime(i.creation_date.as_ref()),
            update_date: parse_datetime(i.update_date.as_ref()),
            component_key: ResourceKey::new(i.component),
            line: i.line,
            message: i.message.unwrap_or_default(),
            rule_key: i.rule,
            key: i.key,
            status,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn entry(status: Option<&str>) -> IssueEntry {
        IssueEntry {
            key: "AX1".into(),
            rule: "java:S1481".into(),
            component: "demo:src/Main.java".into(),
            project: Some("demo".into()),
            severity: Some("MINOR".into()),
            status: status.map(Into::into),
            issue_type: Some("CODE_SMELL".into()),
            line: Some(42),
            message: Some("Remove this unused local variable".into()),
            creation_date: Some("2024-03-01T09:15:00+0000".into()),
            update_date: None,
        }
    }

    #[test]
    fn issue_entry_converts() {
        let record = IssueRecord::try_from(entry(Some("OPEN"))).unwrap();
        assert_eq!(record.status, IssueStatus::Open);
        assert_eq!(record.severity, Some(Severity::Minor));
        assert_eq!(record.issue_type, Some(IssueType::CodeSmell));
        assert_eq!(record.component_key.as_str(), "demo:src/Main.java");
        assert_eq!(
            record.creation_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(record.update_date, None);
    }

    #[test]
    fn unknown_status_is_invalid_data() {
        let err = IssueRecord::try_from(entry(Some("ARCHIVED"))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidData { .. }));
        let err = IssueRecord::try_from(entry(None)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidData { .. }));
    }

    #[test]
    fn unknown_severity_is_dropped() {
        let mut raw = entry(Some("OPEN"));
        raw.severity = Some("HIGH".into());
        let record = IssueRecord::try_from(raw).unwrap();
        assert_eq!(record.severity, None);
    }

    #[test]
    fn rfc3339_dates_are_accepted() {
        let parsed = parse_datetime(Some(&"2024-03-01T09:15:00Z".to_string()));
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap()));
    }

    #[test]
    fn rule_entry_converts_with_name_fallback() {
        let rule = Rule::from(RuleEntry {
            key: "java:S1481".into(),
            name: None,
            severity: Some("MAJOR".into()),
            rule_type: Some("BUG".into()),
            lang: Some("java".into()),
            lang_name: Some("Java".into()),
        });
        assert_eq!(rule.name, "java:S1481");
        assert_eq!(rule.default_severity, Some(Severity::Major));
        assert_eq!(rule.rule_type, Some(IssueType::Bug));
        assert_eq!(rule.language.as_deref(), Some("Java"));
    }
}
