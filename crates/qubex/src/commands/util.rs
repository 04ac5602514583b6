//! Shared helpers for command handlers.

use chrono::{DateTime, NaiveDate, Utc};

use qubex_core::IssueFilter;

use crate::cli::FilterArgs;
use crate::error::CliError;

/// Translate filter flags into core filters, in a fixed order.
pub fn filters(args: &FilterArgs) -> Result<Vec<IssueFilter>, CliError> {
    let mut out = Vec::new();
    if !args.status.is_empty() {
        out.push(IssueFilter::Status(args.status.clone()));
    }
    if !args.severity.is_empty() {
        out.push(IssueFilter::Severity(args.severity.clone()));
    }
    if !args.issue_type.is_empty() {
        out.push(IssueFilter::Type(args.issue_type.clone()));
    }
    if !args.rule.is_empty() {
        out.push(IssueFilter::Rule(args.rule.clone()));
    }
    if !args.component.is_empty() {
        out.push(IssueFilter::Component(args.component.clone()));
    }
    if let Some(ref raw) = args.created_after {
        out.push(IssueFilter::CreatedAfter(parse_date("created-after", raw)?));
    }
    if let Some(ref raw) = args.created_before {
        out.push(IssueFilter::CreatedBefore(parse_date("created-before", raw)?));
    }
    Ok(out)
}

/// Accept RFC 3339 timestamps or plain dates (midnight UTC).
pub fn parse_date(field: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("expected YYYY-MM-DD or RFC 3339, got '{raw}'"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use qubex_core::{IssueStatus, Severity};

    use super::*;

    #[test]
    fn plain_date_is_midnight_utc() {
        let dt = parse_date("created-after", "2024-03-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_keeps_offset() {
        let dt = parse_date("created-after", "2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn garbage_date_is_a_validation_error() {
        let err = parse_date("created-before", "yesterday").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "created-before"));
    }

    #[test]
    fn empty_flags_give_no_filters() {
        assert!(filters(&FilterArgs::default()).unwrap().is_empty());
    }

    #[test]
    fn status_comes_first() {
        let args = FilterArgs {
            severity: vec![Severity::Major],
            status: vec![IssueStatus::Confirmed],
            ..FilterArgs::default()
        };
        let out = filters(&args).unwrap();
        assert_eq!(
            out,
            vec![
                IssueFilter::Status(vec![IssueStatus::Confirmed]),
                IssueFilter::Severity(vec![Severity::Major]),
            ]
        );
    }
}
