//! Per-rule issue counts by severity or type.

use serde::Serialize;

use qubex_core::{
    ClassifierSummary, ClassifierType, IssueTypes, Report, Request, Severities, Summary,
    SummaryRow,
};

use crate::cli::{GlobalOpts, OutputFormat, SummaryArgs};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Serialize)]
struct SummaryView {
    project: String,
    dimension: &'static str,
    total: u64,
    entries: Vec<SummaryRow>,
}

pub async fn handle(
    session: &Session,
    args: SummaryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let project = session.project(args.project.project.as_deref())?;
    let request = Request::Summary {
        dimension: args.by,
        filters: util::filters(&args.filters)?,
    };

    let outcome = session.run(global, project, &request).await?;
    let out = render_report(outcome.report, outcome.project_key.to_string(), &global.output)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_report(
    report: Report,
    project: String,
    format: &OutputFormat,
) -> Result<String, CliError> {
    match report {
        Report::BySeverity(summary) => render(&Severities, &summary, project, format),
        Report::ByType(summary) => render(&IssueTypes, &summary, project, format),
        Report::Issues(_) => Err(CliError::InvalidData {
            message: "expected a summary report, got an issue list".into(),
        }),
    }
}

fn render<T: ClassifierType>(
    dimension: &T,
    summary: &ClassifierSummary<T::Classifier>,
    project: String,
    format: &OutputFormat,
) -> Result<String, CliError> {
    let view = SummaryView {
        project,
        dimension: summary.dimension(),
        total: summary.total(),
        entries: summary.to_rows(),
    };
    output::render_single(
        format,
        &view,
        |v| {
            if summary.is_empty() {
                format!("No open issues in {}", v.project)
            } else {
                matrix(dimension, summary)
            }
        },
        |v| {
            v.entries
                .iter()
                .map(|row| format!("{}\t{}\t{}", row.classifier, row.rule_key, row.count))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

/// Rules down, classifier values across, with totals on both axes.
fn matrix<T: ClassifierType>(dimension: &T, summary: &ClassifierSummary<T::Classifier>) -> String {
    let values = dimension.values();

    let mut header = vec!["Rule".to_owned(), "Name".to_owned()];
    header.extend(values.iter().map(ToString::to_string));
    header.push("Total".into());

    let mut rows: Vec<Vec<String>> = summary
        .rules()
        .into_iter()
        .map(|rule| {
            let mut row = vec![rule.key.clone(), rule.name.clone()];
            row.extend(values.iter().map(|v| cell(summary.count(*v, &rule.key))));
            row.push(summary.count_for_rule(&rule.key).to_string());
            row
        })
        .collect();

    let mut totals = vec!["Total".to_owned(), String::new()];
    totals.extend(values.iter().map(|v| cell(summary.total_for(*v))));
    totals.push(summary.total().to_string());
    rows.push(totals);

    output::render_grid(header, rows)
}

fn cell(n: u64) -> String {
    if n == 0 { "-".into() } else { n.to_string() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qubex_core::{Rule, Severity};

    use super::*;

    #[test]
    fn matrix_has_a_column_per_value_and_totals() {
        let mut summary = ClassifierSummary::new("severity");
        let rule = Arc::new(Rule::new("java:S1", "Unused variable"));
        summary.increment(Severity::Major, &rule);
        summary.increment(Severity::Major, &rule);
        summary.increment(Severity::Blocker, &rule);

        let out = matrix(&Severities, &summary);
        for header in ["BLOCKER", "CRITICAL", "MAJOR", "MINOR", "INFO", "Total"] {
            assert!(out.contains(header), "missing column {header}");
        }
        assert!(out.contains("java:S1"));
        assert!(out.contains("Unused variable"));
        assert!(out.contains('3'));
    }

    #[test]
    fn plain_output_is_tab_separated() {
        let mut summary = ClassifierSummary::new("type");
        let rule = Arc::new(Rule::new("java:S2", "Null dereference"));
        summary.increment(qubex_core::IssueType::Bug, &rule);

        let out = render(&IssueTypes, &summary, "demo".into(), &OutputFormat::Plain);
        assert_eq!(out.ok().as_deref(), Some("BUG\tjava:S2\t1"));
    }

    #[test]
    fn issue_list_is_not_rendered_as_a_summary() {
        let out = render_report(Report::Issues(Vec::new()), "demo".into(), &OutputFormat::Table);
        assert!(matches!(out, Err(CliError::InvalidData { .. })));
    }
}
