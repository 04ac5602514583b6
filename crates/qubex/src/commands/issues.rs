//! Issue listing.

use serde::Serialize;
use tabled::Tabled;

use qubex_core::{RadarIssue, Report, Request};

use crate::cli::{GlobalOpts, IssuesArgs};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    issue_type: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Structured output shape: the issue plus its rule's display name.
#[derive(Serialize)]
struct IssueView<'a> {
    #[serde(flatten)]
    issue: &'a RadarIssue,
    rule_name: &'a str,
}

fn location(issue: &RadarIssue) -> String {
    match issue.line {
        Some(line) => format!("{}:{line}", issue.component_key),
        None => issue.component_key.to_string(),
    }
}

pub async fn handle(
    session: &Session,
    args: IssuesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let project = session.project(args.project.project.as_deref())?;
    let request = Request::Issues {
        filters: util::filters(&args.filters)?,
    };

    let outcome = session.run(global, project, &request).await?;
    let Report::Issues(issues) = outcome.report else {
        return Err(CliError::InvalidData {
            message: "expected an issue list, got a summary report".into(),
        });
    };

    let color = output::should_color(&global.color);
    let views: Vec<IssueView<'_>> = issues
        .iter()
        .map(|issue| IssueView {
            issue,
            rule_name: &issue.rule.name,
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &views,
        |v| IssueRow {
            key: v.issue.key.clone(),
            severity: output::paint_severity(v.issue.effective_severity(), color),
            issue_type: v
                .issue
                .issue_type
                .map_or_else(|| "-".into(), |t| t.to_string()),
            rule: v.issue.rule_key.clone(),
            location: location(v.issue),
            message: v.issue.message.clone(),
        },
        |v| v.issue.key.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if !global.quiet && matches!(global.output, crate::cli::OutputFormat::Table) {
        eprintln!("{} issue(s) in {}", issues.len(), outcome.project_key);
    }
    Ok(())
}
