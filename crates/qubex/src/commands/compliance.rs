use serde::Serialize;

use crate::cli::{GlobalOpts, ProjectArg};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
struct Compliance {
    project: String,
    metric: &'static str,
    value: f64,
}

pub async fn handle(
    session: &Session,
    args: ProjectArg,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let project = session.project(args.project.as_deref())?;
    let value = session
        .explorer
        .rules_compliance(session.resolved.server.credentials.as_ref(), &project)
        .await
        .map_err(|e| session.error(e))?;

    let data = Compliance {
        project: project.to_string(),
        metric: qubex_core::RULES_COMPLIANCE_METRIC,
        value,
    };
    let out = output::render_single(
        &global.output,
        &data,
        |c| format!("Rules compliance for {}: {:.1}%", c.project, c.value),
        |c| format!("{}", c.value),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
