//! Server-level information.

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;

pub async fn version(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let version = session
        .explorer
        .server_version(session.resolved.server.credentials.as_ref())
        .await
        .map_err(|e| session.error(e))?;

    let out = output::render_single(
        &global.output,
        &version,
        |v| format!("SonarQube {v} at {}", session.url()),
        ToString::to_string,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
