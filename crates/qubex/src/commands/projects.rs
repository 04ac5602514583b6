use tabled::Tabled;

use qubex_core::ResourceKey;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Key")]
    key: String,
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let keys: Vec<ResourceKey> = session
        .explorer
        .project_keys(session.resolved.server.credentials.as_ref())
        .await
        .map_err(|e| session.error(e))?;

    let out = output::render_list(
        &global.output,
        &keys,
        |k| ProjectRow { key: k.to_string() },
        ToString::to_string,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
