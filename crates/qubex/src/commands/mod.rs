//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod compliance;
pub mod config_cmd;
pub mod issues;
pub mod projects;
pub mod summary;
pub mod system;
pub mod util;

use std::io::IsTerminal;

use qubex_api::SonarClient;
use qubex_core::{CoreError, Explorer, NoRecovery, Outcome, RecoveringTask, Request, ResourceKey};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::recovery::PromptRecovery;

/// A connected explorer plus the settings it was built from.
pub struct Session {
    pub explorer: Explorer<SonarClient>,
    pub resolved: Resolved,
}

impl Session {
    pub fn url(&self) -> &str {
        self.resolved.server.url.as_str()
    }

    /// Map a core failure, naming this session's server.
    pub fn error(&self, err: CoreError) -> CliError {
        CliError::from_core(err, self.url(), self.resolved.timeout_secs())
    }

    /// Project named on the command line, else the profile's.
    pub fn project(&self, arg: Option<&str>) -> Result<ResourceKey, CliError> {
        arg.or(self.resolved.project.as_deref())
            .map(ResourceKey::new)
            .ok_or(CliError::NoProject)
    }

    /// Run `request`, prompting for new credentials or another project
    /// when the terminal allows it.
    pub async fn run(
        &self,
        global: &GlobalOpts,
        project: ResourceKey,
        request: &Request,
    ) -> Result<Outcome, CliError> {
        let task = RecoveringTask::new(&self.explorer, self.url());
        let credentials = self.resolved.server.credentials.clone();

        let interactive = !global.no_recover && std::io::stdin().is_terminal();
        let result = if interactive {
            task.run(&mut PromptRecovery, credentials, project.clone(), request)
                .await
        } else {
            task.run(&mut NoRecovery, credentials, project.clone(), request)
                .await
        };
        let outcome = result.map_err(|e| self.error(e))?;

        if outcome.project_key != project && !global.quiet {
            eprintln!(
                "note: ran against project '{}'; pass it explicitly or set `project` in profile '{}'",
                outcome.project_key, self.resolved.profile
            );
        }
        Ok(outcome)
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Issues(args) => issues::handle(session, args, global).await,
        Command::Summary(args) => summary::handle(session, args, global).await,
        Command::Compliance(args) => compliance::handle(session, args, global).await,
        Command::Projects => projects::handle(session, global).await,
        Command::Version => system::version(session, global).await,
        // Handled in main before a session exists.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
