//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use qubex_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Blank out every plaintext secret before printing.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            redact(&mut cfg);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|_| format!("{c:#?}")),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Init { server, force } => init(&server, force, global),
    }
}

fn init(server: &str, force: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path();
    if path.exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.display().to_string(),
        });
    }

    let interactive = std::io::stdin().is_terminal();
    let server = if interactive {
        Input::<String>::new()
            .with_prompt("Server URL")
            .default(server.to_owned())
            .interact_text()?
    } else {
        server.to_owned()
    };
    config::parse_server_url(&server)?;

    let mut cfg = Config::sample(&server);
    if interactive {
        let project: String = Input::new()
            .with_prompt("Default project key (empty for none)")
            .allow_empty(true)
            .interact_text()?;
        if let Some(profile) = cfg.profiles.get_mut("default") {
            profile.project = Some(project).filter(|p| !p.trim().is_empty());
        }
    }

    config::save_config_to(&cfg, &path)?;

    if !global.quiet {
        eprintln!("Configuration written to {}", path.display());
        eprintln!("Set {} to a user token, then try: qubex version", config::TOKEN_ENV);
    }
    Ok(())
}
