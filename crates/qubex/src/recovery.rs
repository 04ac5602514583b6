//! Interactive recovery: asks the user for new credentials or another
//! project when a request fails with a recoverable error.

use dialoguer::{Input, Select};
use secrecy::SecretString;
use tracing::warn;

use qubex_core::{Recovery, ResourceKey, UserCredentials};

/// Prompts on the terminal. An empty answer or a prompt failure gives up.
#[derive(Debug, Default)]
pub struct PromptRecovery;

impl PromptRecovery {
    fn ask_credentials(server_url: &str) -> Result<Option<UserCredentials>, dialoguer::Error> {
        eprintln!("The server at {server_url} rejected the credentials.");
        let username: String = Input::new()
            .with_prompt("Username or token (empty to give up)")
            .allow_empty(true)
            .interact_text()?;
        let username = username.trim().to_owned();
        if username.is_empty() {
            return Ok(None);
        }

        let password = rpassword::prompt_password("Password (empty for a token): ")?;
        let credentials = if password.is_empty() {
            UserCredentials::token(&SecretString::from(username))
        } else {
            UserCredentials::new(username, SecretString::from(password))
        };
        Ok(Some(credentials))
    }

    fn ask_project(known: &[ResourceKey]) -> Result<Option<ResourceKey>, dialoguer::Error> {
        if known.is_empty() {
            eprintln!("The server has no projects visible to these credentials.");
            return Ok(None);
        }
        let mut items: Vec<&str> = known.iter().map(ResourceKey::as_str).collect();
        items.push("(cancel)");

        let choice = Select::new()
            .with_prompt("Project not found. Pick one")
            .items(&items)
            .default(0)
            .interact_opt()?;
        Ok(choice.and_then(|i| known.get(i).cloned()))
    }
}

impl Recovery for PromptRecovery {
    fn credentials_rejected(&mut self, server_url: &str) -> Option<UserCredentials> {
        Self::ask_credentials(server_url).unwrap_or_else(|e| {
            warn!(error = %e, "credential prompt failed");
            None
        })
    }

    fn project_missing(&mut self, known: &[ResourceKey]) -> Option<ResourceKey> {
        Self::ask_project(known).unwrap_or_else(|e| {
            warn!(error = %e, "project prompt failed");
            None
        })
    }
}
