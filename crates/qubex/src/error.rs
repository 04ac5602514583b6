//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use qubex_config::ConfigError;
use qubex_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to server at {url}")]
    #[diagnostic(
        code(qubex::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Try: qubex version --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: qubex_api::Error,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(qubex::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed for {url}")]
    #[diagnostic(
        code(qubex::auth_failed),
        help(
            "Verify your token or username and password.\n\
             Set QUBEX_TOKEN, or pass --token, or configure token_env in your profile."
        )
    )]
    AuthFailed {
        url: String,
        #[source]
        source: qubex_api::Error,
    },

    #[error("Insufficient permissions: {message}")]
    #[diagnostic(
        code(qubex::forbidden),
        help("The credentials are valid but lack 'Browse' permission on this project.")
    )]
    Forbidden { message: String },

    #[error("No password configured for user '{username}' in profile '{profile}'")]
    #[diagnostic(
        code(qubex::no_password),
        help("Set QUBEX_PASSWORD, or configure password_env in the profile.")
    )]
    MissingPassword { username: String, profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("No such project: {key}")]
    #[diagnostic(
        code(qubex::no_such_project),
        help("Run: qubex projects to see available project keys")
    )]
    NoSuchProject { key: String },

    #[error("No such rule in server: {key}")]
    #[diagnostic(
        code(qubex::rule_not_found),
        help("The rule may have been removed from the server since the last analysis.")
    )]
    RuleNotFound { key: String },

    #[error("Measure '{metric}' not available for {project}")]
    #[diagnostic(
        code(qubex::measure_not_found),
        help("The project may not have been analyzed yet.")
    )]
    MeasureNotFound { project: String, metric: String },

    #[error("More than {limit} matching issues in {project}")]
    #[diagnostic(
        code(qubex::too_many_issues),
        help(
            "The server pages through at most {limit} results per search.\n\
             Narrow the query with --severity, --type, --rule, --component or --created-after."
        )
    )]
    TooManyIssues { project: String, limit: u64 },

    #[error("No project given")]
    #[diagnostic(
        code(qubex::no_project),
        help("Pass a project key, or set `project` in the active profile.")
    )]
    NoProject,

    // ── API ──────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(qubex::api_error))]
    Api(qubex_api::Error),

    #[error("Invalid data from server: {message}")]
    #[diagnostic(code(qubex::invalid_data))]
    InvalidData { message: String },

    #[error("Interrupted")]
    #[diagnostic(code(qubex::cancelled))]
    Cancelled,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(qubex::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(qubex::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: qubex config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(qubex::no_config),
        help(
            "Create a config with: qubex config init\n\
             Or pass --server / set QUBEX_SERVER.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(qubex::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(qubex::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {0}")]
    #[diagnostic(code(qubex::prompt))]
    Prompt(#[from] dialoguer::Error),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(qubex::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(qubex::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::MissingPassword { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NoSuchProject { .. }
            | Self::RuleNotFound { .. }
            | Self::MeasureNotFound { .. }
            | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NoProject
            | Self::NoConfig { .. }
            | Self::TooManyIssues { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the server URL and timeout a remote error came from.
    pub fn from_core(err: CoreError, url: &str, timeout_secs: u64) -> Self {
        match err {
            CoreError::AuthorizationFailure { source } => Self::AuthFailed {
                url: url.to_owned(),
                source,
            },
            CoreError::Remote(source) => Self::from_remote(source, url, timeout_secs),
            other => other.into(),
        }
    }

    fn from_remote(source: qubex_api::Error, url: &str, timeout_secs: u64) -> Self {
        let (timed_out, unreachable) = match &source {
            qubex_api::Error::Transport(e) => (e.is_timeout(), e.is_connect()),
            qubex_api::Error::Tls(_) => (false, true),
            _ => (false, false),
        };
        if timed_out {
            return Self::Timeout {
                seconds: timeout_secs,
            };
        }
        if unreachable {
            return Self::ConnectionFailed {
                url: url.to_owned(),
                source,
            };
        }
        match source {
            qubex_api::Error::Forbidden { message } => Self::Forbidden { message },
            other => Self::Api(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoSuchProject { key } => Self::NoSuchProject {
                key: key.to_string(),
            },
            CoreError::AuthorizationFailure { source } => Self::AuthFailed {
                url: "(current server)".into(),
                source,
            },
            CoreError::RuleNotFound { key } => Self::RuleNotFound { key },
            CoreError::MeasureNotFound { project, metric } => Self::MeasureNotFound {
                project: project.to_string(),
                metric,
            },
            CoreError::TooManyIssues { project, limit } => Self::TooManyIssues {
                project: project.to_string(),
                limit,
            },
            CoreError::InvalidData { message } => Self::InvalidData { message },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::Remote(source) => Self::from_remote(source, "(current server)", 0),
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::MissingPassword { username, profile } => {
                Self::MissingPassword { username, profile }
            }
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
