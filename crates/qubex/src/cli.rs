//! Clap derive structures for the `qubex` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

use qubex_core::{Dimension, IssueStatus, IssueType, Severity};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// qubex -- explore SonarQube issues from the command line
#[derive(Debug, Parser)]
#[command(
    name = "qubex",
    version,
    about = "Explore SonarQube issues, rule summaries, and compliance",
    long_about = "Fetches open issues for a SonarQube project, resolves their rules,\n\
        and summarizes them by severity or issue type.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "QUBEX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "QUBEX_SERVER", global = true)]
    pub server: Option<String>,

    /// Username (password from QUBEX_PASSWORD or prompt)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// User token (overrides username)
    #[arg(long, global = true, hide_env = true, env = "QUBEX_TOKEN")]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "QUBEX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "QUBEX_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "QUBEX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Fail instead of prompting for new credentials or another project
    #[arg(long, global = true)]
    pub no_recover: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List open issues of a project
    #[command(alias = "i")]
    Issues(IssuesArgs),

    /// Count issues per rule, by severity or type
    #[command(alias = "sum")]
    Summary(SummaryArgs),

    /// Show a project's rules compliance ratio
    Compliance(ProjectArg),

    /// List project keys on the server
    Projects,

    /// Show the server version
    Version,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProjectArg {
    /// Project key (defaults to the profile's project)
    pub project: Option<String>,
}

/// Issue restrictions shared by `issues` and `summary`.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Only these severities (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = parse_wire::<Severity>)]
    pub severity: Vec<Severity>,

    /// Only these issue types (comma-separated)
    #[arg(long = "type", value_delimiter = ',', value_parser = parse_wire::<IssueType>)]
    pub issue_type: Vec<IssueType>,

    /// Statuses to include instead of OPEN (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = parse_wire::<IssueStatus>)]
    pub status: Vec<IssueStatus>,

    /// Only these rule keys (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rule: Vec<String>,

    /// Only these component keys (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub component: Vec<String>,

    /// Only issues created after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub created_after: Option<String>,

    /// Only issues created before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub created_before: Option<String>,
}

/// Parse a server wire name (`MAJOR`, `code_smell`) into a domain enum.
fn parse_wire<T: FromStr>(raw: &str) -> Result<T, String> {
    raw.trim()
        .replace('-', "_")
        .parse()
        .map_err(|_| format!("unknown value '{raw}'"))
}

// ── Issues ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IssuesArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    #[command(flatten)]
    pub filters: FilterArgs,
}

// ── Summary ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Dimension to classify by
    #[arg(long, default_value = "severity", value_parser = parse_dimension)]
    pub by: Dimension,

    #[command(flatten)]
    pub filters: FilterArgs,
}

fn parse_dimension(raw: &str) -> Result<Dimension, String> {
    raw.parse()
        .map_err(|_| format!("unknown dimension '{raw}', expected 'severity' or 'type'"))
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file
    Init {
        /// Server URL for the default profile
        #[arg(long, default_value = "http://localhost:9000")]
        server: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filters_parse_wire_names() {
        let cli = Cli::parse_from([
            "qubex",
            "issues",
            "demo",
            "--severity",
            "major,blocker",
            "--type",
            "code-smell",
        ]);
        let Command::Issues(args) = cli.command else {
            panic!("expected issues command");
        };
        assert_eq!(args.project.project.as_deref(), Some("demo"));
        assert_eq!(args.filters.severity, vec![Severity::Major, Severity::Blocker]);
        assert_eq!(args.filters.issue_type, vec![IssueType::CodeSmell]);
    }

    #[test]
    fn summary_defaults_to_severity() {
        let cli = Cli::parse_from(["qubex", "summary"]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary command");
        };
        assert_eq!(args.by, Dimension::Severity);
        assert!(args.project.project.is_none());
    }
}
