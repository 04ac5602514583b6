// ── Core error types ──
//
// Domain errors from qubex-core. Remote failures are classified here, at
// the point each call returns: an authorization rejection becomes
// `AuthorizationFailure`, everything else is carried unchanged in `Remote`.

use thiserror::Error;

use crate::model::ResourceKey;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Recoverable by the caller ────────────────────────────────────
    /// The project key is not among the server's projects.
    #[error("No such project: {key}")]
    NoSuchProject { key: ResourceKey },

    /// The server rejected the credentials on some call.
    ///
    /// The only kind a caller should answer with "get new credentials and
    /// retry". The core never retries by itself.
    #[error("Authorization failed: {source}")]
    AuthorizationFailure {
        #[source]
        source: qubex_api::Error,
    },

    // ── Fatal ────────────────────────────────────────────────────────
    /// An issue references a rule the server cannot resolve.
    #[error("No such rule in server: {key}")]
    RuleNotFound { key: String },

    /// The project has no value for the requested metric.
    #[error("Measure '{metric}' not available for {project}")]
    MeasureNotFound { project: ResourceKey, metric: String },

    /// The server sent a value the domain model cannot represent.
    #[error("Invalid data from server: {message}")]
    InvalidData { message: String },

    /// The query matches more issues than the server pages through.
    #[error("More than {limit} matching issues in {project}")]
    TooManyIssues { project: ResourceKey, limit: u64 },

    /// The request was cancelled between two remote calls.
    #[error("Request cancelled")]
    Cancelled,

    // ── Pass-through ─────────────────────────────────────────────────
    /// Any other remote failure, uninterpreted.
    #[error(transparent)]
    Remote(qubex_api::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// `true` for the one error kind that new credentials may fix.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::AuthorizationFailure { .. })
    }

    /// `true` if the caller can recover by choosing another project.
    pub fn is_no_such_project(&self) -> bool {
        matches!(self, Self::NoSuchProject { .. })
    }
}

// ── Authorization guard ──────────────────────────────────────────────

impl From<qubex_api::Error> for CoreError {
    fn from(err: qubex_api::Error) -> Self {
        if err.is_unauthorized() {
            CoreError::AuthorizationFailure { source: err }
        } else {
            CoreError::Remote(err)
        }
    }
}
