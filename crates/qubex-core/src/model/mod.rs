// ── Domain model ──
//
// Canonical types produced by the core: issues with their resolved rules,
// the enums they are classified by, and the identifiers that tie them to
// projects on the server.

pub mod issue;
pub mod resource_key;
pub mod rule;
pub mod version;

pub use issue::{IssueStatus, IssueType, RadarIssue, Severity};
pub use resource_key::ResourceKey;
pub use rule::Rule;
pub use version::Version;
