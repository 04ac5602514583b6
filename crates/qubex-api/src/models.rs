// Web API response types
//
// Models for the SonarQube Web API endpoints the client touches. Field names
// follow the server's camelCase JSON. Fields use `#[serde(default)]` where the
// server omits them depending on version or issue kind (file-less issues have
// no `line`, old servers have no `type`).

use serde::{Deserialize, Serialize};

// ── Paging ───────────────────────────────────────────────────────────

/// The `paging` block returned by every paged search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_index: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Paging {
    /// Total number of pages implied by `total` and `page_size`.
    pub fn page_count(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        let pages = self.total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

// ── Error body ───────────────────────────────────────────────────────

/// Error envelope: `{ "errors": [ { "msg": "..." } ] }`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorMessage {
    pub msg: String,
}

impl ErrorResponse {
    /// All messages joined, or `None` if the server sent none.
    pub fn joined(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.msg.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

// ── Issues ───────────────────────────────────────────────────────────

/// Response of `GET /api/issues/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSearchResponse {
    pub paging: Paging,
    #[serde(default)]
    pub issues: Vec<IssueEntry>,
}

/// One issue as returned by `api/issues/search`.
///
/// Dates stay as raw strings: the server emits `2024-01-31T10:00:00+0000`,
/// which is not RFC 3339. `qubex-core` parses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueEntry {
    pub key: String,
    pub rule: String,
    pub component: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub update_date: Option<String>,
}

// ── Rules ────────────────────────────────────────────────────────────

/// Response of `GET /api/rules/show`.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleShowResponse {
    pub rule: RuleEntry,
}

/// Rule metadata as returned by `api/rules/show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, rename = "type")]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub lang_name: Option<String>,
}

// ── Components ───────────────────────────────────────────────────────

/// Response of `GET /api/components/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSearchResponse {
    pub paging: Paging,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qualifier: Option<String>,
}

// ── Measures ─────────────────────────────────────────────────────────

/// Response of `GET /api/measures/component`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasuresResponse {
    pub component: MeasuredComponent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasuredComponent {
    pub key: String,
    #[serde(default)]
    pub measures: Vec<MeasureEntry>,
}

/// A single metric value. The server sends numbers as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureEntry {
    pub metric: String,
    #[serde(default)]
    pub value: Option<String>,
}
