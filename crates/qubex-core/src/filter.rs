// ── Filter pipeline ──
//
// An `IssueQuery` starts as "open issues of one project" and is narrowed by
// each `IssueFilter` in turn. Every restricted field holds a value set;
// restricting an already restricted field keeps the intersection. A query
// whose intersection became empty is unsatisfiable and is never sent.

use std::fmt;

use chrono::{DateTime, Utc};

use qubex_api::IssueSearch;

use crate::model::{IssueStatus, IssueType, ResourceKey, Severity};

/// Timestamp format the server accepts for `createdAfter`/`createdBefore`.
const WIRE_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%z";

/// One restriction on an issue query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueFilter {
    /// Keep issues with any of these severities.
    Severity(Vec<Severity>),
    /// Keep issues of any of these types.
    Type(Vec<IssueType>),
    /// Keep issues in any of these statuses. The first status filter
    /// replaces the default open-only set; later ones intersect.
    Status(Vec<IssueStatus>),
    /// Keep issues on any of these components (files, directories).
    Component(Vec<String>),
    /// Keep issues raised by any of these rule keys.
    Rule(Vec<String>),
    CreatedAfter(DateTime<Utc>),
    CreatedBefore(DateTime<Utc>),
}

impl fmt::Display for IssueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(values: &[T]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }
        match self {
            Self::Severity(v) => write!(f, "severity={}", list(v)),
            Self::Type(v) => write!(f, "type={}", list(v)),
            Self::Status(v) => write!(f, "status={}", list(v)),
            Self::Component(v) => write!(f, "component={}", list(v)),
            Self::Rule(v) => write!(f, "rule={}", list(v)),
            Self::CreatedAfter(d) => write!(f, "created>{}", d.to_rfc3339()),
            Self::CreatedBefore(d) => write!(f, "created<{}", d.to_rfc3339()),
        }
    }
}

/// A fully composed issue query for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub project_key: ResourceKey,
    pub page_size: u32,
    /// 1-based.
    pub page_index: u32,
    statuses: Vec<IssueStatus>,
    default_statuses: bool,
    severities: Option<Vec<Severity>>,
    types: Option<Vec<IssueType>>,
    components: Option<Vec<String>>,
    rules: Option<Vec<String>>,
    created_after: Option<DateTime<Utc>>,
    created_before: Option<DateTime<Utc>>,
}

impl IssueQuery {
    /// Open issues of `project_key`, first page.
    pub fn new(project_key: ResourceKey, page_size: u32) -> Self {
        Self {
            project_key,
            page_size,
            page_index: 1,
            statuses: vec![IssueStatus::Open],
            default_statuses: true,
            severities: None,
            types: None,
            components: None,
            rules: None,
            created_after: None,
            created_before: None,
        }
    }

    /// Narrow this query by one filter.
    #[must_use]
    pub fn apply(mut self, filter: &IssueFilter) -> Self {
        match filter {
            IssueFilter::Severity(values) => restrict(&mut self.severities, values),
            IssueFilter::Type(values) => restrict(&mut self.types, values),
            IssueFilter::Status(values) => {
                if self.default_statuses {
                    self.statuses = dedup(values);
                    self.default_statuses = false;
                } else {
                    self.statuses.retain(|s| values.contains(s));
                }
            }
            IssueFilter::Component(values) => restrict(&mut self.components, values),
            IssueFilter::Rule(values) => restrict(&mut self.rules, values),
            IssueFilter::CreatedAfter(at) => {
                self.created_after = Some(self.created_after.map_or(*at, |cur| cur.max(*at)));
            }
            IssueFilter::CreatedBefore(at) => {
                self.created_before = Some(self.created_before.map_or(*at, |cur| cur.min(*at)));
            }
        }
        self
    }

    /// Apply filters left to right.
    #[must_use]
    pub fn apply_all<'a>(self, filters: impl IntoIterator<Item = &'a IssueFilter>) -> Self {
        filters.into_iter().fold(self, Self::apply)
    }

    /// Same query, another page.
    #[must_use]
    pub fn with_page(mut self, page_index: u32) -> Self {
        self.page_index = page_index;
        self
    }

    /// `true` if no issue can match, so the server need not be asked.
    pub fn is_unsatisfiable(&self) -> bool {
        let empty_window = matches!(
            (self.created_after, self.created_before),
            (Some(after), Some(before)) if after >= before
        );
        self.statuses.is_empty()
            || self.severities.as_ref().is_some_and(Vec::is_empty)
            || self.types.as_ref().is_some_and(Vec::is_empty)
            || self.components.as_ref().is_some_and(Vec::is_empty)
            || self.rules.as_ref().is_some_and(Vec::is_empty)
            || empty_window
    }

    pub fn statuses(&self) -> &[IssueStatus] {
        &self.statuses
    }

    pub fn severities(&self) -> Option<&[Severity]> {
        self.severities.as_deref()
    }

    pub fn types(&self) -> Option<&[IssueType]> {
        self.types.as_deref()
    }

    pub fn components(&self) -> Option<&[String]> {
        self.components.as_deref()
    }

    pub fn rules(&self) -> Option<&[String]> {
        self.rules.as_deref()
    }

    pub fn created_after(&self) -> Option<DateTime<Utc>> {
        self.created_after
    }

    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.created_before
    }

    /// Render as wire search parameters.
    pub fn to_search(&self) -> IssueSearch {
        fn names<T: fmt::Display>(values: Option<&[T]>) -> Vec<String> {
            values
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect()
        }
        IssueSearch {
            component_keys: vec![self.project_key.to_string()],
            components: names(self.components()),
            statuses: names(Some(self.statuses())),
            severities: names(self.severities()),
            types: names(self.types()),
            rules: names(self.rules()),
            created_after: self
                .created_after
                .map(|d| d.format(WIRE_DATETIME).to_string()),
            created_before: self
                .created_before
                .map(|d| d.format(WIRE_DATETIME).to_string()),
            page: self.page_index,
            page_size: self.page_size,
        }
    }
}

fn dedup<T: PartialEq + Clone>(values: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}

fn restrict<T: PartialEq + Clone>(field: &mut Option<Vec<T>>, values: &[T]) {
    match field {
        Some(current) => current.retain(|v| values.contains(v)),
        None => *field = Some(dedup(values)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn base() -> IssueQuery {
        IssueQuery::new(ResourceKey::new("demo"), 500)
    }

    #[test]
    fn base_query_is_open_issues_of_project() {
        let search = base().to_search();
        assert_eq!(search.component_keys, vec!["demo"]);
        assert_eq!(search.statuses, vec!["OPEN"]);
        assert!(search.severities.is_empty());
        assert_eq!(search.page, 1);
        assert_eq!(search.page_size, 500);
    }

    #[test]
    fn independent_filters_commute() {
        let f1 = IssueFilter::Severity(vec![Severity::Major]);
        let f2 = IssueFilter::Rule(vec!["java:S1481".into()]);
        let a = base().apply_all([&f1, &f2]);
        let b = base().apply_all([&f2, &f1]);
        assert_eq!(a, b);
    }

    #[test]
    fn same_field_filters_intersect() {
        let query = base()
            .apply(&IssueFilter::Severity(vec![Severity::Major, Severity::Blocker]))
            .apply(&IssueFilter::Severity(vec![Severity::Blocker, Severity::Minor]));
        assert_eq!(query.severities(), Some(&[Severity::Blocker][..]));
        assert!(!query.is_unsatisfiable());
    }

    #[test]
    fn disjoint_filters_are_unsatisfiable() {
        let query = base()
            .apply(&IssueFilter::Type(vec![IssueType::Bug]))
            .apply(&IssueFilter::Type(vec![IssueType::CodeSmell]));
        assert!(query.is_unsatisfiable());
    }

    #[test]
    fn status_filter_replaces_default_then_intersects() {
        let query = base().apply(&IssueFilter::Status(vec![
            IssueStatus::Confirmed,
            IssueStatus::Reopened,
        ]));
        assert_eq!(
            query.statuses(),
            &[IssueStatus::Confirmed, IssueStatus::Reopened]
        );

        let query = query.apply(&IssueFilter::Status(vec![IssueStatus::Reopened]));
        assert_eq!(query.statuses(), &[IssueStatus::Reopened]);
    }

    #[test]
    fn inverted_date_window_is_unsatisfiable() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let query = base()
            .apply(&IssueFilter::CreatedAfter(late))
            .apply(&IssueFilter::CreatedBefore(early));
        assert!(query.is_unsatisfiable());
    }

    #[test]
    fn dates_render_in_wire_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap();
        let search = base().apply(&IssueFilter::CreatedAfter(at)).to_search();
        assert_eq!(search.created_after.as_deref(), Some("2024-03-01T09:15:00+0000"));
    }

    #[test]
    fn display_is_compact() {
        let filter = IssueFilter::Severity(vec![Severity::Major, Severity::Blocker]);
        assert_eq!(filter.to_string(), "severity=MAJOR,BLOCKER");
    }
}
