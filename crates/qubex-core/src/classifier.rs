// ── Classification dimensions ──

use std::fmt;
use std::hash::Hash;

use strum::IntoEnumIterator;

use crate::filter::IssueFilter;
use crate::model::{IssueType, Severity};

/// One value of a classification dimension.
pub trait Classifier: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync {
    /// The filter that selects issues carrying this value.
    fn create_filter(&self) -> IssueFilter;
}

/// A classification dimension: an ordered, finite set of classifiers.
pub trait ClassifierType: Send + Sync {
    type Classifier: Classifier;

    /// Short dimension name for headers and logs.
    fn name(&self) -> &'static str;

    /// All values, in presentation order.
    fn values(&self) -> Vec<Self::Classifier>;
}

impl Classifier for Severity {
    fn create_filter(&self) -> IssueFilter {
        IssueFilter::Severity(vec![*self])
    }
}

impl Classifier for IssueType {
    fn create_filter(&self) -> IssueFilter {
        IssueFilter::Type(vec![*self])
    }
}

/// Classify by severity, most severe first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Severities;

impl ClassifierType for Severities {
    type Classifier = Severity;

    fn name(&self) -> &'static str {
        "severity"
    }

    fn values(&self) -> Vec<Severity> {
        Severity::iter().rev().collect()
    }
}

/// Classify by issue type.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueTypes;

impl ClassifierType for IssueTypes {
    type Classifier = IssueType;

    fn name(&self) -> &'static str {
        "type"
    }

    fn values(&self) -> Vec<IssueType> {
        // Hotspots are served by a separate endpoint on current servers and
        // issue search rejects them as a type filter.
        IssueType::iter()
            .filter(|t| *t != IssueType::SecurityHotspot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_run_most_severe_first() {
        assert_eq!(
            Severities.values(),
            vec![
                Severity::Blocker,
                Severity::Critical,
                Severity::Major,
                Severity::Minor,
                Severity::Info,
            ]
        );
    }

    #[test]
    fn classifier_selects_itself() {
        assert_eq!(
            Severity::Critical.create_filter(),
            IssueFilter::Severity(vec![Severity::Critical])
        );
        assert_eq!(
            IssueType::Bug.create_filter(),
            IssueFilter::Type(vec![IssueType::Bug])
        );
    }

    #[test]
    fn issue_types_skip_hotspots() {
        let values = IssueTypes.values();
        assert_eq!(values.len(), 3);
        assert!(!values.contains(&IssueType::SecurityHotspot));
    }
}
