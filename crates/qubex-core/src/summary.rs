// ── Classifier summary ──
//
// Counts of issues per (classifier value, rule). Entries exist only once
// incremented; classifiers iterate in the order they were first counted,
// which for the summary builder is the dimension's enumeration order.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::classifier::Classifier;
use crate::model::Rule;

/// Read-only view of an aggregate count table.
pub trait Summary {
    /// Sum of all counts.
    fn total(&self) -> u64;

    /// Every rule with at least one count, in first-seen order.
    fn rules(&self) -> Vec<&Rule>;

    /// Sum of counts for one rule across all classifier values.
    fn count_for_rule(&self, rule_key: &str) -> u64;
}

/// Issue counts keyed by classifier value and rule.
#[derive(Debug, Clone)]
pub struct ClassifierSummary<C: Classifier> {
    dimension: &'static str,
    counts: IndexMap<C, IndexMap<String, u64>>,
    rules: IndexMap<String, Arc<Rule>>,
}

/// One flattened summary entry, for tabular and structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub classifier: String,
    pub rule_key: String,
    pub rule_name: String,
    pub count: u64,
}

impl<C: Classifier> ClassifierSummary<C> {
    pub fn new(dimension: &'static str) -> Self {
        Self {
            dimension,
            counts: IndexMap::new(),
            rules: IndexMap::new(),
        }
    }

    pub fn dimension(&self) -> &'static str {
        self.dimension
    }

    /// Count one more issue of `rule` under `classifier`.
    pub fn increment(&mut self, classifier: C, rule: &Arc<Rule>) {
        self.add(classifier, rule, 1);
    }

    fn add(&mut self, classifier: C, rule: &Arc<Rule>, n: u64) {
        self.rules
            .entry(rule.key.clone())
            .or_insert_with(|| Arc::clone(rule));
        *self
            .counts
            .entry(classifier)
            .or_default()
            .entry(rule.key.clone())
            .or_insert(0) += n;
    }

    /// Count for one (classifier, rule) pair; zero if never incremented.
    pub fn count(&self, classifier: C, rule_key: &str) -> u64 {
        self.counts
            .get(&classifier)
            .and_then(|rules| rules.get(rule_key))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of counts under one classifier.
    pub fn total_for(&self, classifier: C) -> u64 {
        self.counts
            .get(&classifier)
            .map_or(0, |rules| rules.values().sum())
    }

    /// Classifiers with at least one count.
    pub fn classifiers(&self) -> impl Iterator<Item = C> + '_ {
        self.counts.keys().copied()
    }

    /// Every (classifier, rule, count) entry in classifier order, then
    /// rule first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = (C, &Rule, u64)> + '_ {
        self.counts.iter().flat_map(move |(classifier, rules)| {
            rules.iter().filter_map(move |(key, count)| {
                self.rules
                    .get(key)
                    .map(|rule| (*classifier, rule.as_ref(), *count))
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of (classifier, rule) entries.
    pub fn len(&self) -> usize {
        self.counts.values().map(IndexMap::len).sum()
    }

    /// Add every count of `other` into this summary.
    pub fn merge(&mut self, other: &Self) {
        for (classifier, rules) in &other.counts {
            for (key, count) in rules {
                if let Some(rule) = other.rules.get(key) {
                    self.add(*classifier, rule, *count);
                }
            }
        }
    }

    pub fn to_rows(&self) -> Vec<SummaryRow> {
        self.entries()
            .map(|(classifier, rule, count)| SummaryRow {
                classifier: classifier.to_string(),
                rule_key: rule.key.clone(),
                rule_name: rule.name.clone(),
                count,
            })
            .collect()
    }
}

impl<C: Classifier> Summary for ClassifierSummary<C> {
    fn total(&self) -> u64 {
        self.counts.values().flat_map(IndexMap::values).sum()
    }

    fn rules(&self) -> Vec<&Rule> {
        self.rules.values().map(AsRef::as_ref).collect()
    }

    fn count_for_rule(&self, rule_key: &str) -> u64 {
        self.counts
            .values()
            .filter_map(|rules| rules.get(rule_key))
            .sum()
    }
}
