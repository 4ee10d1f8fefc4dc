//! Label Category Analyzer
//!
//! Groups labels of the form `prefix/category` under a configured prefix and
//! counts how often each category occurs.
//!
//! ## Sources
//!
//! | Source | Counts |
//! |--------|--------|
//! | [`CategorySource::Events`] | every `labeled` event whose label matches |
//! | [`CategorySource::IssueLabels`] | every current issue label that matches |
//!
//! ## Example
//!
//! Prefix `status`, labeled events `status/ready`, `status/in-progress`,
//! `status/ready`:
//!
//! ```text
//! Status Event Analysis for label prefix 'status/':
//!       Label  Event Count
//!       ready            2
//! in-progress            1
//! ```

use serde::Serialize;

use crate::analytics::engine::{IssueAnalysis, Report};
use crate::analytics::ranking::{FrequencyCounter, RankedCount};
use crate::config::RunParams;
use crate::error::Result;
use crate::format::{format_table, title_case};
use crate::types::{EventKind, Issue};

/// Separator between prefix and category.
pub const LABEL_SEPARATOR: char = '/';

/// Category of `label` under `prefix`, if the label is `prefix/<category>`.
pub fn split_label<'a>(label: &'a str, prefix: &str) -> Option<&'a str> {
    label.strip_prefix(prefix)?.strip_prefix(LABEL_SEPARATOR)
}

/// What the categorizer counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    Events,
    IssueLabels,
}

/// Category counts under one prefix, most frequent first.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub prefix: String,
    pub source: CategorySource,
    pub categories: Vec<RankedCount>,
}

impl CategoryReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Count for one category (0 if never seen).
    pub fn count(&self, category: &str) -> usize {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Sum over all categories.
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }
}

impl std::fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (noun, column) = match self.source {
            CategorySource::Events => ("Event", "Event Count"),
            CategorySource::IssueLabels => ("Label", "Issue Count"),
        };

        if self.is_empty() {
            return match self.source {
                CategorySource::Events => write!(
                    f,
                    "No label events found with prefix '{}/' in the issues data.",
                    self.prefix
                ),
                CategorySource::IssueLabels => write!(
                    f,
                    "No labels found with prefix '{}/' in the issues data.",
                    self.prefix
                ),
            };
        }

        let rows: Vec<Vec<String>> = self
            .categories
            .iter()
            .map(|c| vec![c.name.clone(), c.count.to_string()])
            .collect();

        writeln!(
            f,
            "{} {} Analysis for label prefix '{}/':",
            title_case(&self.prefix),
            noun,
            self.prefix
        )?;
        write!(f, "{}", format_table(&["Label", column], &rows))
    }
}

/// Count categories under `prefix` (without trailing separator).
pub fn categorize(issues: &[Issue], prefix: &str, source: CategorySource) -> CategoryReport {
    let mut counter = FrequencyCounter::new();

    for issue in issues {
        match source {
            CategorySource::Events => {
                for event in &issue.events {
                    if event.kind != EventKind::Labeled {
                        continue;
                    }
                    if let Some(category) = event
                        .label
                        .as_deref()
                        .and_then(|l| split_label(l, prefix))
                    {
                        counter.add(category);
                    }
                }
            }
            CategorySource::IssueLabels => {
                for label in &issue.labels {
                    if let Some(category) = split_label(label, prefix) {
                        counter.add(category);
                    }
                }
            }
        }
    }

    CategoryReport {
        prefix: prefix.to_string(),
        source,
        categories: counter.into_ranked(),
    }
}

/// Analyzer over label categories.
pub struct LabelCategoriesAnalyzer {
    source: CategorySource,
}

impl LabelCategoriesAnalyzer {
    /// Count `labeled` events.
    pub fn events() -> Self {
        Self {
            source: CategorySource::Events,
        }
    }

    /// Count current issue labels.
    pub fn issue_labels() -> Self {
        Self {
            source: CategorySource::IssueLabels,
        }
    }
}

impl IssueAnalysis for LabelCategoriesAnalyzer {
    fn name(&self) -> &str {
        match self.source {
            CategorySource::Events => "label_categories",
            CategorySource::IssueLabels => "issue_label_categories",
        }
    }

    fn description(&self) -> &str {
        match self.source {
            CategorySource::Events => "Count labeled events per category under --label <prefix>",
            CategorySource::IssueLabels => "Count issue labels per category under --label <prefix>",
        }
    }

    fn analyze(&self, issues: &[Issue], params: &RunParams) -> Result<Report> {
        let prefix = params.require_label_prefix()?;
        let report = categorize(issues, prefix, self.source);
        tracing::debug!(
            prefix,
            categories = report.categories.len(),
            total = report.total(),
            "Categorized labels"
        );
        Ok(Report::LabelCategories(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    fn labeled(label: &str) -> Event {
        Event {
            kind: EventKind::Labeled,
            author: Some("triager".to_string()),
            label: Some(label.to_string()),
            ..Default::default()
        }
    }

    fn issue_with_events(events: Vec<Event>) -> Issue {
        Issue {
            events,
            ..Default::default()
        }
    }

    fn status_issues() -> Vec<Issue> {
        vec![
            issue_with_events(vec![labeled("status/ready")]),
            issue_with_events(vec![labeled("status/in-progress"), labeled("status/ready")]),
        ]
    }

    #[test]
    fn test_split_label() {
        assert_eq!(split_label("status/ready", "status"), Some("ready"));
        assert_eq!(split_label("status/needs/info", "status"), Some("needs/info"));
        assert_eq!(split_label("statusready", "status"), None);
        assert_eq!(split_label("kind/bug", "status"), None);
        assert_eq!(split_label("status", "status"), None);
    }

    #[test]
    fn test_counts_labeled_events() {
        let report = categorize(&status_issues(), "status", CategorySource::Events);
        assert_eq!(
            report.categories,
            vec![
                RankedCount::new("ready", 2),
                RankedCount::new("in-progress", 1),
            ]
        );
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_counts_do_not_depend_on_issue_order() {
        let mut issues = status_issues();
        issues.reverse();
        let report = categorize(&issues, "status", CategorySource::Events);
        assert_eq!(report.count("ready"), 2);
        assert_eq!(report.count("in-progress"), 1);
    }

    #[test]
    fn test_ignores_other_event_kinds() {
        let mut unlabeled = labeled("status/ready");
        unlabeled.kind = EventKind::Unlabeled;
        let issues = vec![issue_with_events(vec![
            unlabeled,
            Event {
                kind: EventKind::Labeled,
                label: None,
                ..Default::default()
            },
        ])];
        let report = categorize(&issues, "status", CategorySource::Events);
        assert!(report.is_empty());
    }

    #[test]
    fn test_issue_label_variant() {
        let issues = vec![
            Issue {
                labels: vec!["kind/bug".to_string(), "status/triage".to_string()],
                ..Default::default()
            },
            Issue {
                labels: vec!["kind/bug".to_string(), "invalid/label_format".to_string()],
                ..Default::default()
            },
        ];
        let report = categorize(&issues, "kind", CategorySource::IssueLabels);
        assert_eq!(report.categories, vec![RankedCount::new("bug", 2)]);
    }

    #[test]
    fn test_display_table() {
        let report = categorize(&status_issues(), "status", CategorySource::Events);
        let expected = "Status Event Analysis for label prefix 'status/':\n      Label  Event Count\n      ready            2\nin-progress            1";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_display_no_matches() {
        let report = categorize(&[], "status", CategorySource::Events);
        assert_eq!(
            report.to_string(),
            "No label events found with prefix 'status/' in the issues data."
        );
    }

    #[test]
    fn test_analyze_requires_prefix() {
        let analyzer = LabelCategoriesAnalyzer::events();
        let err = analyzer
            .analyze(&status_issues(), &RunParams::default())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_analyze_accepts_prefix_with_separator() {
        let analyzer = LabelCategoriesAnalyzer::events();
        let params = RunParams::new(Some("status/".to_string()), None);
        let report = match analyzer.analyze(&[], &params).unwrap() {
            Report::LabelCategories(r) => r,
            other => panic!("unexpected report: {:?}", other),
        };
        assert_eq!(report.prefix, "status");
        assert_eq!(
            report.to_string(),
            "No label events found with prefix 'status/' in the issues data."
        );
    }
}
