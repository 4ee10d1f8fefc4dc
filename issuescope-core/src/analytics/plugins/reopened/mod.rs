//! Reopen Detector
//!
//! Walks each issue's events through a two-state lifecycle and counts
//! closed → reopened transitions.
//!
//! ```text
//!            closed                     closed (no-op)
//!   ┌──────┐ ──────▶ ┌────────┐ ◀──────┐
//!   │ OPEN │         │ CLOSED │ ───────┘
//!   └──────┘ ◀────── └────────┘
//!      ▲   reopened (+1)
//!      └── reopened while OPEN: no-op
//! ```
//!
//! Only issues reopened at least once appear in the report. Their labels feed
//! a frequency view of which labels go with reopens.

use serde::Serialize;

use crate::analytics::engine::{IssueAnalysis, Report};
use crate::analytics::ranking::{FrequencyCounter, RankedCount};
use crate::config::RunParams;
use crate::error::Result;
use crate::format::format_labels;
use crate::types::{EventKind, Issue};

/// Labels shown in the console summary.
const TOP_REOPEN_LABELS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Closed,
}

/// Number of closed → reopened transitions in recorded event order.
pub fn count_reopens(issue: &Issue) -> u32 {
    let mut state = Lifecycle::Open;
    let mut reopens = 0;

    for event in &issue.events {
        match (&event.kind, state) {
            (EventKind::Closed, _) => state = Lifecycle::Closed,
            (EventKind::Reopened, Lifecycle::Closed) => {
                state = Lifecycle::Open;
                reopens += 1;
            }
            // A reopen must follow an observed close
            (EventKind::Reopened, Lifecycle::Open) => {}
            _ => {}
        }
    }

    reopens
}

/// One issue that was reopened at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReopenDetail {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub reopen_count: u32,
}

/// Reopened issues and the labels they carry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReopenReport {
    /// Issues reopened at least once
    pub reopened_count: usize,
    pub details: Vec<ReopenDetail>,
    /// Label occurrences across reopened issues, most frequent first
    pub label_frequency: Vec<RankedCount>,
}

impl ReopenReport {
    /// At most `n` labels, most frequent first.
    pub fn top_labels(&self, n: usize) -> &[RankedCount] {
        &self.label_frequency[..n.min(self.label_frequency.len())]
    }

    /// Sum of all reopen transitions.
    pub fn total_reopens(&self) -> u64 {
        self.details.iter().map(|d| d.reopen_count as u64).sum()
    }
}

impl std::fmt::Display for ReopenReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total issues that were reopened after closing: {}",
            self.reopened_count
        )?;

        for detail in &self.details {
            let times = if detail.reopen_count == 1 { "time" } else { "times" };
            write!(
                f,
                "\n  #{} {} (reopened {} {}) {}",
                detail.number,
                detail.title,
                detail.reopen_count,
                times,
                format_labels(&detail.labels)
            )?;
        }

        let top = self.top_labels(TOP_REOPEN_LABELS);
        if !top.is_empty() {
            write!(f, "\n\nTop {} labels on reopened issues:", top.len())?;
            for label in top {
                write!(f, "\n  {}: {}", label.name, label.count)?;
            }
        }
        Ok(())
    }
}

/// Detect reopened issues.
pub fn detect_reopens(issues: &[Issue]) -> ReopenReport {
    let mut details = Vec::new();
    let mut labels = FrequencyCounter::new();

    for issue in issues {
        let reopen_count = count_reopens(issue);
        if reopen_count == 0 {
            continue;
        }
        for label in &issue.labels {
            labels.add(label);
        }
        details.push(ReopenDetail {
            number: issue.number,
            title: issue.title.clone(),
            labels: issue.labels.clone(),
            reopen_count,
        });
    }

    ReopenReport {
        reopened_count: details.len(),
        details,
        label_frequency: labels.into_ranked(),
    }
}

/// Analyzer for reopened issues.
pub struct ReopenedAnalyzer;

impl ReopenedAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReopenedAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueAnalysis for ReopenedAnalyzer {
    fn name(&self) -> &str {
        "reopened"
    }

    fn description(&self) -> &str {
        "Issues reopened after closing, with the labels they carry"
    }

    fn analyze(&self, issues: &[Issue], _params: &RunParams) -> Result<Report> {
        let report = detect_reopens(issues);
        tracing::debug!(
            reopened = report.reopened_count,
            transitions = report.total_reopens(),
            "Detected reopened issues"
        );
        Ok(Report::Reopened(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    fn events(kinds: &[&str]) -> Vec<Event> {
        kinds
            .iter()
            .map(|k| Event {
                kind: EventKind::from(*k),
                ..Default::default()
            })
            .collect()
    }

    fn make_issue(number: u64, labels: &[&str], kinds: &[&str]) -> Issue {
        Issue {
            number,
            title: format!("Test Issue {}", number),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            events: events(kinds),
            ..Default::default()
        }
    }

    fn sample_issues() -> Vec<Issue> {
        vec![
            make_issue(1, &["kind/bug"], &["closed", "reopened"]),
            make_issue(2, &["kind/feature"], &["closed"]),
            make_issue(
                3,
                &["kind/bug", "status/triage"],
                &["closed", "reopened", "closed", "reopened"],
            ),
        ]
    }

    #[test]
    fn test_count_reopens_cycles() {
        let issue = make_issue(1, &[], &["closed", "reopened", "closed", "reopened"]);
        assert_eq!(count_reopens(&issue), 2);
    }

    #[test]
    fn test_reopen_without_close_is_ignored() {
        let issue = make_issue(1, &[], &["reopened", "commented", "reopened"]);
        assert_eq!(count_reopens(&issue), 0);

        let issue = make_issue(1, &[], &["closed", "reopened", "reopened"]);
        assert_eq!(count_reopens(&issue), 1);
    }

    #[test]
    fn test_repeated_close_is_idempotent() {
        let issue = make_issue(1, &[], &["closed", "closed", "labeled", "reopened"]);
        assert_eq!(count_reopens(&issue), 1);
    }

    #[test]
    fn test_detect_reopens() {
        let report = detect_reopens(&sample_issues());
        assert_eq!(report.reopened_count, 2);
        assert_eq!(report.details.len(), 2);
        assert_eq!(report.details[0].number, 1);
        assert_eq!(report.details[1].reopen_count, 2);
        assert_eq!(report.total_reopens(), 3);
        assert_eq!(
            report.label_frequency,
            vec![
                RankedCount::new("kind/bug", 2),
                RankedCount::new("status/triage", 1),
            ]
        );
    }

    #[test]
    fn test_issue_without_labels_is_kept() {
        let report = detect_reopens(&[make_issue(4, &[], &["closed", "reopened"])]);
        assert_eq!(report.reopened_count, 1);
        assert!(report.details[0].labels.is_empty());
        assert!(report.label_frequency.is_empty());
        assert!(report.top_labels(5).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let report = detect_reopens(&[]);
        assert_eq!(report.reopened_count, 0);
        assert!(report.details.is_empty());
        assert_eq!(
            report.to_string(),
            "Total issues that were reopened after closing: 0"
        );
    }

    #[test]
    fn test_large_dataset() {
        let issues: Vec<Issue> = (0..500).flat_map(|_| sample_issues()).collect();
        let report = detect_reopens(&issues);
        assert_eq!(report.reopened_count, 1000);
        assert_eq!(report.details.len(), 1000);
        assert_eq!(report.top_labels(5).len(), 2);
    }

    #[test]
    fn test_display_lists_only_reopened() {
        let output = detect_reopens(&sample_issues()).to_string();
        assert!(output.contains("Total issues that were reopened after closing: 2"));
        assert!(output.contains("Test Issue 1"));
        assert!(output.contains("Test Issue 3"));
        assert!(!output.contains("Test Issue 2"));
        assert!(output.contains("(reopened 2 times) [kind/bug, status/triage]"));
    }
}
