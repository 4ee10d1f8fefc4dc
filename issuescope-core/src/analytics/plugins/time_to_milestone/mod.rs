//! Time-to-Milestone Analyzer
//!
//! Measures whole days between an issue's creation and a milestone:
//!
//! | Milestone | Measured issues | Milestone instant |
//! |-----------|-----------------|-------------------|
//! | [`Milestone::Close`] | state `closed` | `closed_time`, else first `closed` event |
//! | [`Milestone::Assign`] | has an `assigned` event | first `assigned` event |
//!
//! Issues whose creation or milestone instant cannot be resolved are left out
//! of the rows but counted. Malformed (not merely missing) dates produce one
//! `invalid date` warning per run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::analytics::engine::{IssueAnalysis, Report};
use crate::config::RunParams;
use crate::error::Result;
use crate::format::{format_labels, format_table};
use crate::temporal::{approx_months, elapsed_days, normalize, DateDiagnostics, Temporal};
use crate::types::{EventKind, Issue};

/// The event that ends a measured interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Close,
    Assign,
}

impl Milestone {
    fn verb(&self) -> &'static str {
        match self {
            Milestone::Close => "Close",
            Milestone::Assign => "Assign",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Milestone::Close => "closed",
            Milestone::Assign => "assigned",
        }
    }

    /// Whether the issue reached this milestone.
    pub fn applies_to(&self, issue: &Issue) -> bool {
        match self {
            Milestone::Close => issue.is_closed(),
            Milestone::Assign => issue.first_event(&EventKind::Assigned).is_some(),
        }
    }

    /// When the issue reached this milestone.
    fn resolve(&self, issue: &Issue, diagnostics: &mut DateDiagnostics) -> Option<DateTime<Utc>> {
        match self {
            Milestone::Close => {
                match normalize(&issue.closed_time) {
                    Temporal::Valid(ts) => return Some(ts.with_timezone(&Utc)),
                    invalid @ Temporal::Invalid(_) => {
                        diagnostics.record(&invalid);
                    }
                    Temporal::Missing => {}
                }
                issue
                    .first_event(&EventKind::Closed)
                    .and_then(|e| diagnostics.resolve(&e.event_date))
            }
            Milestone::Assign => issue
                .first_event(&EventKind::Assigned)
                .and_then(|e| diagnostics.resolve(&e.event_date)),
        }
    }
}

/// One measured issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneRow {
    pub issue_id: u64,
    pub creator: String,
    pub labels: Vec<String>,
    pub elapsed_days: i64,
}

/// Issues grouped by approximate months to the milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub months: i64,
    pub issues: usize,
}

/// Mean elapsed days for one creator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorMean {
    pub creator: String,
    pub issues: usize,
    pub mean_days: f64,
}

/// Elapsed-time table for one milestone.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneReport {
    pub milestone: Milestone,
    /// Exact label the issues were restricted to
    pub label_filter: Option<String>,
    /// Creator the rows were restricted to
    pub creator_filter: Option<String>,
    pub rows: Vec<MilestoneRow>,
    /// Issues that reached the milestone (after label filtering)
    pub considered: usize,
    pub skipped_missing_date: usize,
    pub skipped_invalid_date: usize,
    pub skipped_no_milestone: usize,
    pub diagnostics: DateDiagnostics,
}

impl MilestoneReport {
    fn empty(milestone: Milestone, label_filter: Option<String>) -> Self {
        Self {
            milestone,
            label_filter,
            creator_filter: None,
            rows: Vec::new(),
            considered: 0,
            skipped_missing_date: 0,
            skipped_invalid_date: 0,
            skipped_no_milestone: 0,
            diagnostics: DateDiagnostics::default(),
        }
    }

    /// Chart title reflecting active filters.
    pub fn title(&self) -> String {
        let mut title = format!("Distribution of Time to {} Issues", self.milestone.verb());
        if let Some(label) = &self.label_filter {
            title.push_str(&format!(" (Label = {})", label));
        }
        if let Some(creator) = &self.creator_filter {
            title.push_str(&format!(" (Creator = {})", creator));
        }
        title
    }

    /// Issue counts per approximate month, ascending.
    pub fn distribution(&self) -> Vec<MonthBucket> {
        let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
        for row in &self.rows {
            *buckets.entry(approx_months(row.elapsed_days)).or_insert(0) += 1;
        }
        buckets
            .into_iter()
            .map(|(months, issues)| MonthBucket { months, issues })
            .collect()
    }

    /// One entry per distinct creator, in order of first appearance.
    pub fn mean_days_by_creator(&self) -> Vec<CreatorMean> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut sums: Vec<(&str, i64, usize)> = Vec::new();

        for row in &self.rows {
            match index.get(row.creator.as_str()) {
                Some(&i) => {
                    sums[i].1 += row.elapsed_days;
                    sums[i].2 += 1;
                }
                None => {
                    index.insert(row.creator.as_str(), sums.len());
                    sums.push((row.creator.as_str(), row.elapsed_days, 1));
                }
            }
        }

        sums.into_iter()
            .map(|(creator, total, issues)| CreatorMean {
                creator: creator.to_string(),
                issues,
                mean_days: total as f64 / issues as f64,
            })
            .collect()
    }

    /// Mean elapsed days over all rows.
    pub fn mean_days(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let total: i64 = self.rows.iter().map(|r| r.elapsed_days).sum();
        Some(total as f64 / self.rows.len() as f64)
    }

    /// Rows created by `creator`, or `None` when there are none.
    pub fn for_creator(&self, creator: &str) -> Option<MilestoneReport> {
        let rows: Vec<MilestoneRow> = self
            .rows
            .iter()
            .filter(|r| r.creator == creator)
            .cloned()
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(MilestoneReport {
            creator_filter: Some(creator.to_string()),
            considered: rows.len(),
            rows,
            skipped_missing_date: 0,
            skipped_invalid_date: 0,
            skipped_no_milestone: 0,
            diagnostics: DateDiagnostics::default(),
            ..self.clone()
        })
    }
}

impl std::fmt::Display for MilestoneReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())?;

        if self.rows.is_empty() {
            write!(
                f,
                "\nNo {} issues with a usable creation date to measure.",
                self.milestone.past_tense()
            )?;
        } else {
            let skipped = self.skipped_missing_date
                + self.skipped_invalid_date
                + self.skipped_no_milestone;
            write!(f, "\nMeasured {} of {} issue(s)", self.rows.len(), self.considered)?;
            if skipped > 0 {
                write!(
                    f,
                    " ({} without a creation date, {} with an invalid creation date, {} without a {} date)",
                    self.skipped_missing_date,
                    self.skipped_invalid_date,
                    self.skipped_no_milestone,
                    self.milestone.past_tense()
                )?;
            }
            if let Some(mean) = self.mean_days() {
                write!(f, "; mean {:.1} days", mean)?;
            }

            let rows: Vec<Vec<String>> = self
                .distribution()
                .iter()
                .map(|b| vec![b.months.to_string(), b.issues.to_string()])
                .collect();
            write!(f, "\n{}", format_table(&["Approx. Months", "Issues"], &rows))?;

            let rows: Vec<Vec<String>> = self
                .mean_days_by_creator()
                .iter()
                .map(|c| {
                    vec![
                        c.creator.clone(),
                        c.issues.to_string(),
                        format!("{:.1}", c.mean_days),
                    ]
                })
                .collect();
            write!(
                f,
                "\n\n{}",
                format_table(&["Creator", "Issues", "Mean Days"], &rows)
            )?;

            if self.creator_filter.is_some() {
                for row in &self.rows {
                    write!(
                        f,
                        "\n  #{} {} day(s) {}",
                        row.issue_id,
                        row.elapsed_days,
                        format_labels(&row.labels)
                    )?;
                }
            }
        }

        if let Some(warning) = self.diagnostics.invalid_message() {
            write!(f, "\n{}", warning)?;
        }
        Ok(())
    }
}

/// The overall table plus the optional per-creator view.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneAnalysis {
    pub overall: MilestoneReport,
    pub creator_view: Option<CreatorView>,
}

/// Rows restricted to one creator; `report` is `None` when nothing matched.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorView {
    pub creator: String,
    pub report: Option<MilestoneReport>,
}

impl std::fmt::Display for MilestoneAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.overall)?;
        if let Some(view) = &self.creator_view {
            match &view.report {
                Some(report) => write!(f, "\n\n{}", report)?,
                None => write!(
                    f,
                    "\n\nNo {} issues created by {}.",
                    self.overall.milestone.past_tense(),
                    view.creator
                )?,
            }
        }
        Ok(())
    }
}

/// Build the elapsed-time table.
///
/// `label` restricts measurement to issues carrying that exact label.
pub fn measure(issues: &[Issue], milestone: Milestone, label: Option<&str>) -> MilestoneReport {
    let mut report = MilestoneReport::empty(milestone, label.map(str::to_string));

    for issue in issues {
        if !milestone.applies_to(issue) {
            continue;
        }
        if let Some(label) = label {
            if !issue.has_label(label) {
                continue;
            }
        }
        report.considered += 1;

        let created = normalize(&issue.created_date);
        let Some(created_at) = report.diagnostics.record(&created) else {
            if created.is_invalid() {
                report.skipped_invalid_date += 1;
            } else {
                report.skipped_missing_date += 1;
            }
            continue;
        };

        let Some(reached_at) = milestone.resolve(issue, &mut report.diagnostics) else {
            report.skipped_no_milestone += 1;
            continue;
        };

        report.rows.push(MilestoneRow {
            issue_id: issue.number,
            creator: issue.creator.clone(),
            labels: issue.labels.clone(),
            elapsed_days: elapsed_days(created_at, reached_at),
        });
    }

    report
}

/// Analyzer for time-to-close / time-to-assign.
pub struct TimeToMilestoneAnalyzer {
    milestone: Milestone,
}

impl TimeToMilestoneAnalyzer {
    pub fn new(milestone: Milestone) -> Self {
        Self { milestone }
    }
}

impl IssueAnalysis for TimeToMilestoneAnalyzer {
    fn name(&self) -> &str {
        match self.milestone {
            Milestone::Close => "time_to_close",
            Milestone::Assign => "time_to_assign",
        }
    }

    fn description(&self) -> &str {
        match self.milestone {
            Milestone::Close => "Days from creation to close (--label exact filter, --user creator view)",
            Milestone::Assign => "Days from creation to first assignment (--label exact filter, --user creator view)",
        }
    }

    fn analyze(&self, issues: &[Issue], params: &RunParams) -> Result<Report> {
        let overall = measure(issues, self.milestone, params.label.as_deref());
        overall.diagnostics.log(self.name());

        let creator_view = params.user.as_ref().map(|user| CreatorView {
            creator: user.clone(),
            report: overall.for_creator(user),
        });

        tracing::debug!(
            analysis = self.name(),
            rows = overall.rows.len(),
            considered = overall.considered,
            "Measured time to milestone"
        );

        Ok(Report::TimeToMilestone(MilestoneAnalysis {
            overall,
            creator_view,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateValue, Event, IssueState};
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateValue {
        DateValue::from(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    fn event(kind: EventKind, author: &str, date: DateValue) -> Event {
        Event {
            kind,
            author: Some(author.to_string()),
            event_date: date,
            ..Default::default()
        }
    }

    fn closed_issue(number: u64, creator: &str, created: DateValue, closed: DateValue) -> Issue {
        Issue {
            number,
            creator: creator.to_string(),
            labels: vec!["kind/bug".to_string()],
            state: IssueState::Closed,
            created_date: created,
            events: vec![event(EventKind::Closed, "maintainer", closed)],
            ..Default::default()
        }
    }

    fn sample_issues() -> Vec<Issue> {
        vec![
            closed_issue(1, "user1", day(2024, 1, 1), day(2024, 1, 5)),
            closed_issue(2, "user1", day(2024, 1, 10), day(2024, 1, 20)),
            closed_issue(3, "user2", day(2024, 1, 1), day(2024, 4, 1)),
            Issue {
                number: 4,
                creator: "user3".to_string(),
                state: IssueState::Open,
                created_date: day(2024, 1, 1),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_measures_closed_issues_only() {
        let report = measure(&sample_issues(), Milestone::Close, None);
        assert_eq!(report.considered, 3);
        let days: Vec<i64> = report.rows.iter().map(|r| r.elapsed_days).collect();
        assert_eq!(days, vec![4, 10, 91]);
        assert_eq!(report.rows[0].creator, "user1");
        assert_eq!(report.rows[0].labels, vec!["kind/bug"]);
    }

    #[test]
    fn test_closed_time_field_takes_precedence() {
        let mut issue = closed_issue(1, "user1", day(2024, 1, 1), day(2024, 1, 5));
        issue.closed_time = DateValue::from("2024-01-03T12:00:00+00:00");
        let report = measure(&[issue], Milestone::Close, None);
        assert_eq!(report.rows[0].elapsed_days, 2);
    }

    #[test]
    fn test_iso_strings_with_offset() {
        let issue = closed_issue(
            1,
            "user1",
            DateValue::from("2024-10-12T13:13:00+00:00"),
            DateValue::from("2024-10-16T13:13:00+00:00"),
        );
        let report = measure(&[issue], Milestone::Close, None);
        assert_eq!(report.rows[0].elapsed_days, 4);
    }

    #[test]
    fn test_time_to_assign_uses_first_assignment() {
        let issue = Issue {
            number: 9,
            creator: "user1".to_string(),
            created_date: day(2024, 3, 1),
            events: vec![
                event(EventKind::Commented, "user2", day(2024, 3, 2)),
                event(EventKind::Assigned, "lead", day(2024, 3, 11)),
                event(EventKind::Assigned, "lead", day(2024, 5, 1)),
            ],
            ..Default::default()
        };
        let unassigned = Issue {
            number: 10,
            created_date: day(2024, 3, 1),
            ..Default::default()
        };
        let report = measure(&[issue, unassigned], Milestone::Assign, None);
        assert_eq!(report.considered, 1);
        assert_eq!(report.rows[0].elapsed_days, 10);
    }

    #[test]
    fn test_missing_and_invalid_creation_dates() {
        let issues = vec![
            closed_issue(1, "user1", DateValue::Missing, day(2024, 1, 5)),
            closed_issue(2, "user1", DateValue::from("2024/01/01"), day(2024, 1, 5)),
            closed_issue(
                3,
                "user1",
                DateValue::Other(serde_json::json!(1234567890)),
                day(2024, 1, 5),
            ),
            closed_issue(4, "user1", day(2024, 1, 1), DateValue::Missing),
        ];
        let report = measure(&issues, Milestone::Close, None);
        assert!(report.rows.is_empty());
        assert_eq!(report.considered, 4);
        assert_eq!(report.skipped_missing_date, 1);
        assert_eq!(report.skipped_invalid_date, 2);
        assert_eq!(report.skipped_no_milestone, 1);

        let output = report.to_string();
        assert_eq!(output.matches("invalid date").count(), 1);
    }

    #[test]
    fn test_missing_dates_produce_no_warning() {
        let issues = vec![closed_issue(1, "user1", DateValue::Missing, day(2024, 1, 5))];
        let report = measure(&issues, Milestone::Close, None);
        assert!(!report.to_string().contains("invalid date"));
    }

    #[test]
    fn test_label_filter_and_title() {
        let mut issues = sample_issues();
        issues[2].labels = vec!["kind/feature".to_string()];

        let report = measure(&issues, Milestone::Close, Some("kind/feature"));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].issue_id, 3);
        assert_eq!(
            report.title(),
            "Distribution of Time to Close Issues (Label = kind/feature)"
        );

        let report = measure(&issues, Milestone::Assign, None);
        assert_eq!(report.title(), "Distribution of Time to Assign Issues");
    }

    #[test]
    fn test_distribution_and_creator_means() {
        let report = measure(&sample_issues(), Milestone::Close, None);
        assert_eq!(
            report.distribution(),
            vec![
                MonthBucket { months: 0, issues: 2 },
                MonthBucket { months: 3, issues: 1 },
            ]
        );

        let means = report.mean_days_by_creator();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].creator, "user1");
        assert_eq!(means[0].issues, 2);
        assert!((means[0].mean_days - 7.0).abs() < 1e-9);
        assert_eq!(means[1].creator, "user2");
    }

    #[test]
    fn test_creator_view() {
        let report = measure(&sample_issues(), Milestone::Close, None);

        let view = report.for_creator("user2").unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(
            view.title(),
            "Distribution of Time to Close Issues (Creator = user2)"
        );

        assert!(report.for_creator("nonexistent_user").is_none());
    }

    #[test]
    fn test_analyze_with_unknown_user() {
        let analyzer = TimeToMilestoneAnalyzer::new(Milestone::Close);
        let params = RunParams::new(None, Some("nonexistent_user".to_string()));
        let analysis = match analyzer.analyze(&sample_issues(), &params).unwrap() {
            Report::TimeToMilestone(a) => a,
            other => panic!("unexpected report: {:?}", other),
        };
        assert_eq!(analysis.overall.rows.len(), 3);
        let view = analysis.creator_view.as_ref().unwrap();
        assert!(view.report.is_none());
        assert!(analysis
            .to_string()
            .ends_with("No closed issues created by nonexistent_user."));
    }

    #[test]
    fn test_analyze_without_user_has_no_creator_view() {
        let analyzer = TimeToMilestoneAnalyzer::new(Milestone::Close);
        let analysis = match analyzer.analyze(&[], &RunParams::default()).unwrap() {
            Report::TimeToMilestone(a) => a,
            other => panic!("unexpected report: {:?}", other),
        };
        assert!(analysis.creator_view.is_none());
        assert!(analysis.overall.rows.is_empty());
        assert!(analysis.overall.mean_days().is_none());
    }
}
