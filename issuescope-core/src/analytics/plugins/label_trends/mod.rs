//! Label Trend Analyzer
//!
//! Monthly creation counts for the most frequent labels.
//!
//! Labels are ranked over every issue, including ones whose creation date is
//! unusable. Only issues with a valid creation instant are bucketed; the month
//! axis spans the earliest to the latest such month with empty months
//! zero-filled.

use serde::Serialize;

use crate::analytics::engine::{IssueAnalysis, Report};
use crate::analytics::ranking::FrequencyCounter;
use crate::config::RunParams;
use crate::error::Result;
use crate::format::format_table;
use crate::temporal::{normalize, DateDiagnostics, MonthKey};
use crate::types::Issue;

/// Labels kept in the trend.
pub const TOP_TREND_LABELS: usize = 5;

/// Monthly counts for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSeries {
    pub label: String,
    /// Occurrences over all issues (the ranking key)
    pub total: usize,
    /// Issues created per month, aligned with [`TrendReport::months`]
    pub counts: Vec<usize>,
}

/// Month × label matrix.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrendReport {
    pub months: Vec<MonthKey>,
    pub series: Vec<LabelSeries>,
    pub diagnostics: DateDiagnostics,
}

impl TrendReport {
    /// Issues created in `month` carrying `label`; 0 outside the matrix.
    pub fn count(&self, label: &str, month: MonthKey) -> usize {
        let Some(column) = self.months.iter().position(|m| *m == month) else {
            return 0;
        };
        self.series
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.counts[column])
            .unwrap_or(0)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }
}

impl std::fmt::Display for TrendReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Label Trend Over Time (Top {} Labels):",
            TOP_TREND_LABELS
        )?;

        if self.series.is_empty() || self.months.is_empty() {
            write!(f, "\nNo labeled issues with a usable creation date.")?;
        } else {
            let mut headers = vec!["Month"];
            headers.extend(self.labels());

            let rows: Vec<Vec<String>> = self
                .months
                .iter()
                .enumerate()
                .map(|(i, month)| {
                    let mut row = vec![month.to_string()];
                    row.extend(self.series.iter().map(|s| s.counts[i].to_string()));
                    row
                })
                .collect();
            write!(f, "\n{}", format_table(&headers, &rows))?;
        }

        if let Some(warning) = self.diagnostics.invalid_message() {
            write!(f, "\n{}", warning)?;
        }
        Ok(())
    }
}

/// Build the trend matrix for the `top` most frequent labels.
pub fn label_trends(issues: &[Issue], top: usize) -> TrendReport {
    let mut ranking = FrequencyCounter::new();
    for issue in issues {
        for label in &issue.labels {
            ranking.add(label);
        }
    }
    let kept = ranking.top(top);

    let mut diagnostics = DateDiagnostics::default();
    let created: Vec<Option<MonthKey>> = issues
        .iter()
        .map(|issue| {
            let temporal = normalize(&issue.created_date);
            diagnostics.record(&temporal);
            temporal.month()
        })
        .collect();

    let (Some(first), Some(last)) = (
        created.iter().flatten().min().copied(),
        created.iter().flatten().max().copied(),
    ) else {
        return TrendReport {
            months: Vec::new(),
            series: kept
                .into_iter()
                .map(|r| LabelSeries {
                    label: r.name,
                    total: r.count,
                    counts: Vec::new(),
                })
                .collect(),
            diagnostics,
        };
    };

    let months = MonthKey::range_inclusive(first, last);
    let mut series: Vec<LabelSeries> = kept
        .into_iter()
        .map(|r| LabelSeries {
            label: r.name,
            total: r.count,
            counts: vec![0; months.len()],
        })
        .collect();

    for (issue, month) in issues.iter().zip(&created) {
        let Some(month) = month else {
            continue;
        };
        let Some(column) = months.iter().position(|m| m == month) else {
            continue;
        };
        for s in series.iter_mut() {
            if issue.has_label(&s.label) {
                s.counts[column] += 1;
            }
        }
    }

    TrendReport {
        months,
        series,
        diagnostics,
    }
}

/// Analyzer for label trends.
pub struct LabelTrendsAnalyzer {
    top: usize,
}

impl LabelTrendsAnalyzer {
    pub fn new() -> Self {
        Self {
            top: TOP_TREND_LABELS,
        }
    }
}

impl Default for LabelTrendsAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueAnalysis for LabelTrendsAnalyzer {
    fn name(&self) -> &str {
        "label_trends"
    }

    fn description(&self) -> &str {
        "Monthly creation counts for the five most frequent labels"
    }

    fn analyze(&self, issues: &[Issue], _params: &RunParams) -> Result<Report> {
        let report = label_trends(issues, self.top);
        report.diagnostics.log(self.name());
        tracing::debug!(
            months = report.months.len(),
            labels = report.series.len(),
            "Built label trend matrix"
        );
        Ok(Report::LabelTrends(report))
    }
}
