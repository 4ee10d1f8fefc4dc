//! Top Creators Analyzer
//!
//! Ranks issue creators by the number of issues they opened, optionally
//! restricted to issues carrying an exact label (`--label`).

use serde::Serialize;

use crate::analytics::engine::{IssueAnalysis, Report};
use crate::analytics::ranking::{FrequencyCounter, RankedCount};
use crate::config::RunParams;
use crate::error::Result;
use crate::format::format_table;
use crate::types::Issue;

/// Default number of creators kept.
pub const DEFAULT_TOP_CREATORS: usize = 50;

/// Creators ranked by issue count.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreatorRanking {
    /// Maximum creators kept
    pub limit: usize,
    pub label_filter: Option<String>,
    pub creators: Vec<RankedCount>,
}

impl CreatorRanking {
    pub fn title(&self) -> String {
        let mut title = format!("Top {} issue creators", self.limit);
        if let Some(label) = &self.label_filter {
            title.push_str(&format!(" (Label = {})", label));
        }
        title
    }
}

impl std::fmt::Display for CreatorRanking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())?;
        if self.creators.is_empty() {
            return write!(f, "\nNo issues to rank.");
        }
        let rows: Vec<Vec<String>> = self
            .creators
            .iter()
            .map(|c| vec![c.name.clone(), c.count.to_string()])
            .collect();
        write!(f, "\n{}", format_table(&["Creator", "Issues"], &rows))
    }
}

/// Rank creators, keeping at most `limit`.
pub fn rank_creators(issues: &[Issue], limit: usize, label: Option<&str>) -> CreatorRanking {
    let mut counter = FrequencyCounter::new();
    for issue in issues {
        if label.is_some_and(|l| !issue.has_label(l)) {
            continue;
        }
        if issue.creator.is_empty() {
            continue;
        }
        counter.add(&issue.creator);
    }

    CreatorRanking {
        limit,
        label_filter: label.map(str::to_string),
        creators: counter.top(limit),
    }
}

/// Analyzer for top issue creators.
pub struct TopCreatorsAnalyzer {
    limit: usize,
}

impl TopCreatorsAnalyzer {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Default for TopCreatorsAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_CREATORS)
    }
}

impl IssueAnalysis for TopCreatorsAnalyzer {
    fn name(&self) -> &str {
        "top_creators"
    }

    fn description(&self) -> &str {
        "Creators ranked by issues opened (--label exact filter)"
    }

    fn analyze(&self, issues: &[Issue], params: &RunParams) -> Result<Report> {
        let ranking = rank_creators(issues, self.limit, params.label.as_deref());
        tracing::debug!(
            creators = ranking.creators.len(),
            limit = self.limit,
            "Ranked issue creators"
        );
        Ok(Report::TopCreators(ranking))
    }
}
