//! User Activity Analyzer
//!
//! Summarizes one user's footprint: issues they created, and the comments,
//! labels and closes they authored across every issue's events.

use serde::Serialize;

use crate::analytics::engine::{IssueAnalysis, Report};
use crate::analytics::ranking::{FrequencyCounter, RankedCount};
use crate::config::RunParams;
use crate::error::Result;
use crate::types::{EventKind, Issue};

/// Interaction counts for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInsight {
    pub user: String,
    pub created: usize,
    pub commented: usize,
    pub labeled: usize,
    pub closed: usize,
    /// Labels the user applied, most frequent first
    pub label_interactions: Vec<RankedCount>,
}

impl UserInsight {
    /// Whether the user appears anywhere in the collection.
    pub fn is_active(&self) -> bool {
        self.created + self.commented + self.labeled + self.closed > 0
    }
}

impl std::fmt::Display for UserInsight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Insights for User: {}", self.user)?;
        writeln!(f, "Issues Created: {}", self.created)?;
        writeln!(f, "Comments Made: {}", self.commented)?;
        writeln!(f, "Issues Labeled: {}", self.labeled)?;
        writeln!(f, "Issues Closed: {}", self.closed)?;
        writeln!(f)?;
        write!(f, "Label Interactions:")?;
        for label in &self.label_interactions {
            write!(f, "\n  {}: {}", label.name, label.count)?;
        }
        Ok(())
    }
}

/// Summarize `user`'s activity.
pub fn summarize_user(issues: &[Issue], user: &str) -> UserInsight {
    let mut insight = UserInsight {
        user: user.to_string(),
        ..Default::default()
    };
    let mut labels = FrequencyCounter::new();

    for issue in issues {
        if issue.creator == user {
            insight.created += 1;
        }
        for event in issue.events.iter().filter(|e| e.is_by(user)) {
            match event.kind {
                EventKind::Commented => insight.commented += 1,
                EventKind::Labeled => {
                    insight.labeled += 1;
                    if let Some(label) = event.label_payload() {
                        labels.add(label);
                    }
                }
                EventKind::Closed => insight.closed += 1,
                _ => {}
            }
        }
    }

    insight.label_interactions = labels.into_ranked();
    insight
}

/// Analyzer for a single user's activity.
pub struct UserActivityAnalyzer;

impl UserActivityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UserActivityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueAnalysis for UserActivityAnalyzer {
    fn name(&self) -> &str {
        "user_activity"
    }

    fn description(&self) -> &str {
        "Issues created, comments, labels and closes by --user"
    }

    fn analyze(&self, issues: &[Issue], params: &RunParams) -> Result<Report> {
        let user = params.require_user()?;
        let insight = summarize_user(issues, user);
        if !insight.is_active() {
            tracing::debug!(user, "User has no recorded activity");
        }
        Ok(Report::UserActivity(insight))
    }
}
