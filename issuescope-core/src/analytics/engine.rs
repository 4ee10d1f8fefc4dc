//! Analysis framework
//!
//! Analyses consume the loaded issue collection and produce one [`Report`]
//! each. They are pure: same issues and parameters, same report.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       ANALYSIS ENGINE                           │
//! │                                                                 │
//! │  ┌──────────────┐  ┌─────────────┐  ┌──────────────┐            │
//! │  │ label_       │  │ reopened    │  │ label_trends │  ...       │
//! │  │ categories   │  │             │  │              │            │
//! │  └──────┬───────┘  └──────┬──────┘  └──────┬───────┘            │
//! │         │                 │                │                    │
//! │         ▼                 ▼                ▼                    │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              AnalysisEngine.run()                       │   │
//! │  │  - Calls analysis.analyze(issues, params)               │   │
//! │  │  - Configuration errors become Skipped runs             │   │
//! │  │  - Records timing and status in AnalysisRunResult       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use issuescope_core::analytics::create_default_engine;
//!
//! let engine = create_default_engine(&config.analysis);
//! for result in engine.run_all(&issues, &params) {
//!     println!("{}: {:?}", result.analysis_name, result.status);
//! }
//! ```

use crate::config::RunParams;
use crate::error::{Error, Result};
use crate::types::Issue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use super::plugins::label_categories::CategoryReport;
use super::plugins::label_trends::TrendReport;
use super::plugins::reopened::ReopenReport;
use super::plugins::time_to_milestone::MilestoneAnalysis;
use super::plugins::top_creators::CreatorRanking;
use super::plugins::user_activity::UserInsight;

// ============================================
// Reports
// ============================================

/// Output of one analysis.
///
/// Serializes for JSON output; `Display` renders the console report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    LabelCategories(CategoryReport),
    Reopened(ReopenReport),
    TimeToMilestone(MilestoneAnalysis),
    LabelTrends(TrendReport),
    UserActivity(UserInsight),
    TopCreators(CreatorRanking),
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::LabelCategories(r) => write!(f, "{}", r),
            Report::Reopened(r) => write!(f, "{}", r),
            Report::TimeToMilestone(r) => write!(f, "{}", r),
            Report::LabelTrends(r) => write!(f, "{}", r),
            Report::UserActivity(r) => write!(f, "{}", r),
            Report::TopCreators(r) => write!(f, "{}", r),
        }
    }
}

// ============================================
// Run results
// ============================================

/// Result of running one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRunResult {
    /// Name of the analysis that was run
    pub analysis_name: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// How long the analysis took (milliseconds)
    pub duration_ms: i64,
    /// Whether the run produced a report
    pub status: AnalysisRunStatus,
    /// User-facing message for skipped or failed runs
    pub message: Option<String>,
    /// The report, on success
    pub report: Option<Report>,
    /// Number of issues the analysis saw
    pub input_issue_count: usize,
}

/// Status of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisRunStatus {
    /// Report produced
    Success,
    /// A required parameter was missing; nothing was aggregated
    Skipped,
    /// The analysis failed
    Error,
}

impl AnalysisRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisRunStatus::Success => "success",
            AnalysisRunStatus::Skipped => "skipped",
            AnalysisRunStatus::Error => "error",
        }
    }
}

// ============================================
// Analysis trait
// ============================================

/// Trait that all analyses implement.
///
/// Analyses are stateless and must be:
/// - **Deterministic**: same input produces the same report
/// - **Read-only**: issues are never mutated
/// - **Total**: malformed records degrade into diagnostics, never panics
pub trait IssueAnalysis: Send + Sync {
    /// Unique name (e.g. "reopened", "label_trends").
    fn name(&self) -> &str;

    /// One-line description for `issuescope list`.
    fn description(&self) -> &str;

    /// Analyze the issue collection.
    ///
    /// Returns a configuration error (see [`Error::is_configuration`]) when a
    /// required run parameter is absent.
    fn analyze(&self, issues: &[Issue], params: &RunParams) -> Result<Report>;
}

// ============================================
// Analysis engine
// ============================================

/// Registry and runner for analyses.
pub struct AnalysisEngine {
    analyses: Vec<Box<dyn IssueAnalysis>>,
}

impl AnalysisEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self {
            analyses: Vec::new(),
        }
    }

    /// Register an analysis with the engine.
    pub fn register(&mut self, analysis: Box<dyn IssueAnalysis>) {
        tracing::debug!(analysis = analysis.name(), "Registered analysis");
        self.analyses.push(analysis);
    }

    /// Names of registered analyses, in registration order.
    pub fn analysis_names(&self) -> Vec<&str> {
        self.analyses.iter().map(|a| a.name()).collect()
    }

    /// `(name, description)` pairs for listing.
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.analyses
            .iter()
            .map(|a| (a.name(), a.description()))
            .collect()
    }

    /// Check if an analysis is registered.
    pub fn has_analysis(&self, name: &str) -> bool {
        self.analyses.iter().any(|a| a.name() == name)
    }

    /// Run one analysis by name.
    ///
    /// Only an unknown name is an `Err`; analysis failures are reported in the
    /// returned result's status.
    pub fn run(
        &self,
        name: &str,
        issues: &[Issue],
        params: &RunParams,
    ) -> Result<AnalysisRunResult> {
        let analysis = self
            .analyses
            .iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| Error::UnknownAnalysis(name.to_string()))?;

        let started_at = Utc::now();
        let start = Instant::now();

        tracing::debug!(
            analysis = analysis.name(),
            issue_count = issues.len(),
            label = ?params.get_parameter("label"),
            user = ?params.get_parameter("user"),
            "Running analysis"
        );

        let outcome = analysis.analyze(issues, params);
        let duration_ms = start.elapsed().as_millis() as i64;

        let (status, message, report) = match outcome {
            Ok(report) => {
                tracing::info!(
                    analysis = analysis.name(),
                    duration_ms,
                    "Analysis completed successfully"
                );
                (AnalysisRunStatus::Success, None, Some(report))
            }
            Err(e) if e.is_configuration() => {
                tracing::info!(analysis = analysis.name(), reason = %e, "Analysis skipped");
                (AnalysisRunStatus::Skipped, Some(e.to_string()), None)
            }
            Err(e) => {
                tracing::error!(analysis = analysis.name(), error = %e, "Analysis failed");
                (AnalysisRunStatus::Error, Some(e.to_string()), None)
            }
        };

        Ok(AnalysisRunResult {
            analysis_name: analysis.name().to_string(),
            started_at,
            duration_ms,
            status,
            message,
            report,
            input_issue_count: issues.len(),
        })
    }

    /// Run every registered analysis.
    ///
    /// A skipped or failed analysis does not stop the others.
    pub fn run_all(&self, issues: &[Issue], params: &RunParams) -> Vec<AnalysisRunResult> {
        self.analyses
            .iter()
            .filter_map(|a| self.run(a.name(), issues, params).ok())
            .collect()
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
