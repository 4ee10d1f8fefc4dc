//! Built-in analyses
//!
//! Each analysis lives in its own subdirectory.
//!
//! ## Built-in Analyses
//!
//! - [`label_categories`]: `prefix/category` counts from labeled events or issue labels
//! - [`reopened`]: issues reopened after closing
//! - [`time_to_milestone`]: days from creation to close or to first assignment
//! - [`label_trends`]: monthly counts for the most frequent labels
//! - [`user_activity`]: one user's created issues, comments, labels and closes
//! - [`top_creators`]: creators ranked by issues opened
//!
//! ## Adding an Analysis
//!
//! 1. Implement [`IssueAnalysis`](super::IssueAnalysis) in a new module
//! 2. Register it with [`AnalysisEngine::register`](super::AnalysisEngine::register)
//!
//! Or use [`create_default_engine`] to get an engine with every built-in analysis.

pub mod label_categories;
pub mod label_trends;
pub mod reopened;
pub mod time_to_milestone;
pub mod top_creators;
pub mod user_activity;

use super::{AnalysisEngine, IssueAnalysis};
use crate::config::AnalysisConfig;

/// Create an engine with every built-in analysis not listed in
/// `config.disabled_analyses`.
///
/// ```rust,ignore
/// use issuescope_core::analytics::create_default_engine;
///
/// let engine = create_default_engine(&config.analysis);
/// println!("Registered analyses: {:?}", engine.analysis_names());
/// ```
pub fn create_default_engine(config: &AnalysisConfig) -> AnalysisEngine {
    let builtin: Vec<Box<dyn IssueAnalysis>> = vec![
        Box::new(label_categories::LabelCategoriesAnalyzer::events()),
        Box::new(label_categories::LabelCategoriesAnalyzer::issue_labels()),
        Box::new(reopened::ReopenedAnalyzer::new()),
        Box::new(time_to_milestone::TimeToMilestoneAnalyzer::new(
            time_to_milestone::Milestone::Close,
        )),
        Box::new(time_to_milestone::TimeToMilestoneAnalyzer::new(
            time_to_milestone::Milestone::Assign,
        )),
        Box::new(label_trends::LabelTrendsAnalyzer::new()),
        Box::new(user_activity::UserActivityAnalyzer::new()),
        Box::new(top_creators::TopCreatorsAnalyzer::new(config.top_creators)),
    ];

    let mut engine = AnalysisEngine::new();
    for analysis in builtin {
        if config
            .disabled_analyses
            .iter()
            .any(|name| name == analysis.name())
        {
            tracing::debug!(analysis = analysis.name(), "Analysis disabled by config");
            continue;
        }
        engine.register(analysis);
    }
    engine
}
