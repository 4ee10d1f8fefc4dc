//! Analytics over the loaded issue collection
//!
//! Every analysis implements [`IssueAnalysis`] and produces one [`Report`].
//! The [`AnalysisEngine`] runs them by name, turning missing run parameters
//! into skipped runs rather than failures.
//!
//! See [`engine`] for the framework and [`plugins`] for the built-in analyses.

pub mod engine;
pub mod plugins;
pub mod ranking;

pub use engine::{AnalysisEngine, AnalysisRunResult, AnalysisRunStatus, IssueAnalysis, Report};
pub use plugins::create_default_engine;
pub use ranking::{FrequencyCounter, RankedCount};
