//! # issuescope-core
//!
//! Core library for issuescope, a batch analytics engine over issue-tracker
//! exports.
//!
//! This library provides:
//! - Domain types for issues and their event histories
//! - Date normalization with invalid-date diagnostics
//! - Pluggable analyses (label categories, reopens, time to close/assign,
//!   label trends, user activity, top creators)
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use issuescope_core::analytics::create_default_engine;
//! use issuescope_core::ingest::{load_issues, JsonFileSource};
//! use issuescope_core::Config;
//!
//! let config = Config::load().expect("failed to load config");
//! let path = config.dataset_path(None).expect("no dataset configured");
//! let issues = load_issues(&JsonFileSource::new(path)).expect("failed to load issues");
//!
//! let engine = create_default_engine(&config.analysis);
//! let params = config.run_params(None, None);
//! for result in engine.run_all(&issues, &params) {
//!     if let Some(report) = result.report {
//!         println!("{}", report);
//!     }
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, RunParams};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod temporal;
pub mod types;
