//! Loading issue collections
//!
//! Analyses never touch storage: a [`IssueSource`] hands over the whole
//! collection once, and [`load_issues`] collapses "no data" into an empty
//! collection. Records are decoded one at a time: a record that cannot be
//! read as an issue is skipped with a warning instead of failing the load.
//!
//! ```text
//! ┌──────────────────┐     ┌─────────────┐     ┌────────────────┐
//! │ issues.json      │ ──► │ IssueSource │ ──► │ Vec<Issue>     │
//! │ (array or null)  │     │ (load once) │     │ (read-only)    │
//! └──────────────────┘     └─────────────┘     └────────────────┘
//! ```

use crate::error::Result;
use crate::types::Issue;
use std::path::{Path, PathBuf};

/// Something that can produce the full issue collection.
pub trait IssueSource {
    /// Load every issue. `Ok(None)` means the source holds no collection.
    fn load(&self) -> Result<Option<Vec<Issue>>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// A JSON file holding an array of issue records (or `null`).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IssueSource for JsonFileSource {
    fn load(&self) -> Result<Option<Vec<Issue>>> {
        let content = std::fs::read_to_string(&self.path)?;
        let records: Option<Vec<serde_json::Value>> = serde_json::from_str(&content)?;
        Ok(records.map(|records| decode_records(records, &self.describe())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn decode_records(records: Vec<serde_json::Value>, source: &str) -> Vec<Issue> {
    let total = records.len();
    let mut issues = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Issue>(record) {
            Ok(issue) => issues.push(issue),
            Err(e) => tracing::warn!(source, index, error = %e, "Skipping unreadable issue record"),
        }
    }

    let skipped = total - issues.len();
    if skipped > 0 {
        tracing::warn!(source, skipped, total, "Some issue records were skipped");
    }
    issues
}

/// Load the collection, treating an absent one as empty.
pub fn load_issues(source: &dyn IssueSource) -> Result<Vec<Issue>> {
    match source.load()? {
        Some(issues) => {
            let event_count: usize = issues.iter().map(|i| i.events.len()).sum();
            tracing::info!(
                source = %source.describe(),
                issues = issues.len(),
                events = event_count,
                "Loaded issue collection"
            );
            Ok(issues)
        }
        None => {
            tracing::info!(
                source = %source.describe(),
                "Source holds no issue collection, treating as empty"
            );
            Ok(Vec::new())
        }
    }
}
