//! issuescope - analytics over issue-tracker exports
//!
//! Loads a JSON issue collection once and runs one or all analyses over it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use issuescope_core::analytics::{
    create_default_engine, AnalysisEngine, AnalysisRunResult, AnalysisRunStatus,
};
use issuescope_core::ingest::{load_issues, JsonFileSource};
use issuescope_core::Config;

#[derive(Parser)]
#[command(name = "issuescope")]
#[command(about = "Run analytics over an issue-tracker export")]
#[command(version)]
struct Args {
    /// Analysis to run, `all` to run every analysis, or `list` to show them
    #[arg(default_value = "all")]
    analysis: String,

    /// Issue dataset (JSON array); overrides ISSUESCOPE_DATA_PATH and config
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Label prefix or exact label, depending on the analysis
    #[arg(short, long)]
    label: Option<String>,

    /// User whose activity to report
    #[arg(short, long)]
    user: Option<String>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard = issuescope_core::logging::init(&config.logging)
        .context("failed to initialize logging")?;

    let engine = create_default_engine(&config.analysis);

    if args.analysis == "list" {
        println!("Available analyses:");
        for (name, description) in engine.describe() {
            println!("  - {:<24} {}", name, description);
        }
        return Ok(());
    }

    let json = match args.format.as_str() {
        "text" => false,
        "json" => true,
        other => anyhow::bail!("unknown output format '{}' (expected text or json)", other),
    };

    let names: Vec<String> = if args.analysis == "all" {
        engine
            .analysis_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else if engine.has_analysis(&args.analysis) {
        vec![args.analysis.clone()]
    } else {
        anyhow::bail!(
            "unknown analysis '{}'; run `issuescope list` to see available analyses",
            args.analysis
        );
    };

    let data_path = config.dataset_path(args.data.as_deref())?;
    let issues = load_issues(&JsonFileSource::new(&data_path))
        .with_context(|| format!("failed to load issues from {}", data_path.display()))?;

    let params = config.run_params(args.label, args.user);
    tracing::info!(
        analyses = names.len(),
        issues = issues.len(),
        "Starting analysis run"
    );

    let results = run_selected(&engine, &names, &issues, &params)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_text_results(&results);
    }

    let failed = results
        .iter()
        .filter(|r| r.status == AnalysisRunStatus::Error)
        .count();
    if failed > 0 {
        anyhow::bail!(failure_summary(failed, &issuescope_core::logging::log_file_path()));
    }

    Ok(())
}

fn failure_summary(failed: usize, log_path: &Path) -> String {
    format!(
        "{} analysis run(s) failed; see {} for details",
        failed,
        log_path.display()
    )
}

fn run_selected(
    engine: &AnalysisEngine,
    names: &[String],
    issues: &[issuescope_core::Issue],
    params: &issuescope_core::RunParams,
) -> Result<Vec<AnalysisRunResult>> {
    names
        .iter()
        .map(|name| {
            engine
                .run(name, issues, params)
                .with_context(|| format!("failed to run analysis {}", name))
        })
        .collect()
}

fn print_text_results(results: &[AnalysisRunResult]) {
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match result.status {
            AnalysisRunStatus::Success => {
                if let Some(report) = &result.report {
                    println!("{}", report);
                }
            }
            AnalysisRunStatus::Skipped => {
                if let Some(message) = &result.message {
                    println!("{}", message);
                }
            }
            AnalysisRunStatus::Error => {
                eprintln!(
                    "Analysis {} failed: {}",
                    result.analysis_name,
                    result.message.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}
