//! dds-check application.
//!
//! This module contains a top-level structure [`App`] that represents the
//! whole `dds-check` application. It runs the reference model against the
//! LUT device emulation for every configuration of a set of parameter sweeps
//! and writes the LUT files and a JSON report to an output directory.

use crate::{
    args::CheckArgs,
    report,
    stimulus::DEFAULT_INCREMENT,
    sweep::{self, Run},
};
use anyhow::{Context, Result};
use chrono::Utc;
use dds_json::Sweep;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::task::JoinSet;

/// Name of the report file written to the output directory.
pub const REPORT_FILE: &str = "report.json";

/// dds-check application.
///
/// Each configuration is an independent single-threaded lockstep run, so
/// runs are spread over the tokio blocking thread pool.
#[derive(Debug)]
pub struct App {
    sweeps: Vec<Sweep>,
    output: PathBuf,
    increment: Option<u64>,
    num_items: Option<usize>,
}

impl App {
    /// Creates a new application.
    ///
    /// The sweep file, if any, is read and parsed, and the output directory is
    /// created.
    #[tracing::instrument(name = "App::new", level = "debug")]
    pub async fn new(args: &CheckArgs) -> Result<App> {
        let sweeps = match &args.sweep {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let sweep: Sweep = serde_json::from_str(&json)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                vec![sweep]
            }
            None => sweep::default_sweeps(),
        };
        tokio::fs::create_dir_all(&args.output)
            .await
            .with_context(|| format!("failed to create {}", args.output.display()))?;
        Ok(App {
            sweeps,
            output: args.output.clone(),
            increment: args.increment,
            num_items: args.num_items,
        })
    }

    /// Runs the application.
    ///
    /// Returns an error if any run fails, after the report has been written.
    #[tracing::instrument(name = "App::run", level = "debug", skip_all)]
    pub async fn run(self) -> Result<()> {
        let mut runs = JoinSet::new();
        let mut num_runs = 0;
        for definition in &self.sweeps {
            let increment = self
                .increment
                .or(definition.increment)
                .unwrap_or(DEFAULT_INCREMENT);
            let num_items = self.num_items.or(definition.num_items);
            for config in sweep::expand(definition)? {
                let index = num_runs;
                runs.spawn_blocking(move || (index, sweep::run(config, increment, num_items)));
                num_runs += 1;
            }
        }
        tracing::info!(num_runs, "started runs");

        let mut finished = Vec::with_capacity(num_runs);
        let mut lut_files = HashSet::new();
        while let Some(result) = runs.join_next().await {
            let (index, run) = result?;
            let run = run?;
            let lut_file = self.write_lut(&run, &mut lut_files).await?;
            finished.push((index, report::run_report(&run, Some(lut_file), &Utc::now())));
        }
        finished.sort_by_key(|(index, _)| *index);

        let report = report::sweep_report(finished.into_iter().map(|(_, run)| run).collect());
        let path = self.output.join(REPORT_FILE);
        tokio::fs::write(&path, serde_json::to_string_pretty(&report)?)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            report = %path.display(),
            "sweep finished"
        );
        for run in report.runs.iter().filter(|run| !run.passed) {
            tracing::error!(
                config = ?run.config,
                mismatch = run.mismatch.as_deref().unwrap_or_default(),
                "run failed"
            );
        }
        anyhow::ensure!(
            report.failed == 0,
            "{} of {} runs failed",
            report.failed,
            report.runs.len()
        );
        Ok(())
    }

    // Configurations that share a LUT write it only once.
    async fn write_lut(&self, run: &Run, written: &mut HashSet<String>) -> Result<String> {
        let name = report::lut_file_name(&run.config);
        if written.insert(name.clone()) {
            let path = self.output.join(&name);
            tokio::fs::write(&path, run.lut.encode(run.config.lut_encoding()))
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "wrote sine LUT");
        }
        Ok(name)
    }
}
