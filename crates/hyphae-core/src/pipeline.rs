//! Sequential report orchestrator with timing.

use std::collections::HashMap;
use std::time::Instant;

use crate::engine::Engine;
use crate::error::Result;
use crate::output::{finalize_report, AnalyticsReport};

/// Phase labels for progress reporting.
const PHASE_LABELS: &[(&str, &str)] = &[
    ("summary", "Summarising repository"),
    ("roles", "Classifying jacks, mavens and connectors"),
    ("distribution", "Measuring knowledge distribution"),
    ("bus_factor", "Ranking bus-factor risks"),
    ("collaboration", "Pairing collaborators"),
    ("critical_files", "Ranking critical files"),
    ("contributions", "Tabulating contributions"),
];

/// Progress callback type: (phase_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

type PhaseFn = Box<dyn FnOnce(&Engine, &str, &mut AnalyticsReport) -> Result<()>>;

/// Run every query family for `repo` and collect the results into one report.
///
/// Fails with `NotFound` if the repository has not been ingested.
pub fn run_report(
    engine: &Engine,
    repo: &str,
    mut progress_callback: Option<ProgressCallback>,
) -> Result<AnalyticsReport> {
    let mut report = AnalyticsReport::default();
    let mut timings: HashMap<String, f64> = HashMap::new();
    let total_start = Instant::now();

    let phase_fns: Vec<(&str, PhaseFn)> = vec![
        (
            "summary",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                report.summary = Some(engine.repository_summary(repo)?);
                Ok(())
            }),
        ),
        (
            "roles",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                let cfg = engine.config();
                report.jacks = engine.jacks(repo, cfg.min_coverage, cfg.jack_limit)?;
                report.mavens = engine.mavens(repo, cfg.maven_limit)?;
                report.connectors = engine.connectors(repo, cfg.connector_limit)?;
                Ok(())
            }),
        ),
        (
            "distribution",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                report.knowledge_distribution = Some(engine.knowledge_distribution(repo)?);
                Ok(())
            }),
        ),
        (
            "bus_factor",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                let limit = engine.config().bus_factor_limit;
                report.bus_factor = Some(engine.bus_factor_overview(repo, limit)?);
                Ok(())
            }),
        ),
        (
            "collaboration",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                let limit = engine.config().collaboration_limit;
                report.collaborations = engine.collaborations(repo, limit)?;
                Ok(())
            }),
        ),
        (
            "critical_files",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                let limit = engine.config().critical_file_limit;
                report.critical_files = engine.critical_files(repo, limit)?;
                Ok(())
            }),
        ),
        (
            "contributions",
            Box::new(|engine: &Engine, repo: &str, report: &mut AnalyticsReport| -> Result<()> {
                let limit = engine.config().contribution_limit;
                report.contributions = engine.developer_contributions(repo, limit)?;
                Ok(())
            }),
        ),
    ];

    for (name, phase_fn) in phase_fns {
        if let Some(ref mut cb) = progress_callback {
            let label = PHASE_LABELS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, l)| *l)
                .unwrap_or(name);
            cb(name, label);
        }

        let start = Instant::now();
        phase_fn(engine, repo, &mut report)?;
        timings.insert(name.to_string(), start.elapsed().as_secs_f64());
    }

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    finalize_report(&mut report, repo, &timings, total_ms);
    log::info!("report for {repo} built in {total_ms:.1}ms");
    Ok(report)
}
