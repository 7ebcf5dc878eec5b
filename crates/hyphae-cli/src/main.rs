//! Hyphae CLI - map who knows what in a repository's contribution history.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use hyphae_core::config::AnalyticsConfig;
use hyphae_core::output::{write_output, AnalyticsReport, DistributionType};
use hyphae_core::pipeline;
use hyphae_core::Engine;

#[derive(Parser)]
#[command(
    name = "hyphae-map",
    version,
    about = "Hyphae - Map the hidden network of knowledge in your team"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest commit facts and write a full knowledge report for one repository
    Report {
        /// Commit facts: a .json/.jsonl file or a directory of them
        input: PathBuf,

        /// Repository to report on (owner/repo)
        #[arg(short, long)]
        repo: String,

        /// Output JSON file path
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        thresholds: Thresholds,

        /// Show per-phase timing breakdown
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long)]
        quiet: bool,
    },
    /// Run a single query and print its result as JSON
    Query {
        /// Which query to run
        #[arg(value_enum)]
        kind: QueryKind,

        /// Commit facts: a .json/.jsonl file or a directory of them
        input: PathBuf,

        /// Repository to query (owner/repo)
        #[arg(short, long)]
        repo: String,

        /// Maximum number of results (defaults to the per-query limit of the report)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Departing developer handle (replacements only)
        #[arg(short, long)]
        developer: Option<String>,

        #[command(flatten)]
        thresholds: Thresholds,

        /// Log query timings to stderr
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct Thresholds {
    /// Minimum coverage for a developer to count as a jack
    #[arg(long, default_value = "0.3")]
    min_coverage: f64,

    /// Files with at most this many contributors count as high risk
    #[arg(long, default_value = "2")]
    high_risk_max_contributors: usize,

    /// Skewness above which knowledge is hero-driven
    #[arg(long, default_value = "1.0")]
    hero_skewness: f64,

    /// Top coverage above this multiple of the mean is hero-driven
    #[arg(long, default_value = "3.0")]
    hero_dominance_ratio: f64,
}

impl Thresholds {
    fn into_config(self) -> AnalyticsConfig {
        AnalyticsConfig {
            min_coverage: self.min_coverage,
            high_risk_max_contributors: self.high_risk_max_contributors,
            hero_skewness: self.hero_skewness,
            hero_dominance_ratio: self.hero_dominance_ratio,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum QueryKind {
    Jacks,
    Mavens,
    Connectors,
    Distribution,
    BusFactor,
    Replacements,
    Collaborations,
    CriticalFiles,
    Contributions,
    Summary,
}

impl QueryKind {
    /// Limit used when `--limit` is not given, matching the report's section sizes.
    fn default_limit(self, config: &AnalyticsConfig) -> usize {
        match self {
            QueryKind::Jacks => config.jack_limit,
            QueryKind::Mavens => config.maven_limit,
            QueryKind::Connectors => config.connector_limit,
            QueryKind::BusFactor => config.bus_factor_limit,
            QueryKind::Replacements => config.replacement_limit,
            QueryKind::Collaborations => config.collaboration_limit,
            QueryKind::CriticalFiles => config.critical_file_limit,
            QueryKind::Contributions => config.contribution_limit,
            QueryKind::Distribution | QueryKind::Summary => 0,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Commands::Report { verbose, .. } | Commands::Query { verbose, .. } => *verbose,
    };
    init_logging(verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e:#}", style("error:").red().bold());
        std::process::exit(1);
    }
}

/// Route `log` records through tracing-subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Report {
            input,
            repo,
            output,
            thresholds,
            verbose,
            quiet,
        } => {
            let output_path =
                output.unwrap_or_else(|| format!("{}.hyphae.json", repo.replace('/', "_")));
            let engine = Engine::new(thresholds.into_config());
            if quiet {
                run_quiet(&engine, &input, &repo, &output_path)
            } else {
                run_with_progress(&engine, &input, &repo, &output_path, verbose)
            }
        }
        Commands::Query {
            kind,
            input,
            repo,
            limit,
            developer,
            thresholds,
            ..
        } => {
            let engine = Engine::new(thresholds.into_config());
            ingest(&engine, &input)?;
            let value = run_query(&engine, kind, &repo, limit, developer.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

fn ingest(engine: &Engine, input: &Path) -> Result<()> {
    engine
        .ingest_path(input)
        .with_context(|| format!("failed to ingest {}", input.display()))?;
    Ok(())
}

fn run_query(
    engine: &Engine,
    kind: QueryKind,
    repo: &str,
    limit: Option<usize>,
    developer: Option<&str>,
) -> Result<serde_json::Value> {
    let config = engine.config();
    let limit = limit.unwrap_or_else(|| kind.default_limit(config));
    let value = match kind {
        QueryKind::Jacks => {
            serde_json::to_value(engine.jacks(repo, config.min_coverage, limit)?)?
        }
        QueryKind::Mavens => serde_json::to_value(engine.mavens(repo, limit)?)?,
        QueryKind::Connectors => serde_json::to_value(engine.connectors(repo, limit)?)?,
        QueryKind::Distribution => serde_json::to_value(engine.knowledge_distribution(repo)?)?,
        QueryKind::BusFactor => serde_json::to_value(engine.bus_factor_overview(repo, limit)?)?,
        QueryKind::Replacements => {
            let Some(developer) = developer else {
                bail!("--developer is required for replacements");
            };
            serde_json::to_value(engine.replacements(repo, developer, limit)?)?
        }
        QueryKind::Collaborations => serde_json::to_value(engine.collaborations(repo, limit)?)?,
        QueryKind::CriticalFiles => serde_json::to_value(engine.critical_files(repo, limit)?)?,
        QueryKind::Contributions => {
            serde_json::to_value(engine.developer_contributions(repo, limit)?)?
        }
        QueryKind::Summary => serde_json::to_value(engine.repository_summary(repo)?)?,
    };
    Ok(value)
}

fn run_quiet(engine: &Engine, input: &Path, repo: &str, output_path: &str) -> Result<()> {
    ingest(engine, input)?;
    let report = pipeline::run_report(engine, repo, None)?;
    write_output(&report, output_path)
        .with_context(|| format!("failed to write {output_path}"))?;
    Ok(())
}

fn run_with_progress(
    engine: &Engine,
    input: &Path,
    repo: &str,
    output_path: &str,
    verbose: bool,
) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message("Ingesting commit facts...");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let start = Instant::now();
    let progress: pipeline::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |_name, label| {
            pb.set_message(label.to_string());
        })
    };
    let report = ingest(engine, input)
        .and_then(|_| pipeline::run_report(engine, repo, Some(progress)).map_err(Into::into));
    pb.finish_and_clear();
    let report = report?;

    print_summary(&report, repo, start, verbose);

    write_output(&report, output_path)
        .with_context(|| format!("failed to write {output_path}"))?;
    println!(
        "\n  {} {}",
        style("Output written to:").green(),
        output_path
    );
    Ok(())
}

fn print_summary(report: &AnalyticsReport, repo: &str, start: Instant, verbose: bool) {
    println!(
        "\n{}  Hyphae Analysis: {}",
        style("✓").green().bold(),
        style(repo).bold()
    );
    for (label, key) in [
        ("Developers:", "developers"),
        ("Commits:", "commits"),
        ("Files:", "files"),
        ("High risk:", "high_risk_files"),
        ("Pairs:", "collaborations"),
    ] {
        println!(
            "  {:<14} {}",
            label,
            report.stats.get(key).unwrap_or(&serde_json::json!(0))
        );
    }
    if let Some(kd) = &report.knowledge_distribution {
        let kind = match kd.distribution_type {
            DistributionType::Hero => style(kd.distribution_type.as_str()).yellow(),
            _ => style(kd.distribution_type.as_str()).green(),
        };
        println!("  {:<14} {} (top: {})", "Knowledge:", kind, kd.top_contributor);
    }
    println!(
        "  {:<14} {:.1}ms",
        "Duration:",
        start.elapsed().as_secs_f64() * 1000.0
    );

    if verbose {
        if let Some(serde_json::Value::Object(timings)) = report.metadata.get("phase_timings") {
            println!("\n  Phase Timings:");
            for (phase, secs) in timings {
                if let Some(val) = secs.as_f64() {
                    println!("    {:<16} {:.2}ms", phase, val * 1000.0);
                }
            }
        }
    }
}
