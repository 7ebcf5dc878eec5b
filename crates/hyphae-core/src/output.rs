//! Result records returned by the engine, and JSON serialisation of full reports.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Broad-knowledge developer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jack {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub files_reached: usize,
    pub total_files: usize,
    pub coverage: f64,
}

/// Sole historical contributor to one or more files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maven {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub rare_files_count: usize,
    pub total_files: usize,
    pub mavenness: f64,
}

/// Developer bridging many peers across many shared files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub collaborator_count: usize,
    pub shared_file_count: usize,
    /// `collaborator_count * shared_file_count`, a stand-in for betweenness centrality.
    pub centrality_score: u64,
}

/// Candidate to take over a departing developer's files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub leaving_file_count: usize,
    pub shared_file_count: usize,
    pub overlap_ratio: f64,
}

/// Whether knowledge is concentrated in a few people.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DistributionType {
    Hero,
    Balanced,
    Unknown,
}

impl DistributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Balanced => "balanced",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DistributionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team-wide coverage statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDistribution {
    pub top_contributor: String,
    pub top_coverage: f64,
    pub average_coverage: f64,
    pub coverage_std_dev: f64,
    pub skewness: f64,
    pub developer_count: usize,
    pub total_files: usize,
    pub distribution_type: DistributionType,
}

impl KnowledgeDistribution {
    /// Sentinel for repositories with no developers or no files.
    pub fn unknown(developer_count: usize, total_files: usize) -> Self {
        Self {
            top_contributor: "unknown".to_string(),
            top_coverage: 0.0,
            average_coverage: 0.0,
            coverage_std_dev: 0.0,
            skewness: 0.0,
            developer_count,
            total_files,
            distribution_type: DistributionType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskFile {
    pub path: String,
    pub filename: String,
    pub owner: Option<String>,
    pub contributor_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRisk {
    pub module: String,
    pub file_count: usize,
    /// Mean contributor count over the module's files.
    pub bus_factor: f64,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusFactorOverview {
    pub overall_bus_factor: f64,
    pub total_files: usize,
    pub high_risk_files: Vec<HighRiskFile>,
    pub module_risks: Vec<ModuleRisk>,
}

impl BusFactorOverview {
    pub fn empty() -> Self {
        Self {
            overall_bus_factor: 0.0,
            total_files: 0,
            high_risk_files: Vec::new(),
            module_risks: Vec::new(),
        }
    }
}

/// Two developers and the number of files both have touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaboration {
    pub developer1: String,
    pub name1: String,
    pub developer2: String,
    pub name2: String,
    pub collaboration_strength: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalFile {
    pub path: String,
    pub filename: String,
    pub contributors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperContribution {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub commits: usize,
    pub files_touched: usize,
    pub total_files: usize,
    pub coverage: f64,
}

/// Headline numbers for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub repository: String,
    pub url: String,
    pub description: String,
    pub developer_count: usize,
    pub commit_count: usize,
    pub file_count: usize,
    pub distribution_type: DistributionType,
    pub top_contributor: String,
    pub top_jacks: Vec<Jack>,
    pub top_mavens: Vec<Maven>,
    pub top_connectors: Vec<Connector>,
}

/// Every query family for one repository, as written by the report pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
    pub summary: Option<RepositorySummary>,
    #[serde(default)]
    pub jacks: Vec<Jack>,
    #[serde(default)]
    pub mavens: Vec<Maven>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    pub knowledge_distribution: Option<KnowledgeDistribution>,
    pub bus_factor: Option<BusFactorOverview>,
    #[serde(default)]
    pub collaborations: Vec<Collaboration>,
    #[serde(default)]
    pub critical_files: Vec<CriticalFile>,
    #[serde(default)]
    pub contributions: Vec<DeveloperContribution>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for AnalyticsReport {
    fn default() -> Self {
        Self {
            version: default_version(),
            metadata: HashMap::new(),
            stats: HashMap::new(),
            summary: None,
            jacks: Vec::new(),
            mavens: Vec::new(),
            connectors: Vec::new(),
            knowledge_distribution: None,
            bus_factor: None,
            collaborations: Vec::new(),
            critical_files: Vec::new(),
            contributions: Vec::new(),
        }
    }
}

/// Fill in report metadata and stats once every phase has run.
pub fn finalize_report(
    report: &mut AnalyticsReport,
    repository: &str,
    timings: &HashMap<String, f64>,
    total_ms: f64,
) {
    let metadata = &mut report.metadata;
    metadata.insert(
        "repository".to_string(),
        serde_json::Value::String(repository.to_string()),
    );
    metadata.insert(
        "analysed_at".to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339()),
    );
    metadata.insert(
        "hyphae_version".to_string(),
        serde_json::Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    metadata.insert(
        "analysis_duration_ms".to_string(),
        serde_json::json!(((total_ms * 10.0).round() / 10.0)),
    );
    metadata.insert(
        "phase_timings".to_string(),
        serde_json::to_value(timings).unwrap_or_default(),
    );

    let (developers, commits, files) = report
        .summary
        .as_ref()
        .map(|s| (s.developer_count, s.commit_count, s.file_count))
        .unwrap_or_default();
    let stats = &mut report.stats;
    stats.insert("developers".to_string(), serde_json::json!(developers));
    stats.insert("commits".to_string(), serde_json::json!(commits));
    stats.insert("files".to_string(), serde_json::json!(files));
    stats.insert(
        "high_risk_files".to_string(),
        serde_json::json!(report
            .bus_factor
            .as_ref()
            .map(|b| b.high_risk_files.len())
            .unwrap_or(0)),
    );
    stats.insert(
        "collaborations".to_string(),
        serde_json::json!(report.collaborations.len()),
    );
    stats.insert(
        "distribution_type".to_string(),
        serde_json::json!(report
            .knowledge_distribution
            .as_ref()
            .map(|k| k.distribution_type)
            .unwrap_or(DistributionType::Unknown)),
    );
}

/// Write an analytics report to a JSON file.
pub fn write_output(report: &AnalyticsReport, output_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(output_path, json)
}
