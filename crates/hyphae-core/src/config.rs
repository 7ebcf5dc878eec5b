//! Core data types and configuration for Hyphae analytics.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HyphaeError, Result};

/// Handle recorded for commits whose author has no hosting-platform login.
pub const UNKNOWN_HANDLE: &str = "unknown";

/// `owner/repo`, each side made of ASCII letters, digits, `_`, `.` or `-`.
static REPO_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap());

/// Reject repository identifiers that are not of the form `owner/repo`.
pub fn validate_repo_name(name: &str) -> Result<()> {
    if REPO_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(HyphaeError::invalid(format!(
            "repository name '{name}' is not of the form owner/repo"
        )))
    }
}

/// Kind of change a commit made to a file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository attributes carried on every inbound commit fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    #[serde(rename = "repository_name")]
    pub name: String,
    #[serde(rename = "repository_url", default)]
    pub url: String,
    #[serde(rename = "repository_description", default)]
    pub description: String,
}

/// Commit author as reported by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorFact {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Trimmed handle, with a blank one mapped to [`UNKNOWN_HANDLE`].
pub fn normalized_handle(handle: &str) -> &str {
    let handle = handle.trim();
    if handle.is_empty() {
        UNKNOWN_HANDLE
    } else {
        handle
    }
}

impl AuthorFact {
    pub fn normalized_handle(&self) -> &str {
        normalized_handle(&self.handle)
    }
}

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
}

/// Inbound commit fact, tagged with its repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitFact {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message: String,
    pub author: AuthorFact,
    #[serde(default)]
    pub changes: Vec<FileChange>,
    #[serde(flatten)]
    pub repository: RepositoryInfo,
}

impl CommitFact {
    /// Check the fact before anything is written for it.
    pub fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repository.name)?;
        if self.hash.trim().is_empty() {
            return Err(HyphaeError::invalid("commit hash is empty"));
        }
        for change in &self.changes {
            if change.path.trim().is_empty() {
                return Err(HyphaeError::invalid(format!(
                    "commit {} has a change with an empty path",
                    self.hash
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds and default limits for the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_min_coverage")]
    pub min_coverage: f64,
    #[serde(default = "default_high_risk_max_contributors")]
    pub high_risk_max_contributors: usize,
    #[serde(default = "default_hero_skewness")]
    pub hero_skewness: f64,
    #[serde(default = "default_hero_dominance_ratio")]
    pub hero_dominance_ratio: f64,
    #[serde(default = "default_summary_top_n")]
    pub summary_top_n: usize,
    #[serde(default = "default_role_limit")]
    pub jack_limit: usize,
    #[serde(default = "default_role_limit")]
    pub maven_limit: usize,
    #[serde(default = "default_role_limit")]
    pub connector_limit: usize,
    #[serde(default = "default_replacement_limit")]
    pub replacement_limit: usize,
    #[serde(default = "default_pair_limit")]
    pub collaboration_limit: usize,
    #[serde(default = "default_pair_limit")]
    pub critical_file_limit: usize,
    #[serde(default = "default_bus_factor_limit")]
    pub bus_factor_limit: usize,
    #[serde(default = "default_contribution_limit")]
    pub contribution_limit: usize,
}

fn default_min_coverage() -> f64 {
    0.3
}
fn default_high_risk_max_contributors() -> usize {
    2
}
fn default_hero_skewness() -> f64 {
    1.0
}
fn default_hero_dominance_ratio() -> f64 {
    3.0
}
fn default_summary_top_n() -> usize {
    3
}
fn default_role_limit() -> usize {
    10
}
fn default_replacement_limit() -> usize {
    3
}
fn default_pair_limit() -> usize {
    20
}
fn default_bus_factor_limit() -> usize {
    3
}
fn default_contribution_limit() -> usize {
    50
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            min_coverage: default_min_coverage(),
            high_risk_max_contributors: default_high_risk_max_contributors(),
            hero_skewness: default_hero_skewness(),
            hero_dominance_ratio: default_hero_dominance_ratio(),
            summary_top_n: default_summary_top_n(),
            jack_limit: default_role_limit(),
            maven_limit: default_role_limit(),
            connector_limit: default_role_limit(),
            replacement_limit: default_replacement_limit(),
            collaboration_limit: default_pair_limit(),
            critical_file_limit: default_pair_limit(),
            bus_factor_limit: default_bus_factor_limit(),
            contribution_limit: default_contribution_limit(),
        }
    }
}
