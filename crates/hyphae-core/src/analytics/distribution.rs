//! Knowledge distribution statistics and bus-factor risk rankings.

use std::collections::BTreeMap;

use crate::config::AnalyticsConfig;
use crate::graph::projection::{pick_dominant, ContributorStat, RepoProjection};
use crate::output::{
    BusFactorOverview, DistributionType, HighRiskFile, KnowledgeDistribution, ModuleRisk,
};

/// Relative spread below which coverage values count as identical.
const FLAT_TOLERANCE: f64 = 1e-12;

/// Summary statistics of a set of coverage values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageStats {
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Mean cubed z-score; 0 when the values are flat.
    pub skewness: f64,
}

pub fn coverage_stats(values: &[f64]) -> CoverageStats {
    if values.is_empty() {
        return CoverageStats {
            max: 0.0,
            mean: 0.0,
            std_dev: 0.0,
            skewness: 0.0,
        };
    }
    let n = values.len() as f64;
    let max = values.iter().copied().fold(0.0, f64::max);
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let mut std_dev = variance.sqrt();

    // Summation rounding leaves a tiny non-zero deviation for equal values,
    // which would blow up the z-scores.
    if std_dev <= FLAT_TOLERANCE * mean.abs().max(1.0) {
        std_dev = 0.0;
    }
    let skewness = if std_dev == 0.0 {
        0.0
    } else {
        values
            .iter()
            .map(|x| ((x - mean) / std_dev).powi(3))
            .sum::<f64>()
            / n
    };

    CoverageStats {
        max,
        mean,
        std_dev,
        skewness,
    }
}

/// Classify the team as hero-driven or balanced from coverage statistics.
pub fn classify(stats: &CoverageStats, config: &AnalyticsConfig) -> DistributionType {
    if stats.skewness > config.hero_skewness || stats.max > config.hero_dominance_ratio * stats.mean
    {
        DistributionType::Hero
    } else {
        DistributionType::Balanced
    }
}

pub fn knowledge_distribution(p: &RepoProjection, config: &AnalyticsConfig) -> KnowledgeDistribution {
    let developer_count = p.developers.len();
    let total_files = p.total_files();
    if developer_count == 0 || total_files == 0 {
        return KnowledgeDistribution::unknown(developer_count, total_files);
    }

    let coverages: Vec<f64> = (0..developer_count).map(|i| p.coverage(i)).collect();
    let stats = coverage_stats(&coverages);

    // Developers are in handle order, so the first at the maximum is the lowest handle.
    let top = coverages
        .iter()
        .position(|&c| c == stats.max)
        .unwrap_or(0);

    KnowledgeDistribution {
        top_contributor: p.developers[top].handle.clone(),
        top_coverage: stats.max,
        average_coverage: stats.mean,
        coverage_std_dev: stats.std_dev,
        skewness: stats.skewness,
        developer_count,
        total_files,
        distribution_type: classify(&stats, config),
    }
}

/// First path segment of a nested file; root-level files have no module.
pub fn module_of(path: &str) -> Option<&str> {
    path.split_once('/').map(|(module, _)| module)
}

/// Per-file and per-module bus factors, riskiest first.
///
/// `max_contributors` is the inclusive threshold for a file to count as high risk.
pub fn bus_factor_overview(p: &RepoProjection, max_contributors: usize, limit: usize) -> BusFactorOverview {
    let total_files = p.total_files();
    let overall_bus_factor = if total_files == 0 {
        0.0
    } else {
        p.files
            .iter()
            .map(|f| f.contributor_count() as f64)
            .sum::<f64>()
            / total_files as f64
    };

    let owner_handle = |dev: Option<usize>| dev.map(|d| p.developers[d].handle.clone());

    let mut high_risk_files: Vec<HighRiskFile> = p
        .files
        .iter()
        .enumerate()
        .filter(|(_, f)| f.contributor_count() <= max_contributors)
        .map(|(i, f)| HighRiskFile {
            path: f.path.clone(),
            filename: f.filename.clone(),
            owner: owner_handle(p.dominant_contributor(i)),
            contributor_count: f.contributor_count(),
        })
        .collect();
    high_risk_files.sort_by(|a, b| {
        a.contributor_count
            .cmp(&b.contributor_count)
            .then_with(|| a.path.cmp(&b.path))
    });
    high_risk_files.truncate(limit);

    let mut modules: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, f) in p.files.iter().enumerate() {
        if let Some(module) = module_of(&f.path) {
            modules.entry(module).or_default().push(i);
        }
    }

    let mut module_risks: Vec<ModuleRisk> = modules
        .into_iter()
        .map(|(module, files)| {
            let bus_factor = files
                .iter()
                .map(|&i| p.files[i].contributor_count() as f64)
                .sum::<f64>()
                / files.len() as f64;

            // Aggregate commits per developer across the module's files.
            let mut aggregate: BTreeMap<usize, ContributorStat> = BTreeMap::new();
            for &i in &files {
                for (&dev, stat) in &p.files[i].contributors {
                    aggregate
                        .entry(dev)
                        .and_modify(|agg| {
                            agg.commits += stat.commits;
                            agg.first_seen = agg.first_seen.min(stat.first_seen);
                        })
                        .or_insert(*stat);
                }
            }

            ModuleRisk {
                module: module.to_string(),
                file_count: files.len(),
                bus_factor,
                owner: owner_handle(pick_dominant(aggregate.into_iter())),
            }
        })
        .collect();
    module_risks.sort_by(|a, b| {
        a.bus_factor
            .total_cmp(&b.bus_factor)
            .then_with(|| a.module.cmp(&b.module))
    });
    module_risks.truncate(limit);

    BusFactorOverview {
        overall_bus_factor,
        total_files,
        high_risk_files,
        module_risks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::projection;

    #[test]
    fn flat_values_have_zero_skew() {
        let stats = coverage_stats(&[0.1, 0.1, 0.1]);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.skewness, 0.0);
    }

    #[test]
    fn skewness_of_single_outlier() {
        // One value far above the rest gives a strongly right-skewed set.
        let stats = coverage_stats(&[0.1, 0.1, 0.1, 0.9]);
        assert!(stats.skewness > 1.0);
        assert_eq!(stats.max, 0.9);
        assert!((stats.mean - 0.3).abs() < 1e-12);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = coverage_stats(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.skewness, 0.0);
    }

    #[test]
    fn identical_coverage_is_balanced() {
        let p = projection(&[
            ("c1", "alice", "a b"),
            ("c2", "bob", "c d"),
            ("c3", "carol", "e f"),
        ]);
        let kd = knowledge_distribution(&p, &AnalyticsConfig::default());
        assert_eq!(kd.skewness, 0.0);
        assert_eq!(kd.coverage_std_dev, 0.0);
        assert_eq!(kd.distribution_type, DistributionType::Balanced);
        assert_eq!(kd.top_contributor, "alice");
        assert_eq!(kd.developer_count, 3);
    }

    #[test]
    fn dominant_developer_is_hero() {
        let p = projection(&[
            ("c1", "alice", "a b c d e f g h"),
            ("c2", "bob", "i"),
            ("c3", "carol", "j"),
            ("c4", "dave", "a"),
        ]);
        let kd = knowledge_distribution(&p, &AnalyticsConfig::default());
        assert_eq!(kd.top_contributor, "alice");
        assert_eq!(kd.top_coverage, 0.8);
        assert_eq!(kd.distribution_type, DistributionType::Hero);
    }

    #[test]
    fn module_of_top_segment() {
        assert_eq!(module_of("src/core/a.rs"), Some("src"));
        assert_eq!(module_of("README.md"), None);
    }

    #[test]
    fn bus_factor_ranks_risky_files_and_modules() {
        let p = projection(&[
            ("c1", "alice", "api/a.py api/b.py lib/c.py"),
            ("c2", "bob", "api/a.py lib/c.py"),
            ("c3", "carol", "lib/c.py"),
            ("c4", "bob", "api/a.py"),
            ("c5", "dave", "README.md"),
        ]);
        let overview = bus_factor_overview(&p, 2, 10);
        // a: 2, b: 1, c: 3, README: 1
        assert_eq!(overview.total_files, 4);
        assert!((overview.overall_bus_factor - 1.75).abs() < 1e-12);

        let risky: Vec<_> = overview
            .high_risk_files
            .iter()
            .map(|f| (f.path.as_str(), f.contributor_count, f.owner.as_deref()))
            .collect();
        assert_eq!(
            risky,
            vec![
                ("README.md", 1, Some("dave")),
                ("api/b.py", 1, Some("alice")),
                ("api/a.py", 2, Some("bob")),
            ]
        );

        let modules: Vec<_> = overview
            .module_risks
            .iter()
            .map(|m| (m.module.as_str(), m.file_count, m.owner.as_deref()))
            .collect();
        // api averages 1.5, lib 3.0; root-level README belongs to no module.
        assert_eq!(modules, vec![("api", 2, Some("alice")), ("lib", 1, Some("alice"))]);
        assert_eq!(overview.module_risks[0].bus_factor, 1.5);
    }

    #[test]
    fn bus_factor_limit_caps_both_lists() {
        let p = projection(&[("c1", "alice", "x/a y/b z/c")]);
        let overview = bus_factor_overview(&p, 2, 1);
        assert_eq!(overview.high_risk_files.len(), 1);
        assert_eq!(overview.module_risks.len(), 1);
        assert_eq!(overview.module_risks[0].module, "x");
    }
}
