//! Per-developer contribution table and repository headline summary.

use crate::analytics::distribution::knowledge_distribution;
use crate::analytics::roles::{connectors, jacks, mavens};
use crate::config::AnalyticsConfig;
use crate::graph::projection::RepoProjection;
use crate::output::{DeveloperContribution, RepositorySummary};

pub fn developer_contributions(p: &RepoProjection, limit: usize) -> Vec<DeveloperContribution> {
    let total_files = p.total_files();
    let mut result: Vec<DeveloperContribution> = p
        .developers
        .iter()
        .enumerate()
        .map(|(i, dev)| DeveloperContribution {
            handle: dev.handle.clone(),
            name: dev.name.clone(),
            email: dev.email.clone(),
            commits: dev.commits,
            files_touched: dev.files.len(),
            total_files,
            coverage: p.coverage(i),
        })
        .collect();
    result.sort_by(|a, b| {
        b.coverage
            .total_cmp(&a.coverage)
            .then_with(|| b.commits.cmp(&a.commits))
            .then_with(|| a.handle.cmp(&b.handle))
    });
    result.truncate(limit);
    result
}

/// Headline counts plus the top few of each role.
pub fn repository_summary(p: &RepoProjection, config: &AnalyticsConfig) -> RepositorySummary {
    let distribution = knowledge_distribution(p, config);
    let top_n = config.summary_top_n;
    RepositorySummary {
        repository: p.repository.name.clone(),
        url: p.repository.url.clone(),
        description: p.repository.description.clone(),
        developer_count: p.developers.len(),
        commit_count: p.commit_count,
        file_count: p.total_files(),
        distribution_type: distribution.distribution_type,
        top_contributor: distribution.top_contributor,
        top_jacks: jacks(p, config.min_coverage, top_n),
        top_mavens: mavens(p, top_n),
        top_connectors: connectors(p, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::projection;
    use crate::output::DistributionType;

    #[test]
    fn contributions_order_by_coverage_then_commits() {
        let p = projection(&[
            ("c1", "alice", "a b"),
            ("c2", "bob", "c d"),
            ("c3", "bob", "c"),
            ("c4", "carol", "e"),
        ]);
        let rows = developer_contributions(&p, 10);
        let ranked: Vec<_> = rows
            .iter()
            .map(|r| (r.handle.as_str(), r.commits, r.files_touched))
            .collect();
        assert_eq!(ranked, vec![("bob", 2, 2), ("alice", 1, 2), ("carol", 1, 1)]);
        assert_eq!(rows[0].coverage, 0.4);
        assert_eq!(rows[0].total_files, 5);
        assert_eq!(rows[0].email, "bob@example.com");
    }

    #[test]
    fn summary_counts_and_caps_roles() {
        let p = projection(&[
            ("c1", "alice", "a b c d"),
            ("c2", "bob", "e"),
            ("c3", "carol", "f"),
            ("c4", "dave", "g"),
            ("c5", "erin", "h"),
        ]);
        let config = AnalyticsConfig {
            summary_top_n: 2,
            min_coverage: 0.0,
            ..AnalyticsConfig::default()
        };
        let summary = repository_summary(&p, &config);
        assert_eq!(summary.repository, "acme/widgets");
        assert_eq!(summary.developer_count, 5);
        assert_eq!(summary.commit_count, 5);
        assert_eq!(summary.file_count, 8);
        assert_eq!(summary.top_contributor, "alice");
        assert_eq!(summary.top_jacks.len(), 2);
        assert_eq!(summary.top_mavens.len(), 2);
        assert_eq!(summary.top_connectors.len(), 2);
        assert_eq!(summary.top_mavens[0].handle, "alice");
        assert_eq!(summary.distribution_type, DistributionType::Hero);
    }
}
