//! Query facade over a [`ContributionStore`].
//!
//! Each query validates the repository name, projects the repository under a
//! short read lock, then computes on the projection with the lock released.
//! A repository that does not exist yet yields empty lists (and the unknown
//! distribution sentinel); only operations that must name a specific entity
//! report `NotFound`.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::analytics::{collaboration, contributions, distribution, replacement, roles};
use crate::config::{validate_repo_name, AnalyticsConfig, CommitFact};
use crate::error::{HyphaeError, Result};
use crate::graph::projection::RepoProjection;
use crate::ingest::read_commit_facts;
use crate::output::{
    BusFactorOverview, Collaboration, Connector, CriticalFile, DeveloperContribution, Jack,
    KnowledgeDistribution, Maven, Replacement, RepositorySummary,
};
use crate::store::{ContributionStore, IngestStats};

pub struct Engine {
    store: Arc<ContributionStore>,
    config: AnalyticsConfig,
}

impl Engine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_store(Arc::new(ContributionStore::new()), config)
    }

    /// Share an existing store, e.g. with a concurrent ingestion thread.
    pub fn with_store(store: Arc<ContributionStore>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<ContributionStore> {
        &self.store
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn ingest(&self, facts: &[CommitFact]) -> Result<IngestStats> {
        self.store.ingest(facts)
    }

    /// Read commit facts from a file or directory and ingest them.
    pub fn ingest_path(&self, path: &Path) -> Result<IngestStats> {
        let facts = read_commit_facts(path)?;
        self.store.ingest(&facts)
    }

    /// Project one repository, or None if it has not been ingested.
    pub fn projection(&self, repo: &str) -> Result<Option<RepoProjection>> {
        validate_repo_name(repo)?;
        let snapshot = self.store.snapshot()?;
        Ok(RepoProjection::build(&snapshot, repo))
    }

    /// Run `query` on the repository's projection, or return `empty` if it is absent.
    fn with_projection<T>(
        &self,
        name: &str,
        repo: &str,
        empty: impl FnOnce() -> T,
        query: impl FnOnce(&RepoProjection) -> T,
    ) -> Result<T> {
        let start = Instant::now();
        let result = match self.projection(repo)? {
            Some(p) => query(&p),
            None => {
                log::debug!("{name}: repository {repo} not found, returning empty result");
                empty()
            }
        };
        log::debug!(
            "{name} on {repo} took {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(result)
    }

    pub fn jacks(&self, repo: &str, min_coverage: f64, limit: usize) -> Result<Vec<Jack>> {
        if !(0.0..=1.0).contains(&min_coverage) {
            return Err(HyphaeError::invalid(format!(
                "min_coverage must be within [0, 1], got {min_coverage}"
            )));
        }
        self.with_projection("jacks", repo, Vec::new, |p| {
            roles::jacks(p, min_coverage, limit)
        })
    }

    pub fn mavens(&self, repo: &str, limit: usize) -> Result<Vec<Maven>> {
        self.with_projection("mavens", repo, Vec::new, |p| roles::mavens(p, limit))
    }

    pub fn connectors(&self, repo: &str, limit: usize) -> Result<Vec<Connector>> {
        self.with_projection("connectors", repo, Vec::new, |p| {
            roles::connectors(p, limit)
        })
    }

    pub fn knowledge_distribution(&self, repo: &str) -> Result<KnowledgeDistribution> {
        self.with_projection(
            "knowledge_distribution",
            repo,
            || KnowledgeDistribution::unknown(0, 0),
            |p| distribution::knowledge_distribution(p, &self.config),
        )
    }

    pub fn bus_factor_overview(&self, repo: &str, limit: usize) -> Result<BusFactorOverview> {
        let max_contributors = self.config.high_risk_max_contributors;
        self.with_projection(
            "bus_factor_overview",
            repo,
            BusFactorOverview::empty,
            |p| distribution::bus_factor_overview(p, max_contributors, limit),
        )
    }

    /// Replacement candidates for `leaving`. The developer must exist in the repository.
    pub fn replacements(&self, repo: &str, leaving: &str, limit: usize) -> Result<Vec<Replacement>> {
        let start = Instant::now();
        let Some(p) = self.projection(repo)? else {
            return Err(HyphaeError::not_found(format!("repository '{repo}'")));
        };
        let result = replacement::replacements(&p, leaving, limit)?;
        log::debug!(
            "replacements for {leaving} on {repo}: {} candidates in {:.2}ms",
            result.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(result)
    }

    pub fn collaborations(&self, repo: &str, limit: usize) -> Result<Vec<Collaboration>> {
        self.with_projection("collaborations", repo, Vec::new, |p| {
            collaboration::collaborations(p, limit)
        })
    }

    pub fn critical_files(&self, repo: &str, limit: usize) -> Result<Vec<CriticalFile>> {
        self.with_projection("critical_files", repo, Vec::new, |p| {
            collaboration::critical_files(p, limit)
        })
    }

    pub fn developer_contributions(
        &self,
        repo: &str,
        limit: usize,
    ) -> Result<Vec<DeveloperContribution>> {
        self.with_projection("developer_contributions", repo, Vec::new, |p| {
            contributions::developer_contributions(p, limit)
        })
    }

    pub fn repository_summary(&self, repo: &str) -> Result<RepositorySummary> {
        let Some(p) = self.projection(repo)? else {
            return Err(HyphaeError::not_found(format!("repository '{repo}'")));
        };
        Ok(contributions::repository_summary(&p, &self.config))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}
