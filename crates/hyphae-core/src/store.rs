//! Shared, lock-guarded contribution graph.
//!
//! Writers take the write lock once per commit fact, so a reader sees either
//! none or all of a commit's entities and edges. Readers hold the read lock
//! only for as long as it takes to build a projection.

use std::ops::Deref;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{AuthorFact, ChangeType, CommitFact, RepositoryInfo};
use crate::error::{HyphaeError, Result};
use crate::graph::contribution_graph::ContributionGraph;

/// Counts from one ingested batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub commits: usize,
    pub changes: usize,
}

/// Read view over the graph. Holds the read lock until dropped.
pub struct Snapshot<'a> {
    guard: RwLockReadGuard<'a, ContributionGraph>,
}

impl Deref for Snapshot<'_> {
    type Target = ContributionGraph;

    fn deref(&self) -> &ContributionGraph {
        &self.guard
    }
}

#[derive(Debug, Default)]
pub struct ContributionStore {
    graph: RwLock<ContributionGraph>,
}

impl ContributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Result<Snapshot<'_>> {
        let guard = self
            .graph
            .read()
            .map_err(|_| HyphaeError::StorageUnavailable("graph lock poisoned".to_string()))?;
        Ok(Snapshot { guard })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ContributionGraph>> {
        self.graph
            .write()
            .map_err(|_| HyphaeError::StorageUnavailable("graph lock poisoned".to_string()))
    }

    pub fn upsert_repository(&self, info: &RepositoryInfo) -> Result<()> {
        self.write()?.upsert_repository(info).map(|_| ())
    }

    pub fn upsert_developer(&self, repo: &str, author: &AuthorFact) -> Result<()> {
        self.write()?.upsert_developer(repo, author).map(|_| ())
    }

    pub fn upsert_file(&self, repo: &str, path: &str) -> Result<()> {
        self.write()?.upsert_file(repo, path).map(|_| ())
    }

    pub fn upsert_commit(
        &self,
        repo: &str,
        hash: &str,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<()> {
        self.write()?
            .upsert_commit(repo, hash, timestamp, message)
            .map(|_| ())
    }

    pub fn link_authorship(&self, hash: &str, repo: &str, handle: &str) -> Result<()> {
        self.write()?.link_authorship(hash, repo, handle)
    }

    pub fn link_change(
        &self,
        hash: &str,
        repo: &str,
        path: &str,
        change_type: ChangeType,
    ) -> Result<()> {
        self.write()?.link_change(hash, repo, path, change_type)
    }

    /// Ingest a batch of commit facts in order.
    ///
    /// Stops at the first rejected fact; commits before it stay ingested.
    pub fn ingest(&self, facts: &[CommitFact]) -> Result<IngestStats> {
        if facts.is_empty() {
            log::warn!("ingest called with an empty batch");
            return Ok(IngestStats::default());
        }
        let start = Instant::now();
        let mut stats = IngestStats::default();
        for fact in facts {
            let changes = self.write()?.ingest_commit(fact)?;
            log::debug!(
                "ingested commit {} ({} changes) into {}",
                fact.hash,
                changes,
                fact.repository.name
            );
            stats.commits += 1;
            stats.changes += changes;
        }
        log::info!(
            "ingested {} commits, {} changes in {:.1}ms",
            stats.commits,
            stats.changes,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileChange;

    fn fact(hash: &str, handle: &str, paths: &[&str]) -> CommitFact {
        CommitFact {
            hash: hash.to_string(),
            timestamp: "2024-03-01T12:00:00Z".parse().unwrap(),
            message: format!("change {hash}"),
            author: AuthorFact {
                handle: handle.to_string(),
                name: String::new(),
                email: String::new(),
            },
            changes: paths
                .iter()
                .map(|p| FileChange {
                    path: p.to_string(),
                    change_type: ChangeType::Added,
                })
                .collect(),
            repository: RepositoryInfo {
                name: "acme/widgets".to_string(),
                url: "https://example.com/acme/widgets".to_string(),
                description: String::new(),
            },
        }
    }

    #[test]
    fn ingest_counts_commits_and_changes() {
        let store = ContributionStore::new();
        let stats = store
            .ingest(&[fact("c1", "alice", &["a", "b"]), fact("c2", "bob", &["b"])])
            .unwrap();
        assert_eq!(stats, IngestStats { commits: 2, changes: 3 });
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.commit_count("acme/widgets"), 2);
        assert_eq!(snap.files("acme/widgets").len(), 2);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let store = ContributionStore::new();
        assert_eq!(store.ingest(&[]).unwrap(), IngestStats::default());
        assert_eq!(store.snapshot().unwrap().node_count(), 0);
    }

    #[test]
    fn granular_upserts_require_repository() {
        let store = ContributionStore::new();
        let err = store.upsert_file("acme/widgets", "a.py").unwrap_err();
        assert_eq!(err.kind(), "not_found");

        let repo = fact("c1", "alice", &[]).repository;
        store.upsert_repository(&repo).unwrap();
        store.upsert_file("acme/widgets", "a.py").unwrap();
        store
            .upsert_commit("acme/widgets", "c1", "2024-03-01T12:00:00Z".parse().unwrap(), "init")
            .unwrap();
        store
            .upsert_developer("acme/widgets", &fact("c1", "alice", &[]).author)
            .unwrap();
        store.link_authorship("c1", "acme/widgets", "alice").unwrap();
        store
            .link_change("c1", "acme/widgets", "a.py", ChangeType::Added)
            .unwrap();
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.commit_author("c1").as_deref(), Some("alice"));
    }

    #[test]
    fn granular_link_accepts_blank_handle() {
        let store = ContributionStore::new();
        let anonymous = fact("c1", "", &["a.py"]);
        store.upsert_repository(&anonymous.repository).unwrap();
        store
            .upsert_developer("acme/widgets", &anonymous.author)
            .unwrap();
        store
            .upsert_commit("acme/widgets", "c1", anonymous.timestamp, "init")
            .unwrap();
        store.link_authorship("c1", "acme/widgets", "").unwrap();
        // Relinking under either spelling is the same author.
        store.link_authorship("c1", "acme/widgets", "unknown").unwrap();
        store.link_authorship("c1", "acme/widgets", "  ").unwrap();

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.commit_author("c1").as_deref(), Some("unknown"));
        assert_eq!(snap.developers("acme/widgets").len(), 1);
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let store = ContributionStore::new();
        std::thread::scope(|s| {
            for worker in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..25 {
                        let hash = format!("w{worker}-{i}");
                        // Every writer touches the same shared file.
                        store
                            .ingest(&[fact(&hash, &format!("dev{worker}"), &["shared.rs"])])
                            .unwrap();
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..25 {
                    let snap = store.snapshot().unwrap();
                    assert!(snap.files("acme/widgets").len() <= 1);
                }
            });
        });

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.commit_count("acme/widgets"), 100);
        assert_eq!(snap.files("acme/widgets").len(), 1);
        assert_eq!(snap.developers("acme/widgets").len(), 4);
    }
}
