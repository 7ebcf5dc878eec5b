//! Dense, read-only projection of one repository's subgraph.
//!
//! Built in a single pass per query: every developer, file and commit that
//! belongs to the repository is visited once, and the analytics work off the
//! resulting tables instead of walking the graph per developer.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use petgraph::graph::NodeIndex;

use crate::config::RepositoryInfo;
use crate::graph::contribution_graph::{ContributionGraph, NodeData};

/// A developer and the files reachable from their authored commits.
#[derive(Debug, Clone)]
pub struct DeveloperEntry {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub commits: usize,
    /// Indices into [`RepoProjection::files`].
    pub files: BTreeSet<usize>,
}

/// One developer's history on one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributorStat {
    pub commits: usize,
    pub first_seen: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: String,
    pub filename: String,
    /// Developer index → their commits to this file.
    pub contributors: BTreeMap<usize, ContributorStat>,
}

impl FileEntry {
    /// Number of distinct historical committers (the file's bus factor).
    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }
}

/// Developer and file tables for one repository, both sorted by natural key.
#[derive(Debug, Clone)]
pub struct RepoProjection {
    pub repository: RepositoryInfo,
    pub developers: Vec<DeveloperEntry>,
    pub files: Vec<FileEntry>,
    pub commit_count: usize,
    handle_index: HashMap<String, usize>,
}

impl RepoProjection {
    /// Project a repository, or None if it does not exist.
    pub fn build(cg: &ContributionGraph, repo: &str) -> Option<Self> {
        let repository = cg.repository(repo)?;
        let graph = cg.inner_graph();

        let mut dev_nodes: Vec<(NodeIndex, &str)> = Vec::new();
        let mut file_nodes: Vec<(NodeIndex, &str)> = Vec::new();
        let mut commit_nodes: Vec<NodeIndex> = Vec::new();
        for idx in cg.repository_members(repo) {
            match &graph[idx] {
                NodeData::Developer { handle, .. } => dev_nodes.push((idx, handle.as_str())),
                NodeData::File { path, .. } => file_nodes.push((idx, path.as_str())),
                NodeData::Commit { .. } => commit_nodes.push(idx),
                NodeData::Repository { .. } => {}
            }
        }
        dev_nodes.sort_by(|a, b| a.1.cmp(b.1));
        file_nodes.sort_by(|a, b| a.1.cmp(b.1));

        let mut dev_dense: HashMap<NodeIndex, usize> = HashMap::new();
        let mut developers = Vec::with_capacity(dev_nodes.len());
        for (i, (idx, _)) in dev_nodes.iter().enumerate() {
            if let NodeData::Developer {
                handle,
                name,
                email,
                ..
            } = &graph[*idx]
            {
                dev_dense.insert(*idx, i);
                developers.push(DeveloperEntry {
                    handle: handle.clone(),
                    name: name.clone(),
                    email: email.clone(),
                    commits: 0,
                    files: BTreeSet::new(),
                });
            }
        }

        let mut file_dense: HashMap<NodeIndex, usize> = HashMap::new();
        let mut files = Vec::with_capacity(file_nodes.len());
        for (i, (idx, _)) in file_nodes.iter().enumerate() {
            if let NodeData::File { path, filename, .. } = &graph[*idx] {
                file_dense.insert(*idx, i);
                files.push(FileEntry {
                    path: path.clone(),
                    filename: filename.clone(),
                    contributors: BTreeMap::new(),
                });
            }
        }

        for &commit_idx in &commit_nodes {
            let NodeData::Commit { timestamp, .. } = &graph[commit_idx] else {
                continue;
            };
            // A commit seen mid-ingestion may not have its author yet; skip it
            // rather than guess.
            let Some(dev) = cg
                .commit_author_index(commit_idx)
                .and_then(|d| dev_dense.get(&d).copied())
            else {
                continue;
            };
            developers[dev].commits += 1;
            for (file_idx, _) in cg.changed_files(commit_idx) {
                let Some(&file) = file_dense.get(&file_idx) else {
                    continue;
                };
                developers[dev].files.insert(file);
                files[file]
                    .contributors
                    .entry(dev)
                    .and_modify(|stat| {
                        stat.commits += 1;
                        if *timestamp < stat.first_seen {
                            stat.first_seen = *timestamp;
                        }
                    })
                    .or_insert(ContributorStat {
                        commits: 1,
                        first_seen: *timestamp,
                    });
            }
        }

        let handle_index = developers
            .iter()
            .enumerate()
            .map(|(i, d)| (d.handle.clone(), i))
            .collect();

        Some(Self {
            repository,
            developers,
            files,
            commit_count: commit_nodes.len(),
            handle_index,
        })
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn developer_index(&self, handle: &str) -> Option<usize> {
        self.handle_index.get(handle).copied()
    }

    /// Fraction of the repository's files reachable by a developer; 0 when there are no files.
    pub fn coverage(&self, dev: usize) -> f64 {
        ratio(self.developers[dev].files.len(), self.total_files())
    }

    /// Contributor with the most commits to a file; ties go to whoever touched it first.
    pub fn dominant_contributor(&self, file: usize) -> Option<usize> {
        pick_dominant(self.files[file].contributors.iter().map(|(d, s)| (*d, *s)))
    }

    /// Other developers sharing at least one file with `dev`, with the shared-file count.
    pub fn peers(&self, dev: usize) -> BTreeMap<usize, usize> {
        let mut peers: BTreeMap<usize, usize> = BTreeMap::new();
        for &file in &self.developers[dev].files {
            for &other in self.files[file].contributors.keys() {
                if other != dev {
                    *peers.entry(other).or_insert(0) += 1;
                }
            }
        }
        peers
    }
}

/// Highest commit count, then earliest first contribution, then lowest developer index.
///
/// Developer indices follow handle order, so the last tie-break is by handle.
pub fn pick_dominant(stats: impl Iterator<Item = (usize, ContributorStat)>) -> Option<usize> {
    stats
        .min_by(|(da, a), (db, b)| {
            b.commits
                .cmp(&a.commits)
                .then(a.first_seen.cmp(&b.first_seen))
                .then(da.cmp(db))
        })
        .map(|(dev, _)| dev)
}

/// `num / den` as f64, 0 when the denominator is zero.
pub fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
