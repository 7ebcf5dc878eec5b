//! In-memory contribution graph backed by petgraph::DiGraph.
//!
//! Nodes are repositories, developers, files and commits. Edges point from
//! the dependent entity to the one it refers to:
//!
//! - `BELONGS_TO`: developer / file / commit → repository
//! - `COMMITTED_BY`: commit → developer (exactly one per commit)
//! - `ADDED` / `MODIFIED` / `DELETED`: commit → file (one per pair)
//!
//! Every upsert resolves its natural key through `id_index` first, so a key
//! maps to exactly one node no matter how often it is written.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use crate::config::{
    normalized_handle, validate_repo_name, AuthorFact, ChangeType, CommitFact, RepositoryInfo,
};
use crate::error::{HyphaeError, Result};

/// Node data stored in the graph.
#[derive(Debug, Clone)]
pub enum NodeData {
    Repository {
        name: String,
        url: String,
        description: String,
    },
    Developer {
        handle: String,
        repository: String,
        name: String,
        email: String,
    },
    File {
        path: String,
        repository: String,
        filename: String,
    },
    Commit {
        hash: String,
        repository: String,
        timestamp: DateTime<Utc>,
        message: String,
    },
}

/// Edge data stored in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeData {
    BelongsTo,
    CommittedBy,
    Changed { change_type: ChangeType },
}

pub fn repository_id(name: &str) -> String {
    format!("repo:{name}")
}

/// Repository names never contain `:`, so the split point is unambiguous.
pub fn developer_id(repo: &str, handle: &str) -> String {
    format!("developer:{repo}:{handle}")
}

pub fn file_id(repo: &str, path: &str) -> String {
    format!("file:{repo}:{path}")
}

pub fn commit_id(hash: &str) -> String {
    format!("commit:{hash}")
}

/// Last `/`-separated segment of a path.
pub fn filename_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// A flat representation of a developer for queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeveloperInfo {
    pub handle: String,
    pub name: String,
    pub email: String,
}

/// A flat representation of a file for queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub filename: String,
}

/// Wrapper around petgraph::DiGraph with typed upserts and read queries.
#[derive(Debug)]
pub struct ContributionGraph {
    graph: DiGraph<NodeData, EdgeData>,
    /// O(1) natural key → NodeIndex lookup.
    id_index: HashMap<String, NodeIndex>,
}

impl ContributionGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
        }
    }

    /// Insert a node, or overwrite the mutable attributes of the existing one.
    ///
    /// Key fields are encoded in `id`, so replacing the weight never changes identity.
    fn upsert_node(&mut self, id: String, data: NodeData) -> NodeIndex {
        match self.id_index.entry(id) {
            Entry::Occupied(e) => {
                let idx = *e.get();
                self.graph[idx] = data;
                idx
            }
            Entry::Vacant(e) => {
                let idx = self.graph.add_node(data);
                e.insert(idx);
                idx
            }
        }
    }

    /// At most one edge exists per ordered node pair.
    fn upsert_edge(&mut self, from: NodeIndex, to: NodeIndex, data: EdgeData) {
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] = data,
            None => {
                self.graph.add_edge(from, to, data);
            }
        }
    }

    /// Get node index by ID, or None.
    pub fn get_node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    /// Get node data by ID.
    pub fn get_node_data(&self, id: &str) -> Option<&NodeData> {
        self.id_index
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    fn require(&self, id: &str, what: impl FnOnce() -> String) -> Result<NodeIndex> {
        self.get_node_index(id)
            .ok_or_else(|| HyphaeError::not_found(what()))
    }

    // --- Upserts ---

    pub fn upsert_repository(&mut self, info: &RepositoryInfo) -> Result<NodeIndex> {
        validate_repo_name(&info.name)?;
        Ok(self.upsert_node(
            repository_id(&info.name),
            NodeData::Repository {
                name: info.name.clone(),
                url: info.url.clone(),
                description: info.description.clone(),
            },
        ))
    }

    pub fn upsert_developer(&mut self, repo: &str, author: &AuthorFact) -> Result<NodeIndex> {
        let repo_idx = self.require(&repository_id(repo), || format!("repository '{repo}'"))?;
        let handle = author.normalized_handle();
        let dev_idx = self.upsert_node(
            developer_id(repo, handle),
            NodeData::Developer {
                handle: handle.to_string(),
                repository: repo.to_string(),
                name: author.name.clone(),
                email: author.email.clone(),
            },
        );
        self.upsert_edge(dev_idx, repo_idx, EdgeData::BelongsTo);
        Ok(dev_idx)
    }

    pub fn upsert_file(&mut self, repo: &str, path: &str) -> Result<NodeIndex> {
        let repo_idx = self.require(&repository_id(repo), || format!("repository '{repo}'"))?;
        let file_idx = self.upsert_node(
            file_id(repo, path),
            NodeData::File {
                path: path.to_string(),
                repository: repo.to_string(),
                filename: filename_of(path),
            },
        );
        self.upsert_edge(file_idx, repo_idx, EdgeData::BelongsTo);
        Ok(file_idx)
    }

    pub fn upsert_commit(
        &mut self,
        repo: &str,
        hash: &str,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<NodeIndex> {
        let repo_idx = self.require(&repository_id(repo), || format!("repository '{repo}'"))?;
        self.check_commit_repository(hash, repo)?;
        let commit_idx = self.upsert_node(
            commit_id(hash),
            NodeData::Commit {
                hash: hash.to_string(),
                repository: repo.to_string(),
                timestamp,
                message: message.to_string(),
            },
        );
        self.upsert_edge(commit_idx, repo_idx, EdgeData::BelongsTo);
        Ok(commit_idx)
    }

    /// Attach a commit to its author. The author cannot change once set.
    pub fn link_authorship(&mut self, hash: &str, repo: &str, handle: &str) -> Result<()> {
        let handle = normalized_handle(handle);
        let commit_idx = self.require(&commit_id(hash), || format!("commit '{hash}'"))?;
        self.check_commit_repository(hash, repo)?;
        let dev_idx = self.require(&developer_id(repo, handle), || {
            format!("developer '{handle}' in {repo}")
        })?;
        self.check_commit_author(hash, handle)?;
        self.upsert_edge(commit_idx, dev_idx, EdgeData::CommittedBy);
        Ok(())
    }

    /// Record that a commit changed a file; a later type for the same pair replaces the earlier one.
    pub fn link_change(
        &mut self,
        hash: &str,
        repo: &str,
        path: &str,
        change_type: ChangeType,
    ) -> Result<()> {
        let commit_idx = self.require(&commit_id(hash), || format!("commit '{hash}'"))?;
        self.check_commit_repository(hash, repo)?;
        let file_idx = self.require(&file_id(repo, path), || format!("file '{path}' in {repo}"))?;
        self.upsert_edge(commit_idx, file_idx, EdgeData::Changed { change_type });
        Ok(())
    }

    /// Upsert every entity and edge referenced by one commit fact.
    ///
    /// Conflicts are detected before the first write, so a rejected fact leaves
    /// the graph untouched. Returns the number of change edges in the fact.
    pub fn ingest_commit(&mut self, fact: &CommitFact) -> Result<usize> {
        fact.validate()?;
        let repo = fact.repository.name.as_str();
        let handle = fact.author.normalized_handle();
        self.check_commit_repository(&fact.hash, repo)?;
        self.check_commit_author(&fact.hash, handle)?;

        self.upsert_repository(&fact.repository)?;
        self.upsert_developer(repo, &fact.author)?;
        self.upsert_commit(repo, &fact.hash, fact.timestamp, &fact.message)?;
        self.link_authorship(&fact.hash, repo, handle)?;
        for change in &fact.changes {
            self.upsert_file(repo, &change.path)?;
            self.link_change(&fact.hash, repo, &change.path, change.change_type)?;
        }
        Ok(fact.changes.len())
    }

    fn check_commit_repository(&self, hash: &str, repo: &str) -> Result<()> {
        if let Some(NodeData::Commit { repository, .. }) = self.get_node_data(&commit_id(hash)) {
            if repository != repo {
                return Err(HyphaeError::invariant(format!(
                    "commit {hash} belongs to {repository}, not {repo}"
                )));
            }
        }
        Ok(())
    }

    fn check_commit_author(&self, hash: &str, handle: &str) -> Result<()> {
        let handle = normalized_handle(handle);
        if let Some(existing) = self.commit_author(hash) {
            if existing != handle {
                return Err(HyphaeError::invariant(format!(
                    "commit {hash} is authored by '{existing}', cannot reassign to '{handle}'"
                )));
            }
        }
        Ok(())
    }

    // --- Queries ---

    pub fn repository(&self, name: &str) -> Option<RepositoryInfo> {
        match self.get_node_data(&repository_id(name)) {
            Some(NodeData::Repository {
                name,
                url,
                description,
            }) => Some(RepositoryInfo {
                name: name.clone(),
                url: url.clone(),
                description: description.clone(),
            }),
            _ => None,
        }
    }

    pub fn has_repository(&self, name: &str) -> bool {
        self.has_node(&repository_id(name))
    }

    /// Node indices of every entity that belongs to a repository.
    pub fn repository_members(&self, name: &str) -> Vec<NodeIndex> {
        let Some(repo_idx) = self.get_node_index(&repository_id(name)) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(repo_idx, Direction::Incoming)
            .filter(|e| matches!(e.weight(), EdgeData::BelongsTo))
            .map(|e| e.source())
            .collect()
    }

    /// All developers of a repository, sorted by handle.
    pub fn developers(&self, repo: &str) -> Vec<DeveloperInfo> {
        let mut result: Vec<DeveloperInfo> = self
            .repository_members(repo)
            .into_iter()
            .filter_map(|idx| self.developer_info(idx))
            .collect();
        result.sort_by(|a, b| a.handle.cmp(&b.handle));
        result
    }

    pub fn developer(&self, repo: &str, handle: &str) -> Option<DeveloperInfo> {
        self.get_node_index(&developer_id(repo, handle))
            .and_then(|idx| self.developer_info(idx))
    }

    /// All files of a repository, sorted by path.
    pub fn files(&self, repo: &str) -> Vec<FileInfo> {
        let mut result: Vec<FileInfo> = self
            .repository_members(repo)
            .into_iter()
            .filter_map(|idx| match self.graph.node_weight(idx) {
                Some(NodeData::File { path, filename, .. }) => Some(FileInfo {
                    path: path.clone(),
                    filename: filename.clone(),
                }),
                _ => None,
            })
            .collect();
        result.sort_by(|a, b| a.path.cmp(&b.path));
        result
    }

    pub fn commit_count(&self, repo: &str) -> usize {
        self.repository_members(repo)
            .into_iter()
            .filter(|&idx| matches!(self.graph.node_weight(idx), Some(NodeData::Commit { .. })))
            .count()
    }

    /// Files reachable from a developer's authored commits, or None if the developer is unknown.
    pub fn reachable_files(&self, repo: &str, handle: &str) -> Option<BTreeSet<String>> {
        let dev_idx = self.get_node_index(&developer_id(repo, handle))?;
        Some(
            self.reachable_file_indices(dev_idx)
                .into_iter()
                .filter_map(|idx| self.file_path(idx))
                .collect(),
        )
    }

    /// Developer → COMMITTED_BY⁻¹ → commit → change → file, one hop each way.
    pub fn reachable_file_indices(&self, dev_idx: NodeIndex) -> BTreeSet<NodeIndex> {
        self.authored_commits(dev_idx)
            .into_iter()
            .flat_map(|commit_idx| self.changed_files(commit_idx))
            .map(|(file_idx, _)| file_idx)
            .collect()
    }

    pub fn authored_commits(&self, dev_idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(dev_idx, Direction::Incoming)
            .filter(|e| matches!(e.weight(), EdgeData::CommittedBy))
            .map(|e| e.source())
            .collect()
    }

    pub fn changed_files(&self, commit_idx: NodeIndex) -> Vec<(NodeIndex, ChangeType)> {
        self.graph
            .edges_directed(commit_idx, Direction::Outgoing)
            .filter_map(|e| match e.weight() {
                EdgeData::Changed { change_type } => Some((e.target(), *change_type)),
                _ => None,
            })
            .collect()
    }

    /// Change edges of a commit as (path, type), sorted by path.
    pub fn commit_changes(&self, hash: &str) -> Vec<(String, ChangeType)> {
        let Some(commit_idx) = self.get_node_index(&commit_id(hash)) else {
            return Vec::new();
        };
        let mut result: Vec<(String, ChangeType)> = self
            .changed_files(commit_idx)
            .into_iter()
            .filter_map(|(idx, ct)| self.file_path(idx).map(|p| (p, ct)))
            .collect();
        result.sort();
        result
    }

    pub fn commit_author(&self, hash: &str) -> Option<String> {
        let commit_idx = self.get_node_index(&commit_id(hash))?;
        self.commit_author_index(commit_idx)
            .and_then(|dev_idx| match self.graph.node_weight(dev_idx) {
                Some(NodeData::Developer { handle, .. }) => Some(handle.clone()),
                _ => None,
            })
    }

    pub fn commit_author_index(&self, commit_idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(commit_idx, Direction::Outgoing)
            .find(|e| matches!(e.weight(), EdgeData::CommittedBy))
            .map(|e| e.target())
    }

    /// Files both developers reach through their authored commits.
    pub fn shared_files(&self, repo: &str, a: &str, b: &str) -> BTreeSet<String> {
        match (self.reachable_files(repo, a), self.reachable_files(repo, b)) {
            (Some(fa), Some(fb)) => fa.intersection(&fb).cloned().collect(),
            _ => BTreeSet::new(),
        }
    }

    fn developer_info(&self, idx: NodeIndex) -> Option<DeveloperInfo> {
        match self.graph.node_weight(idx) {
            Some(NodeData::Developer {
                handle,
                name,
                email,
                ..
            }) => Some(DeveloperInfo {
                handle: handle.clone(),
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }

    fn file_path(&self, idx: NodeIndex) -> Option<String> {
        match self.graph.node_weight(idx) {
            Some(NodeData::File { path, .. }) => Some(path.clone()),
            _ => None,
        }
    }

    // --- Counts ---

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Access the underlying petgraph for algorithms that need it.
    pub fn inner_graph(&self) -> &DiGraph<NodeData, EdgeData> {
        &self.graph
    }
}

impl Default for ContributionGraph {
    fn default() -> Self {
        Self::new()
    }
}
