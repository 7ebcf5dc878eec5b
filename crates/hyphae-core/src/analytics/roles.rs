//! Role classification: Jacks, Mavens and Connectors.

use rayon::prelude::*;

use crate::analytics::by_score_then_handle;
use crate::graph::projection::{ratio, RepoProjection};
use crate::output::{Connector, Jack, Maven};

/// Developers whose coverage is at least `min_coverage`, broadest first.
pub fn jacks(p: &RepoProjection, min_coverage: f64, limit: usize) -> Vec<Jack> {
    let total_files = p.total_files();
    let mut result: Vec<Jack> = p
        .developers
        .iter()
        .enumerate()
        .map(|(i, dev)| Jack {
            handle: dev.handle.clone(),
            name: dev.name.clone(),
            email: dev.email.clone(),
            files_reached: dev.files.len(),
            total_files,
            coverage: p.coverage(i),
        })
        .filter(|j| j.coverage >= min_coverage)
        .collect();
    result.sort_by(|a, b| by_score_then_handle(a.coverage, &a.handle, b.coverage, &b.handle));
    result.truncate(limit);
    result
}

/// Developers who are the only historical contributor to at least one file.
///
/// Each sole-owned file is credited to exactly one developer, so the
/// returned `rare_files_count` values never sum past `total_files`.
pub fn mavens(p: &RepoProjection, limit: usize) -> Vec<Maven> {
    let total_files = p.total_files();
    let mut rare = vec![0usize; p.developers.len()];
    for file in &p.files {
        if file.contributor_count() == 1 {
            if let Some(&owner) = file.contributors.keys().next() {
                rare[owner] += 1;
            }
        }
    }

    let mut result: Vec<Maven> = rare
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(i, &count)| {
            let dev = &p.developers[i];
            Maven {
                handle: dev.handle.clone(),
                name: dev.name.clone(),
                email: dev.email.clone(),
                rare_files_count: count,
                total_files,
                mavenness: ratio(count, total_files),
            }
        })
        .collect();
    result.sort_by(|a, b| by_score_then_handle(a.mavenness, &a.handle, b.mavenness, &b.handle));
    result.truncate(limit);
    result
}

/// Developers ranked by `collaborator_count * shared_file_count`.
///
/// The collaboration graph links two developers when both have touched a
/// common file. `shared_file_count` counts the developer's files that at
/// least one peer has also touched. This is a cheap proxy for betweenness
/// centrality; no shortest paths are computed.
pub fn connectors(p: &RepoProjection, limit: usize) -> Vec<Connector> {
    let mut result: Vec<Connector> = (0..p.developers.len())
        .into_par_iter()
        .map(|i| {
            let dev = &p.developers[i];
            let collaborator_count = p.peers(i).len();
            let shared_file_count = dev
                .files
                .iter()
                .filter(|&&f| p.files[f].contributor_count() > 1)
                .count();
            Connector {
                handle: dev.handle.clone(),
                name: dev.name.clone(),
                email: dev.email.clone(),
                collaborator_count,
                shared_file_count,
                centrality_score: collaborator_count as u64 * shared_file_count as u64,
            }
        })
        .collect();
    result.sort_by(|a, b| {
        b.centrality_score
            .cmp(&a.centrality_score)
            .then_with(|| a.handle.cmp(&b.handle))
    });
    result.truncate(limit);
    result
}
