//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use hyphae_core::config::{
    AnalyticsConfig, AuthorFact, ChangeType, CommitFact, FileChange, RepositoryInfo,
};
use hyphae_core::ingest::read_commit_facts;
use hyphae_core::Engine;

pub const WIDGETS: &str = "acme/widgets";
pub const GADGETS: &str = "acme/gadgets";

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

pub fn load_fixture(name: &str) -> Vec<CommitFact> {
    read_commit_facts(&fixture_path(name)).expect("Failed to read fixture")
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// Engine with `acme/widgets` ingested: 10 files, alice sole owner of 4.
pub fn widgets_engine() -> Engine {
    let engine = Engine::default();
    engine
        .ingest(&load_fixture("acme_widgets.json"))
        .expect("Failed to ingest widgets fixture");
    engine
}

/// Engine with both fixture repositories ingested.
pub fn full_engine() -> Engine {
    let engine = widgets_engine();
    engine
        .ingest(&load_fixture("acme_gadgets.jsonl"))
        .expect("Failed to ingest gadgets fixture");
    engine
}

pub fn engine_with(config: AnalyticsConfig, facts: &[CommitFact]) -> Engine {
    let engine = Engine::new(config);
    engine.ingest(facts).expect("Failed to ingest facts");
    engine
}

// ---------------------------------------------------------------------------
// Fact builders
// ---------------------------------------------------------------------------

/// A commit to `repo` on day `day` of January 2024 touching `paths`.
pub fn commit(repo: &str, hash: &str, handle: &str, day: u32, paths: &[&str]) -> CommitFact {
    CommitFact {
        hash: hash.to_string(),
        timestamp: format!("2024-01-{day:02}T12:00:00Z")
            .parse()
            .expect("Bad timestamp"),
        message: format!("{handle} commit {hash}"),
        author: AuthorFact {
            handle: handle.to_string(),
            name: handle.to_string(),
            email: format!("{handle}@example.com"),
        },
        changes: paths
            .iter()
            .map(|p| FileChange {
                path: p.to_string(),
                change_type: ChangeType::Modified,
            })
            .collect(),
        repository: RepositoryInfo {
            name: repo.to_string(),
            url: String::new(),
            description: String::new(),
        },
    }
}

pub fn handles<'a, T>(items: &'a [T], handle: impl Fn(&'a T) -> &'a str) -> Vec<&'a str> {
    items.iter().map(handle).collect()
}
