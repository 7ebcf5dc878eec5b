//! Hyphae Core - team-knowledge analytics over a repository contribution graph.
//!
//! Commit facts are ingested into a petgraph-backed store of repositories,
//! developers, files and commits. Queries project one repository at a time and
//! derive knowledge roles, distribution statistics, bus-factor risk,
//! replacement candidates and collaboration strength from who touched what.

pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod store;

pub use engine::Engine;
pub use error::{HyphaeError, Result};
