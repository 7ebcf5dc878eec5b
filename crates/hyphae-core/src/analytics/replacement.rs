//! Replacement candidates for a departing developer.

use crate::error::{HyphaeError, Result};
use crate::graph::projection::{ratio, RepoProjection};
use crate::output::Replacement;

/// Rank every other developer by how much of `leaving`'s files they already know.
///
/// Candidates with no overlap are still listed, after everyone who has some.
/// Developers who reached no files at all are not candidates.
/// A departing developer who reached no files has no meaningful successor,
/// so the result is empty.
pub fn replacements(p: &RepoProjection, leaving: &str, limit: usize) -> Result<Vec<Replacement>> {
    let Some(leaver) = p.developer_index(leaving) else {
        return Err(HyphaeError::not_found(format!(
            "developer '{leaving}' in repository '{}'",
            p.repository.name
        )));
    };
    let leaving_files = &p.developers[leaver].files;
    if leaving_files.is_empty() {
        return Ok(Vec::new());
    }
    let leaving_file_count = leaving_files.len();

    let mut result: Vec<Replacement> = p
        .developers
        .iter()
        .enumerate()
        .filter(|(i, dev)| *i != leaver && !dev.files.is_empty())
        .map(|(_, dev)| {
            let shared_file_count = dev.files.intersection(leaving_files).count();
            Replacement {
                handle: dev.handle.clone(),
                name: dev.name.clone(),
                email: dev.email.clone(),
                leaving_file_count,
                shared_file_count,
                overlap_ratio: ratio(shared_file_count, leaving_file_count),
            }
        })
        .collect();
    result.sort_by(|a, b| {
        b.overlap_ratio
            .total_cmp(&a.overlap_ratio)
            .then_with(|| b.shared_file_count.cmp(&a.shared_file_count))
            .then_with(|| a.handle.cmp(&b.handle))
    });
    result.truncate(limit);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::projection;

    #[test]
    fn ranks_by_overlap() {
        let p = projection(&[
            ("c1", "alice", "a b c d"),
            ("c2", "bob", "x y"),
            ("c3", "carol", "y"),
            ("c4", "dave", "a b c d x"),
        ]);
        let result = replacements(&p, "bob", 10).unwrap();
        let ranked: Vec<_> = result
            .iter()
            .map(|r| (r.handle.as_str(), r.shared_file_count))
            .collect();
        assert_eq!(ranked, vec![("carol", 1), ("dave", 1), ("alice", 0)]);
        assert_eq!(result[0].overlap_ratio, 0.5);
        assert_eq!(result[0].leaving_file_count, 2);
        assert_eq!(result[2].overlap_ratio, 0.0);
    }

    #[test]
    fn full_overlap_is_ratio_one() {
        let p = projection(&[("c1", "alice", "a b"), ("c2", "bob", "a b c")]);
        let result = replacements(&p, "alice", 3).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].handle, "bob");
        assert_eq!(result[0].overlap_ratio, 1.0);
    }

    #[test]
    fn developers_without_files_are_not_candidates() {
        let p = projection(&[
            ("c1", "alice", "a b"),
            ("c2", "bob", "a"),
            ("c3", "carol", ""),
            ("c4", "dave", "z"),
        ]);
        let result = replacements(&p, "alice", 10).unwrap();
        let handles: Vec<_> = result.iter().map(|r| r.handle.as_str()).collect();
        assert_eq!(handles, vec!["bob", "dave"]);
    }

    #[test]
    fn unknown_developer_is_not_found() {
        let p = projection(&[("c1", "alice", "a")]);
        let err = replacements(&p, "mallory", 3).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn limit_truncates() {
        let p = projection(&[
            ("c1", "alice", "a"),
            ("c2", "bob", "a"),
            ("c3", "carol", "a"),
        ]);
        assert_eq!(replacements(&p, "alice", 1).unwrap().len(), 1);
        assert!(replacements(&p, "alice", 0).unwrap().is_empty());
    }
}
