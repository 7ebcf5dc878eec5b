//! Pairwise collaboration strength and high-traffic files.

use rayon::prelude::*;

use crate::graph::projection::RepoProjection;
use crate::output::{Collaboration, CriticalFile};

/// Developer pairs ordered by the number of files both have touched.
///
/// Each unordered pair appears once, with the lower handle as `developer1`.
pub fn collaborations(p: &RepoProjection, limit: usize) -> Vec<Collaboration> {
    let mut pairs: Vec<(usize, usize, usize)> = (0..p.developers.len())
        .into_par_iter()
        .flat_map_iter(|d1| {
            p.peers(d1)
                .into_iter()
                .filter(move |&(d2, shared)| d2 > d1 && shared > 0)
                .map(move |(d2, shared)| (d1, d2, shared))
        })
        .collect();
    // Dense indices follow handle order, so index order doubles as the handle tie-break.
    pairs.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));
    pairs.truncate(limit);

    pairs
        .into_iter()
        .map(|(d1, d2, shared)| {
            let (a, b) = (&p.developers[d1], &p.developers[d2]);
            Collaboration {
                developer1: a.handle.clone(),
                name1: a.name.clone(),
                developer2: b.handle.clone(),
                name2: b.name.clone(),
                collaboration_strength: shared,
            }
        })
        .collect()
}

/// Files known by the fewest developers first.
pub fn critical_files(p: &RepoProjection, limit: usize) -> Vec<CriticalFile> {
    let mut files: Vec<CriticalFile> = p
        .files
        .iter()
        .map(|f| CriticalFile {
            path: f.path.clone(),
            filename: f.filename.clone(),
            contributors: f.contributor_count(),
        })
        .collect();
    files.sort_by(|a, b| {
        a.contributors
            .cmp(&b.contributors)
            .then_with(|| a.path.cmp(&b.path))
    });
    files.truncate(limit);
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::projection;

    #[test]
    fn pairs_are_unique_and_ordered() {
        let p = projection(&[
            ("c1", "carol", "a b c"),
            ("c2", "alice", "a b"),
            ("c3", "bob", "c"),
            ("c4", "dave", "z"),
        ]);
        let collabs = collaborations(&p, 10);
        let pairs: Vec<_> = collabs
            .iter()
            .map(|c| (c.developer1.as_str(), c.developer2.as_str(), c.collaboration_strength))
            .collect();
        assert_eq!(pairs, vec![("alice", "carol", 2), ("bob", "carol", 1)]);
        assert_eq!(collabs[0].name1, "ALICE");
        assert_eq!(collabs[0].name2, "CAROL");
    }

    #[test]
    fn collaboration_limit() {
        let p = projection(&[("c1", "alice", "a"), ("c2", "bob", "a"), ("c3", "carol", "a")]);
        assert_eq!(collaborations(&p, 2).len(), 2);
        assert!(collaborations(&p, 0).is_empty());
    }

    #[test]
    fn critical_files_fewest_contributors_first() {
        let p = projection(&[
            ("c1", "alice", "hot.rs cold.rs"),
            ("c2", "bob", "hot.rs warm.rs"),
            ("c3", "carol", "hot.rs warm.rs"),
        ]);
        let files = critical_files(&p, 10);
        let ranked: Vec<_> = files
            .iter()
            .map(|f| (f.path.as_str(), f.contributors))
            .collect();
        assert_eq!(ranked, vec![("cold.rs", 1), ("warm.rs", 2), ("hot.rs", 3)]);
    }
}
