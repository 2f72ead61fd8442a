//! Ancestry resolution over the commit DAG.
//!
//! Walks are iterative breadth-first traversals over both parents, so long
//! histories cannot overflow the stack and heavily merged graphs visit each
//! commit once.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::CommitId;

/// Read access to parent links.
pub trait CommitGraph {
    /// Parents of `id`, first parent first.
    fn parents(&self, id: &CommitId) -> Result<Vec<CommitId>>;
}

/// Commit id -> minimum number of edges from the walk's start.
pub type DistanceMap = HashMap<CommitId, usize>;

/// Generation distance from `start` to every commit reachable from it,
/// `start` itself included at distance 0.
///
/// Breadth-first order guarantees the first time a commit is reached is along
/// a shortest path, so diamond histories keep their minimum distance.
pub fn ancestor_distances<G>(graph: &G, start: &CommitId) -> Result<DistanceMap>
where
    G: CommitGraph + ?Sized,
{
    let mut distances = DistanceMap::new();
    let mut queue = VecDeque::new();
    distances.insert(start.clone(), 0);
    queue.push_back((start.clone(), 0usize));

    while let Some((id, distance)) = queue.pop_front() {
        for parent in graph.parents(&id)? {
            if distances.contains_key(&parent) {
                continue;
            }
            distances.insert(parent.clone(), distance + 1);
            queue.push_back((parent, distance + 1));
        }
    }

    Ok(distances)
}

/// True when `ancestor` is reachable from `descendant` (or equal to it).
pub fn is_ancestor<G>(graph: &G, ancestor: &CommitId, descendant: &CommitId) -> Result<bool>
where
    G: CommitGraph + ?Sized,
{
    Ok(ancestor_distances(graph, descendant)?.contains_key(ancestor))
}

/// Nearest common ancestor of `head_a` and `head_b`.
///
/// Picks the common ancestor closest to `head_a`; ties go to whichever was
/// discovered first while walking `head_b`'s ancestry breadth-first. When one
/// head is an ancestor of the other, that head is returned.
pub fn merge_base<G>(graph: &G, head_a: &CommitId, head_b: &CommitId) -> Result<CommitId>
where
    G: CommitGraph + ?Sized,
{
    let from_a = ancestor_distances(graph, head_a)?;
    if from_a.contains_key(head_b) {
        debug!(base = %head_b, "merge base: other head is an ancestor");
        return Ok(head_b.clone());
    }

    let mut best: Option<(usize, CommitId)> = None;
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(head_b.clone());
    queue.push_back(head_b.clone());

    while let Some(id) = queue.pop_front() {
        if let Some(&distance) = from_a.get(&id) {
            let closer = best.as_ref().map_or(true, |(current, _)| distance < *current);
            if closer {
                best = Some((distance, id.clone()));
            }
        }
        for parent in graph.parents(&id)? {
            if seen.insert(parent.clone()) {
                queue.push_back(parent);
            }
        }
    }

    match best {
        Some((distance, base)) => {
            debug!(base = %base, distance, "merge base selected");
            Ok(base)
        }
        None => Err(Error::NoCommonAncestor {
            left: head_a.to_string(),
            right: head_b.to_string(),
        }),
    }
}
