//! Reverse Cuthill–McKee graph reordering.
//!
//! Classic bandwidth-minimizing ordering: breadth-first traversal from a
//! minimum-degree root, expanding each node's neighbors in ascending degree
//! order, with the final sequence reversed. Nodes that are graph neighbors
//! end up with nearby ids, which clusters them in address space.

use std::collections::VecDeque;

/// Compute a Reverse Cuthill–McKee permutation for the given adjacency list.
///
/// `adjacency[u]` lists the out-neighbors of `u` (self-loops excluded); the
/// edge set is symmetrized before traversal. Returns `perm` with
/// `perm[old_id] = new_id`. Each connected component is rooted at its
/// minimum-degree node, ties to the smallest id.
pub fn rcm(adjacency: &[Vec<u32>]) -> Vec<u32> {
    let node_count = adjacency.len();
    if node_count == 0 {
        return Vec::new();
    }

    // Symmetrized, deduplicated neighbor lists
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); node_count];
    for (u, outs) in adjacency.iter().enumerate() {
        for &v in outs {
            if v as usize != u {
                neighbors[u].push(v);
                neighbors[v as usize].push(u as u32);
            }
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }
    let degree: Vec<usize> = neighbors.iter().map(|list| list.len()).collect();

    let mut visited = vec![false; node_count];
    let mut sequence: Vec<u32> = Vec::with_capacity(node_count);
    let mut queue: VecDeque<u32> = VecDeque::new();
    let mut frontier: Vec<u32> = Vec::new();

    loop {
        // Root the next component at its minimum-degree unvisited node
        let mut root: Option<usize> = None;
        for u in 0..node_count {
            if !visited[u] && root.is_none_or(|r| degree[u] < degree[r]) {
                root = Some(u);
            }
        }
        let Some(root) = root else {
            break;
        };

        visited[root] = true;
        queue.push_back(root as u32);
        while let Some(u) = queue.pop_front() {
            sequence.push(u);
            frontier.clear();
            frontier.extend(
                neighbors[u as usize]
                    .iter()
                    .copied()
                    .filter(|&v| !visited[v as usize]),
            );
            frontier.sort_unstable_by_key(|&v| (degree[v as usize], v));
            for &v in &frontier {
                visited[v as usize] = true;
                queue.push_back(v);
            }
        }
    }

    sequence.reverse();
    let mut perm = vec![0u32; node_count];
    for (position, &node) in sequence.iter().enumerate() {
        perm[node as usize] = position as u32;
    }
    perm
}
