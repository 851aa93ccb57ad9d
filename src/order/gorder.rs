//! Gorder graph reordering.
//!
//! Greedy window-based ordering: nodes are placed one at a time, and each
//! unplaced node carries a priority equal to the number of edges it shares
//! with the last `window_size` placed nodes. The next node placed is the
//! highest-priority unplaced one, so graph neighborhoods end up contiguous
//! in the new numbering and traversals reuse cache lines.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Compute a Gorder permutation for the given adjacency list.
///
/// `adjacency[u]` lists the out-neighbors of `u` (self-loops excluded; edges
/// are treated as undirected for scoring). Returns `perm` with
/// `perm[old_id] = new_id`. `window_size` controls how many recently placed
/// nodes vote for the next one.
///
/// The priority heap is lazy: every priority change pushes a fresh entry and
/// stale entries are skipped on pop. Disconnected components restart at the
/// smallest unplaced id.
pub fn gorder(adjacency: &[Vec<u32>], window_size: usize) -> Vec<u32> {
    assert!(window_size >= 1, "window_size must be at least 1");
    let node_count = adjacency.len();
    if node_count == 0 {
        return Vec::new();
    }

    // Undirected neighbor view: out-edges plus in-edges
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); node_count];
    for (u, outs) in adjacency.iter().enumerate() {
        for &v in outs {
            neighbors[u].push(v);
            neighbors[v as usize].push(u as u32);
        }
    }

    let mut priority: Vec<i64> = vec![0; node_count];
    let mut placed = vec![false; node_count];
    let mut heap: BinaryHeap<(i64, Reverse<u32>)> = BinaryHeap::new();
    let mut sequence: Vec<u32> = Vec::with_capacity(node_count);

    // Seed at the highest-degree node, ties to the smallest id
    let mut seed = 0usize;
    for u in 1..node_count {
        if neighbors[u].len() > neighbors[seed].len() {
            seed = u;
        }
    }

    let mut current = seed as u32;
    loop {
        placed[current as usize] = true;
        sequence.push(current);
        if sequence.len() == node_count {
            break;
        }

        // The newly placed node votes for its unplaced neighbors
        for &v in &neighbors[current as usize] {
            let vi = v as usize;
            if !placed[vi] {
                priority[vi] += 1;
                heap.push((priority[vi], Reverse(v)));
            }
        }
        // The node sliding out of the window withdraws its votes
        if sequence.len() > window_size {
            let expired = sequence[sequence.len() - window_size - 1];
            for &v in &neighbors[expired as usize] {
                let vi = v as usize;
                if !placed[vi] {
                    priority[vi] -= 1;
                    heap.push((priority[vi], Reverse(v)));
                }
            }
        }

        current = loop {
            match heap.pop() {
                Some((p, Reverse(v))) => {
                    // Skip stale entries superseded by a later priority change
                    if placed[v as usize] || p != priority[v as usize] {
                        continue;
                    }
                    break v;
                }
                None => {
                    // Disconnected remainder: restart at the smallest unplaced id
                    let v = placed
                        .iter()
                        .position(|&is_placed| !is_placed)
                        .expect("an unplaced node remains before the sequence is full");
                    break v as u32;
                }
            }
        };
    }

    let mut perm = vec![0u32; node_count];
    for (position, &node) in sequence.iter().enumerate() {
        perm[node as usize] = position as u32;
    }
    perm
}
