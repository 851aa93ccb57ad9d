//! Beam search and entry-point sampling over the flat graph.
//!
//! The traversal keeps two heaps: a max-heap `results` of the best candidates
//! found so far (capped at the beam width) and an explicit min-heap
//! `candidates` of nodes to expand next. Traversal stops once the closest
//! unexpanded candidate cannot improve the result set.

use crate::distance::Distance;
use crate::nsw::arena::{Label, NodeArena};
use crate::nsw::visited::VisitedSet;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A `(distance, node)` pair ordered by distance. In a `BinaryHeap` this
/// yields a max-heap (farthest on top); wrap in `Reverse` for a min-heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchEntry {
    pub distance: OrderedFloat<f32>,
    pub id: u32,
}

impl SearchEntry {
    #[inline]
    pub fn new(distance: f32, id: u32) -> Self {
        Self {
            distance: OrderedFloat(distance),
            id,
        }
    }
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Pick a search entry point by scanning a stride-sampled subset of nodes.
///
/// Samples `0, step, 2*step, ...` with `step = max(1, len / k_init)` and
/// returns the id closest to the query, ties to the earliest-seen id. The
/// scan is deterministic on purpose. Returns `None` on an empty arena.
pub(crate) fn sample_entry_point<L: Label>(
    arena: &NodeArena<L>,
    distance: &Distance,
    query: &[f32],
    k_init: usize,
) -> Option<u32> {
    assert!(k_init >= 1, "k_init must be at least 1");
    let len = arena.len();
    if len == 0 {
        return None;
    }

    let step = (len / k_init).max(1);
    let mut entry = 0u32;
    let mut min_dist = f32::MAX;

    let mut node = 0usize;
    while node < len {
        let dist = distance.compute(query, arena.data(node as u32));
        if dist < min_dist {
            min_dist = dist;
            entry = node as u32;
        }
        node += step;
    }
    Some(entry)
}

/// Best-first traversal from `entry`, bounded by a dynamic buffer of
/// `buffer_size` candidates.
///
/// Returns a max-heap of at most `buffer_size` `(distance, id)` pairs — the
/// best approximations to the `buffer_size` nearest neighbors the traversal
/// found. `query` must already be in storage form. The visited set is cleared
/// at the start of the call.
pub(crate) fn beam_search<L: Label>(
    arena: &NodeArena<L>,
    distance: &Distance,
    visited: &mut VisitedSet,
    query: &[f32],
    entry: u32,
    buffer_size: usize,
) -> BinaryHeap<SearchEntry> {
    debug_assert!(buffer_size >= 1);
    visited.clear();

    let mut results: BinaryHeap<SearchEntry> = BinaryHeap::with_capacity(buffer_size + 1);
    let mut candidates: BinaryHeap<Reverse<SearchEntry>> =
        BinaryHeap::with_capacity(buffer_size * 2);

    let dist = distance.compute(query, arena.data(entry));
    // Cached worst distance in `results` — avoids repeated heap peeks
    let mut worst_dist = dist;
    results.push(SearchEntry::new(dist, entry));
    candidates.push(Reverse(SearchEntry::new(dist, entry)));
    visited.insert(entry);

    while let Some(Reverse(closest)) = candidates.pop() {
        // If the closest candidate is farther than the worst result and the
        // buffer is full, no expansion can improve the result set.
        if results.len() >= buffer_size && closest.distance.0 > worst_dist {
            break;
        }

        let links = arena.links(closest.id);
        for i in 0..links.len() {
            let neighbor = links[i];

            // Prefetch the next neighbor's vector while processing this one
            if i + 1 < links.len() {
                arena.prefetch_data(links[i + 1]);
            }

            // Self-loops land here too: the owner is always already visited
            if !visited.insert(neighbor) {
                continue;
            }

            let dist = distance.compute(query, arena.data(neighbor));
            if results.len() < buffer_size || dist < worst_dist {
                candidates.push(Reverse(SearchEntry::new(dist, neighbor)));
                results.push(SearchEntry::new(dist, neighbor));
                if results.len() > buffer_size {
                    results.pop();
                }
                if let Some(top) = results.peek() {
                    worst_dist = top.distance.0;
                }
            }
        }
    }

    results
}
