//! Insertion into the flat graph.
//!
//! Each `add` beam-searches for candidate neighbors of the new node, prunes
//! them with the diversity heuristic, then wires forward links and attempts
//! reciprocal back-links. A saturated back-neighbor is re-pruned over its old
//! links plus the new node, which may drop an existing edge — accepted, since
//! the graph is directed and pruning is applied symmetrically over time.

use crate::distance::Distance;
use crate::nsw::arena::{Label, NodeArena};
use crate::nsw::search::{beam_search, sample_entry_point, SearchEntry};
use crate::nsw::NswIndex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

impl<L: Label> NswIndex<L> {
    /// Insert a vector with its label. Returns `true` on success.
    ///
    /// `ef_construction` is the beam width used to find candidate neighbors
    /// (at least `max_links` for a well-formed graph); `k_init` controls
    /// entry-point sampling.
    ///
    /// Returns `false` when the index is at capacity (state unchanged). It
    /// also returns `false` for the very first insertion: the node is stored
    /// and `len()` becomes 1, but there are no peers to link to, so the call
    /// reports failure.
    ///
    /// # Panics
    ///
    /// Panics if `data` does not match the index dimension or `k_init == 0`.
    pub fn add(&mut self, data: &[f32], label: L, ef_construction: usize, k_init: usize) -> bool {
        assert_eq!(
            data.len(),
            self.distance.dimension(),
            "vector dimension mismatch"
        );
        assert!(ef_construction >= 1, "ef_construction must be at least 1");

        // The entry point must be sampled before the new node becomes
        // visible: a fresh node is distance 0 from itself and has no outgoing
        // links, so sampling after allocation could seed the search at the
        // new node and terminate immediately, leaving it isolated.
        self.distance.transform(&mut self.scratch, data);
        let entry = sample_entry_point(&self.arena, &self.distance, &self.scratch, k_init);

        let Some(new_id) = self.arena.allocate() else {
            return false;
        };
        self.arena.data_mut(new_id).copy_from_slice(&self.scratch);
        self.arena.set_label(new_id, label);

        let Some(entry) = entry else {
            // First insertion: retained but unlinked, reported as failure.
            return false;
        };

        let mut neighbors = beam_search(
            &self.arena,
            &self.distance,
            &mut self.visited,
            &self.scratch,
            entry,
            ef_construction,
        );
        select_neighbors(
            &mut neighbors,
            self.arena.max_links(),
            &self.arena,
            &self.distance,
        );
        self.connect_neighbors(neighbors, new_id);
        true
    }

    /// Wire the chosen neighbors: forward links into `new_id`'s slots, then a
    /// reciprocal link per neighbor (free slot, or re-prune on saturation).
    fn connect_neighbors(&mut self, mut neighbors: BinaryHeap<SearchEntry>, new_id: u32) {
        let max_links = self.arena.max_links();
        let mut slot = 0usize;

        while let Some(chosen) = neighbors.pop() {
            let neighbor = chosen.id;
            if slot < max_links {
                self.arena.links_mut(new_id)[slot] = neighbor;
                slot += 1;
            }

            // Back-connection: a self-loop slot is a free slot
            let mut inserted = false;
            for j in 0..max_links {
                if self.arena.links(neighbor)[j] == neighbor {
                    self.arena.links_mut(neighbor)[j] = new_id;
                    inserted = true;
                    break;
                }
            }
            if inserted {
                continue;
            }

            // Neighbor is saturated: replacing a link blindly would disconnect
            // an arbitrary node. Re-run the diversity heuristic over the old
            // links plus the new node and keep the survivors.
            let mut candidates: BinaryHeap<SearchEntry> =
                BinaryHeap::with_capacity(max_links + 1);
            let dist_new = self
                .distance
                .compute(self.arena.data(neighbor), self.arena.data(new_id));
            candidates.push(SearchEntry::new(dist_new, new_id));
            for j in 0..max_links {
                let link = self.arena.links(neighbor)[j];
                if link != neighbor {
                    let dist = self
                        .distance
                        .compute(self.arena.data(neighbor), self.arena.data(link));
                    candidates.push(SearchEntry::new(dist, link));
                }
            }
            select_neighbors(&mut candidates, max_links, &self.arena, &self.distance);

            let links = self.arena.links_mut(neighbor);
            let mut j = 0;
            while let Some(survivor) = candidates.pop() {
                links[j] = survivor.id;
                j += 1;
            }
            while j < max_links {
                links[j] = neighbor;
                j += 1;
            }
        }
    }
}

/// Diversity pruning: reduce a candidate max-heap to at most `max_links`
/// neighbors, closest first, keeping a candidate only if no already-kept
/// neighbor is closer to it than the center is. This keeps neighbors that
/// each own a distinct direction and preserves long-range navigability.
///
/// Heaps with fewer than `max_links` entries are returned unchanged.
pub(crate) fn select_neighbors<L: Label>(
    neighbors: &mut BinaryHeap<SearchEntry>,
    max_links: usize,
    arena: &NodeArena<L>,
    distance: &Distance,
) {
    if neighbors.len() < max_links {
        return;
    }

    let mut candidates: BinaryHeap<Reverse<SearchEntry>> =
        BinaryHeap::with_capacity(neighbors.len());
    for entry in neighbors.drain() {
        candidates.push(Reverse(entry));
    }

    let mut kept: Vec<SearchEntry> = Vec::with_capacity(max_links);
    while let Some(Reverse(candidate)) = candidates.pop() {
        if kept.len() >= max_links {
            break;
        }
        let diverse = kept.iter().all(|k| {
            distance.compute(arena.data(k.id), arena.data(candidate.id)) >= candidate.distance.0
        });
        if diverse {
            kept.push(candidate);
        }
    }

    for entry in kept {
        neighbors.push(entry);
    }
}
