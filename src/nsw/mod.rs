//! Single-layer navigable-small-world index.
//!
//! [`NswIndex`] stores fixed-dimension vectors in a fixed-capacity arena and
//! wires them into a bounded-degree proximity graph at insertion time.
//! Queries run a best-first beam search from a deterministically sampled
//! entry point. The graph is directed; unused link slots are self-loops.
//!
//! The index owns its arena, visited set, and query scratch, so every
//! operation — including `search`, which writes the scratch — takes
//! `&mut self`. This encodes the single-writer discipline in the type system.

/// Fixed-capacity node arena and the `Label` trait.
pub mod arena;
/// Insertion: beam search for candidates, diversity pruning, bidirectional wiring.
pub mod insert;
/// Binary save/load with CRC32 integrity footer.
pub mod persistence;
/// In-place node reordering: link rewrite plus cycle-following relayout.
pub mod reorder;
/// Beam search and deterministic entry-point sampling.
pub mod search;
/// Generation-based visited set.
pub mod visited;

pub use arena::{Label, NodeArena};
pub use visited::VisitedSet;

use crate::distance::Distance;
use search::{beam_search, sample_entry_point};

/// Flat navigable-graph index over fixed-dimension f32 vectors.
///
/// Created with a fixed `(distance, capacity, max_links)` geometry that is
/// immutable for the index lifetime (deserialization replaces it wholesale).
/// Nodes are appended by [`NswIndex::add`] and never deleted.
#[derive(Debug)]
pub struct NswIndex<L: Label> {
    distance: Distance,
    arena: NodeArena<L>,
    visited: VisitedSet,
    scratch: Vec<f32>,
}

impl<L: Label> NswIndex<L> {
    /// Create an empty index.
    ///
    /// `capacity` is the maximum number of vectors the index will ever hold;
    /// the arena is allocated to full size up front so build never
    /// reallocates. `max_links` is the out-degree bound `M`.
    pub fn new(distance: Distance, capacity: usize, max_links: usize) -> Self {
        let dimension = distance.dimension();
        Self {
            arena: NodeArena::new(dimension, max_links, capacity),
            visited: VisitedSet::new(capacity),
            scratch: vec![0.0; dimension],
            distance,
        }
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Maximum number of vectors this index can hold.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Out-degree bound `M`.
    pub fn max_links(&self) -> usize {
        self.arena.max_links()
    }

    /// Vector dimension.
    pub fn dimension(&self) -> usize {
        self.distance.dimension()
    }

    /// The distance capability this index searches under.
    pub fn distance(&self) -> &Distance {
        &self.distance
    }

    /// Return the `num_results` indexed vectors closest to `query`, as
    /// `(distance, label)` pairs sorted by ascending distance.
    ///
    /// `ef_search` is the traversal beam width; it is clamped from below to
    /// `num_results`. At `ef_search == num_results` this degenerates to a
    /// greedy top-k search; larger values increase recall at linear cost.
    /// `k_init` controls entry-point sampling (see [`crate::config::DEFAULT_K_INIT`]).
    ///
    /// # Panics
    ///
    /// Panics if the index is empty, the query dimension does not match, or
    /// `k_init == 0` — all precondition violations.
    pub fn search(
        &mut self,
        query: &[f32],
        num_results: usize,
        ef_search: usize,
        k_init: usize,
    ) -> Vec<(f32, L)> {
        assert_eq!(
            query.len(),
            self.distance.dimension(),
            "query dimension mismatch"
        );
        assert!(!self.arena.is_empty(), "search on an empty index");
        assert!(num_results >= 1, "num_results must be at least 1");

        let ef = ef_search.max(num_results);
        self.distance.transform(&mut self.scratch, query);
        let entry = sample_entry_point(&self.arena, &self.distance, &self.scratch, k_init)
            .expect("entry point exists after is_empty() guard");
        let mut neighbors = beam_search(
            &self.arena,
            &self.distance,
            &mut self.visited,
            &self.scratch,
            entry,
            ef,
        );

        while neighbors.len() > num_results {
            neighbors.pop();
        }
        let mut results: Vec<(f32, L)> = neighbors
            .into_iter()
            .map(|entry| (entry.distance.0, self.arena.label(entry.id)))
            .collect();
        results.sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_K_INIT;
    use crate::distance::Distance;

    /// Index over the 1-d line `(i, 0)` for i in 0..10, labels 100..110.
    fn line_index() -> NswIndex<u64> {
        let mut index = NswIndex::new(Distance::squared_l2(2), 16, 4);
        for i in 0..10u64 {
            index.add(&[i as f32, 0.0], 100 + i, 16, DEFAULT_K_INIT);
        }
        index
    }

    #[test]
    fn test_new_index_is_empty() {
        let index: NswIndex<u64> = NswIndex::new(Distance::squared_l2(4), 8, 2);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.capacity(), 8);
        assert_eq!(index.max_links(), 2);
        assert_eq!(index.dimension(), 4);
    }

    #[test]
    fn test_top1_retrieval_on_line() {
        let mut index = line_index();
        let results = index.search(&[3.1, 0.0], 1, 16, DEFAULT_K_INIT);
        assert_eq!(results.len(), 1);
        let (dist, label) = results[0];
        assert_eq!(label, 103);
        // Squared L2 from (3.1, 0) to (3, 0)
        assert!((dist - 0.01).abs() < 1e-4, "distance was {dist}");
    }

    #[test]
    fn test_search_sorted_ascending_distinct_labels() {
        let mut index = line_index();
        let results = index.search(&[4.5, 0.0], 5, 16, DEFAULT_K_INIT);
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
        let mut labels: Vec<u64> = results.iter().map(|&(_, l)| l).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 5);
    }

    #[test]
    fn test_search_k_larger_than_index() {
        let mut index = line_index();
        let results = index.search(&[0.0, 0.0], 50, 64, DEFAULT_K_INIT);
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn test_search_ef_clamped_to_k() {
        let mut index = line_index();
        // ef_search < num_results still yields num_results entries
        let results = index.search(&[2.0, 0.0], 4, 1, DEFAULT_K_INIT);
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_exact_recall_with_wide_beam() {
        let mut index = line_index();
        let results = index.search(&[0.0, 0.0], 3, 16, DEFAULT_K_INIT);
        let labels: Vec<u64> = results.iter().map(|&(_, l)| l).collect();
        assert_eq!(labels, vec![100, 101, 102]);
    }

    #[test]
    #[should_panic(expected = "empty index")]
    fn test_search_empty_index_panics() {
        let mut index: NswIndex<u64> = NswIndex::new(Distance::squared_l2(2), 4, 2);
        index.search(&[0.0, 0.0], 1, 8, DEFAULT_K_INIT);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn test_search_wrong_dimension_panics() {
        let mut index = line_index();
        index.search(&[0.0], 1, 8, DEFAULT_K_INIT);
    }

    #[test]
    fn test_inner_product_search() {
        let mut index = NswIndex::new(Distance::inner_product(2), 8, 2);
        index.add(&[1.0, 0.0], 7u64, 8, DEFAULT_K_INIT);
        index.add(&[0.0, 1.0], 3, 8, DEFAULT_K_INIT);
        index.add(&[0.7, 0.7], 5, 8, DEFAULT_K_INIT);
        let results = index.search(&[1.0, 0.0], 1, 8, DEFAULT_K_INIT);
        assert_eq!(results[0].1, 7);
        assert!(results[0].0.abs() < 1e-6); // 1 - dot = 0 for aligned unit vectors
    }
}
