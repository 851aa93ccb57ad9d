//! In-place node reordering.
//!
//! A reorder permutes the arena so that graph-adjacent nodes end up close in
//! memory, improving cache locality of beam search. The permutation itself
//! comes from the `order` providers (Gorder or Reverse Cuthill–McKee) fed
//! with the graph's adjacency list; applying it is a two-pass in-place
//! relabel: rewrite every link into the new numbering, then relocate node
//! records by following permutation cycles.

use crate::nsw::arena::Label;
use crate::nsw::NswIndex;

impl<L: Label> NswIndex<L> {
    /// Reorder the arena with the Gorder permutation.
    ///
    /// `window_size` is the Gorder sliding-window parameter (see
    /// [`crate::config::DEFAULT_GORDER_WINDOW`]). Search results are
    /// unaffected up to label identity; only the physical layout changes.
    pub fn reorder_gorder(&mut self, window_size: usize) {
        let perm = crate::order::gorder(&self.adjacency(), window_size);
        self.relabel(&perm);
        tracing::info!(
            "reordered {} nodes with gorder (window={})",
            self.arena.len(),
            window_size
        );
    }

    /// Reorder the arena with the Reverse Cuthill–McKee permutation.
    pub fn reorder_rcm(&mut self) {
        let perm = crate::order::rcm(&self.adjacency());
        self.relabel(&perm);
        tracing::info!("reordered {} nodes with rcm", self.arena.len());
    }

    /// Gather the adjacency list: each node's outgoing links, self-loops
    /// excluded.
    fn adjacency(&self) -> Vec<Vec<u32>> {
        let node_count = self.arena.len();
        let mut table: Vec<Vec<u32>> = vec![Vec::new(); node_count];
        for node in 0..node_count as u32 {
            for &link in self.arena.links(node) {
                if link != node {
                    table[node as usize].push(link);
                }
            }
        }
        table
    }

    /// Apply a permutation `perm` (a bijection over `[0, len)`): the node at
    /// slot `x` moves to slot `perm[x]` and every link value is rewritten
    /// accordingly.
    pub(crate) fn relabel(&mut self, perm: &[u32]) {
        let node_count = self.arena.len();
        assert_eq!(perm.len(), node_count, "permutation length mismatch");
        debug_assert!(is_permutation(perm), "relabel input is not a bijection");

        // Pass 1: rewrite links into the new numbering. This must precede the
        // physical move: a self-loop of node n must become perm[n], which is
        // exactly where the slot is headed, so the unused-slot invariant
        // survives relocation.
        for node in 0..node_count as u32 {
            for slot in self.arena.links_mut(node) {
                *slot = perm[*slot as usize];
            }
        }

        // Pass 2: relocate records by following permutation cycles. The
        // visited set doubles as the is-relocated set, cleared once.
        self.visited.clear();
        for node in 0..node_count as u32 {
            if self.visited.contains(node) {
                continue;
            }
            let src = node;
            let mut dst = perm[src as usize];
            self.arena.swap_nodes(src, dst);
            self.visited.insert(src);
            // src keeps collecting the next record of the cycle; dst advances
            // until the cycle closes back at src.
            while !self.visited.contains(dst) {
                self.visited.insert(dst);
                dst = perm[dst as usize];
                self.arena.swap_nodes(src, dst);
            }
        }
    }
}

fn is_permutation(perm: &[u32]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &p in perm {
        let idx = p as usize;
        if idx >= perm.len() || seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}
