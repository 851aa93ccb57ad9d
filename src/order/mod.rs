//! Graph-reordering permutation providers.
//!
//! Both providers are pure functions over an adjacency list (each node's
//! outgoing links, self-loops excluded) and return a permutation vector
//! `perm` with `perm[old_id] = new_id`. Both are deterministic: ties break
//! to the smallest node id, so reordering is reproducible across runs.

/// Gorder: greedy sliding-window ordering maximizing neighbor reuse.
pub mod gorder;
/// Reverse Cuthill–McKee: bandwidth-minimizing breadth-first ordering.
pub mod rcm;

pub use gorder::gorder;
pub use rcm::rcm;
