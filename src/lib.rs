//! # navgraph
//!
//! In-memory flat navigable-graph index for approximate nearest neighbor
//! search over fixed-dimension f32 vectors.
//!
//! The index is a single-layer bounded-degree proximity graph stored in a
//! fixed-capacity arena. Construction wires each inserted vector to a diverse
//! set of near neighbors found by beam search; queries traverse the graph
//! best-first and return the top-k closest stored vectors under the configured
//! distance metric. A post-build reordering pass (Gorder or Reverse
//! Cuthill–McKee) permutes the arena so that graph-adjacent nodes share cache
//! lines.
//!
//! ## Architecture
//!
//! ```text
//! NswIndex → { NodeArena [data | links | label], VisitedSet, Distance }
//! build:  add → entry sampler → beam search → diversity pruning → wiring
//! query:  search → entry sampler → beam search → top-k extraction
//! layout: reorder_gorder / reorder_rcm → permutation → in-place relabel
//! ```

/// Global configuration constants: defaults and limits.
pub mod config;
/// Distance metrics (squared L2, inner product) with SIMD kernels.
pub mod distance;
/// The navigable-small-world index: arena, search, insertion, reordering, persistence.
pub mod nsw;
/// Graph-reordering permutation providers: Gorder and Reverse Cuthill–McKee.
pub mod order;

pub use distance::{Distance, DistanceMetric};
pub use nsw::{Label, NswIndex};
