//! Global configuration constants for navgraph.
//!
//! All tuning defaults and input validation limits are defined here. These
//! are compile-time constants; per-call parameters (`ef_construction`,
//! `ef_search`, `k_init`) are passed explicitly through the public API.

/// Default number of stride-sampled probes used to pick a search entry point.
///
/// The sampler scans `current_node_count / k_init` evenly spaced nodes and
/// starts the traversal from the closest. Higher values find a better seed at
/// linear cost.
pub const DEFAULT_K_INIT: usize = 100;

/// Default sliding-window size for the Gorder reordering pass.
///
/// Each placed node scores candidates against the last `window` placed nodes.
/// The Gorder paper recommends small windows (3–8).
pub const DEFAULT_GORDER_WINDOW: usize = 5;

/// Default beam width during index construction.
///
/// Controls the size of the dynamic candidate list while wiring a new node.
/// Higher values produce a better graph but slow down build time. Must be at
/// least the index's `max_links`.
pub const DEFAULT_EF_CONSTRUCTION: usize = 128;

/// Default beam width during search.
///
/// Higher values improve recall at the cost of latency. Clamped from below
/// to the number of requested results.
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Maximum allowed vector dimension.
pub const MAX_DIMENSION: usize = 4096;
