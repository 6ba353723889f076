//! Graph primitives shared by the approximation builders.
//!
//! Spanning tree construction, tree traversal, matching of odd-degree
//! vertices and Eulerian circuit extraction, all over dense matrices.

pub mod euler;
pub mod matching;
pub mod mst;
pub mod traversal;

pub use euler::eulerian_tour;
pub use matching::{ExactMatching, GreedyMatching, PerfectMatching, MAX_EXACT_MATCHING_VERTICES};
pub use mst::minimum_spanning_tree;
pub use traversal::preorder_walk;
