//! Exact solver.
//!
//! A best-first branch-and-bound search with a wall-clock budget. When the
//! budget runs out the solver reports no tour rather than a partial one.

pub mod bound;
pub mod branch_and_bound;

pub use bound::MinEdgeTable;
pub use branch_and_bound::{
    branch_and_bound, branch_and_bound_with_deadline, BranchAndBound, BranchAndBoundConfig,
    SearchOutcome, SearchStatistics, SearchStatus,
};
