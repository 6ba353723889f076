//! TSP Solver Library
//!
//! Tour construction for the symmetric Traveling Salesman Problem over a
//! dense distance matrix.
//!
//! # Features
//!
//! - Twice-around-the-tree 2-approximation
//! - Christofides with a swappable matching strategy (greedy or exact)
//! - Exact best-first branch-and-bound with a wall-clock budget
//! - TSPLIB parsing, benchmarking and visualization tools
//!
//! # Example
//!
//! ```no_run
//! use tsp_solver::instance::TspInstance;
//! use tsp_solver::{branch_and_bound, christofides_tsp, tour_weight};
//!
//! let instance = TspInstance::from_file("instance.tsp").unwrap();
//!
//! let tour = christofides_tsp(&instance.distances);
//! println!("Christofides: {:.2}", tour_weight(&instance.distances, &tour));
//!
//! let exact = branch_and_bound(&instance.distances);
//! if exact.is_empty() {
//!     println!("no solution found");
//! }
//! ```

pub mod approximation;
pub mod benchmark;
pub mod error;
pub mod exact;
pub mod graph;
pub mod instance;
pub mod matrix;
pub mod queue;
pub mod solution;
pub mod visualization;

#[cfg(test)]
mod testing;

pub use approximation::{christofides_tsp, twice_around_the_tree};
pub use error::{Result, TspError};
pub use exact::branch_and_bound;
pub use graph::minimum_spanning_tree;
pub use instance::TspInstance;
pub use matrix::DistanceMatrix;
pub use solution::{is_hamiltonian_cycle, tour_weight, Solution};
