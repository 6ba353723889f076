//! Tour representation and evaluation.
//!
//! A tour is a closed vertex sequence `[v0, v1, ..., v(n-1), v0]`. An empty
//! tour is how the exact solver reports that it found nothing.

use crate::matrix::DistanceMatrix;
use serde::{Deserialize, Serialize};

/// Closed tour, first and last entries equal.
pub type Tour = Vec<usize>;

/// Total weight of a closed tour. Legs over missing edges count as infinity.
pub fn tour_weight(distances: &DistanceMatrix, tour: &[usize]) -> f64 {
    tour.windows(2).map(|leg| distances.weight(leg[0], leg[1])).sum()
}

/// Check that `tour` visits every vertex of `0..n` exactly once and returns
/// to its start.
pub fn is_hamiltonian_cycle(tour: &[usize], n: usize) -> bool {
    if n == 0 || tour.len() != n + 1 || tour.first() != tour.last() {
        return false;
    }

    let mut seen = vec![false; n];
    for &v in &tour[..n] {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// Represents a solution to a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The closed tour (empty when no tour was found)
    pub tour: Tour,
    /// Total tour weight
    pub cost: f64,
    /// Whether the tour is a Hamiltonian cycle over existing edges
    pub valid: bool,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Search nodes expanded (exact solver only)
    pub nodes_explored: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: f64::INFINITY,
            valid: false,
            algorithm: String::new(),
            computation_time: 0.0,
            nodes_explored: None,
        }
    }

    /// Create a solution from a tour
    pub fn from_tour(distances: &DistanceMatrix, tour: Tour, algorithm: &str) -> Self {
        let mut solution = Solution {
            tour,
            algorithm: algorithm.to_string(),
            ..Solution::new()
        };
        solution.validate(distances);
        solution
    }

    /// Recompute cost and validity
    pub fn validate(&mut self, distances: &DistanceMatrix) {
        if self.tour.is_empty() {
            self.cost = f64::INFINITY;
            self.valid = false;
            return;
        }
        self.cost = tour_weight(distances, &self.tour);
        self.valid = self.cost.is_finite() && is_hamiltonian_cycle(&self.tour, distances.len());
    }

    /// True when the solver produced no tour (e.g. exact search timed out)
    pub fn is_empty(&self) -> bool {
        self.tour.is_empty()
    }

    /// Gap to a reference cost in percent
    pub fn gap_to(&self, reference: f64) -> Option<f64> {
        if self.is_empty() || reference <= 0.0 || !reference.is_finite() {
            return None;
        }
        Some((self.cost - reference) / reference * 100.0)
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        if self.is_empty() {
            writeln!(f, "  No tour found")?;
        } else {
            writeln!(f, "  Cost: {:.2}", self.cost)?;
            writeln!(f, "  Valid: {}", self.valid)?;
        }
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(nodes) = self.nodes_explored {
            writeln!(f, "  Nodes explored: {}", nodes)?;
        }
        Ok(())
    }
}
