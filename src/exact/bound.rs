//! Two-cheapest-edges lower bound for partial tours.
//!
//! Every vertex still to be entered and left needs two distinct incident
//! edges, and each end of the current path needs one more. With `m1(v)` and
//! `m2(v)` the cheapest and second cheapest edges at `v`, the remaining cost
//! of any completion is at least half of
//!
//! ```text
//! R = sum over unvisited v of (m1(v) + m2(v)) + m1(first) + m1(last)
//! ```
//!
//! At the root nothing is committed and every vertex counts with both edges.

use crate::matrix::DistanceMatrix;

/// Cheapest and second cheapest incident edge weight per vertex.
#[derive(Debug, Clone)]
pub struct MinEdgeTable {
    first: Vec<f64>,
    second: Vec<f64>,
}

impl MinEdgeTable {
    /// `None` when a Hamiltonian cycle cannot exist because some vertex has
    /// fewer than two incident edges (for three or more vertices).
    pub fn new(distances: &DistanceMatrix) -> Option<Self> {
        let n = distances.len();
        let mut first = vec![f64::INFINITY; n];
        let mut second = vec![f64::INFINITY; n];

        for v in 0..n {
            for (_, w) in distances.neighbors(v) {
                if w < first[v] {
                    second[v] = first[v];
                    first[v] = w;
                } else if w < second[v] {
                    second[v] = w;
                }
            }

            if !first[v].is_finite() && n > 1 {
                return None;
            }
            if !second[v].is_finite() {
                if n > 2 {
                    return None;
                }
                // two vertices: the tour walks the single edge both ways
                second[v] = first[v];
            }
        }

        Some(MinEdgeTable { first, second })
    }

    #[inline]
    pub fn cheapest(&self, v: usize) -> f64 {
        self.first[v]
    }

    #[inline]
    pub fn second_cheapest(&self, v: usize) -> f64 {
        self.second[v]
    }

    /// Lower bound on the full tour before any vertex is committed.
    pub fn root_remaining(&self) -> f64 {
        let sum: f64 = self.first.iter().zip(&self.second).map(|(a, b)| a + b).sum();
        sum / 2.0
    }

    /// Remaining-cost bound after extending a path `... -> last` by `next`.
    ///
    /// `path_len` is the number of vertices on the path before the step.
    pub fn step(&self, remaining: f64, path_len: usize, last: usize, next: usize) -> f64 {
        let released = if path_len == 1 {
            // last is the start vertex, which keeps only its cheapest edge
            self.second[last] + self.second[next]
        } else {
            self.first[last] + self.second[next]
        };
        (remaining - released / 2.0).max(0.0)
    }
}
