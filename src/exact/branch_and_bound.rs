//! Best-first branch-and-bound over partial tours rooted at vertex 0.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::approximation::TourConstruction;
use crate::exact::bound::MinEdgeTable;
use crate::instance::TspInstance;
use crate::matrix::DistanceMatrix;
use crate::queue::MinQueue;
use crate::solution::{Solution, Tour};

/// Branch-and-bound configuration
#[derive(Debug, Clone)]
pub struct BranchAndBoundConfig {
    /// Wall-clock budget; the search returns no tour once it is spent
    pub time_limit: Duration,
}

impl Default for BranchAndBoundConfig {
    fn default() -> Self {
        BranchAndBoundConfig {
            time_limit: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Frontier exhausted, the tour is optimal
    Optimal,
    /// Time limit reached before the search finished
    TimedOut,
    /// No Hamiltonian cycle exists over the present edges
    Infeasible,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SearchStatus::Optimal => "optimal",
            SearchStatus::TimedOut => "timed out",
            SearchStatus::Infeasible => "infeasible",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub nodes_pushed: usize,
    pub nodes_expanded: usize,
    pub nodes_pruned: usize,
    pub peak_frontier: usize,
    pub elapsed: f64,
}

/// Result of a branch-and-bound run. `tour` is empty unless `status` is
/// [`SearchStatus::Optimal`].
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub tour: Tour,
    pub cost: Option<f64>,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    fn empty(status: SearchStatus, statistics: SearchStatistics) -> Self {
        SearchOutcome { status, tour: Vec::new(), cost: None, statistics }
    }
}

/// Partial tour in the search frontier.
///
/// Nodes compare by path cost, then lexicographically by path, which fixes
/// the pop order among equal bounds.
#[derive(Debug, Clone)]
struct SearchNode {
    path: Vec<usize>,
    visited: Vec<bool>,
    cost: f64,
    /// Lower bound on the cost still to be added
    remaining: f64,
    bound: f64,
}

impl SearchNode {
    fn level(&self) -> usize {
        self.path.len()
    }

    fn last(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    fn child(&self, next: usize, weight: f64, remaining: f64) -> SearchNode {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(next);
        let mut visited = self.visited.clone();
        visited[next] = true;

        let cost = self.cost + weight;
        SearchNode {
            path,
            visited,
            cost,
            remaining,
            bound: self.bound.max(cost + remaining),
        }
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.cost)
            .cmp(&OrderedFloat(other.cost))
            .then_with(|| self.path.cmp(&other.path))
    }
}

pub struct BranchAndBound {
    pub config: BranchAndBoundConfig,
}

impl BranchAndBound {
    pub fn new(config: BranchAndBoundConfig) -> Self {
        BranchAndBound { config }
    }

    pub fn solve(&self, distances: &DistanceMatrix) -> SearchOutcome {
        let start = Instant::now();
        let mut stats = SearchStatistics::default();
        let outcome = self.search(distances, start, &mut stats);

        let mut outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                log::warn!(
                    "branch and bound aborted after {:.1}s with {} nodes expanded",
                    start.elapsed().as_secs_f64(),
                    stats.nodes_expanded
                );
                SearchOutcome::empty(SearchStatus::TimedOut, stats)
            }
        };
        outcome.statistics.elapsed = start.elapsed().as_secs_f64();
        log::debug!(
            "branch and bound {}: pushed {}, expanded {}, pruned {}, peak frontier {}",
            outcome.status,
            outcome.statistics.nodes_pushed,
            outcome.statistics.nodes_expanded,
            outcome.statistics.nodes_pruned,
            outcome.statistics.peak_frontier
        );
        outcome
    }

    /// `None` when the deadline passed.
    fn search(
        &self,
        distances: &DistanceMatrix,
        start: Instant,
        stats: &mut SearchStatistics,
    ) -> Option<SearchOutcome> {
        let limit = self.config.time_limit;
        let expired = || start.elapsed() >= limit;
        if expired() {
            return None;
        }

        let n = distances.len();
        if n == 0 {
            return Some(SearchOutcome::empty(SearchStatus::Infeasible, stats.clone()));
        }
        if n == 1 {
            return Some(SearchOutcome {
                status: SearchStatus::Optimal,
                tour: vec![0, 0],
                cost: Some(0.0),
                statistics: stats.clone(),
            });
        }

        let Some(table) = MinEdgeTable::new(distances) else {
            log::warn!("some vertex has fewer than two edges, no tour exists");
            return Some(SearchOutcome::empty(SearchStatus::Infeasible, stats.clone()));
        };

        let mut visited = vec![false; n];
        visited[0] = true;
        let remaining = table.root_remaining();
        let root = SearchNode {
            path: vec![0],
            visited,
            cost: 0.0,
            remaining,
            bound: remaining,
        };

        let mut frontier = MinQueue::new();
        frontier.push(root.bound, root);
        stats.nodes_pushed = 1;
        stats.peak_frontier = 1;

        let mut best: Option<SearchNode> = None;
        let mut best_cost = f64::INFINITY;

        loop {
            if expired() {
                return None;
            }
            let Some((bound, node)) = frontier.pop_min() else {
                break;
            };

            if node.level() > n {
                if node.cost < best_cost {
                    best_cost = node.cost;
                    best = Some(node);
                }
                continue;
            }

            if bound >= best_cost {
                // every remaining node has at least this bound
                stats.nodes_pruned += 1 + frontier.len();
                break;
            }
            stats.nodes_expanded += 1;

            let last = node.last();
            if node.level() == n {
                let Some(weight) = distances.edge(last, 0) else {
                    continue;
                };
                if !node.visited.iter().all(|&v| v) {
                    continue;
                }
                let closed = node.child(0, weight, 0.0);
                if closed.bound < best_cost {
                    frontier.push(closed.bound, closed);
                    stats.nodes_pushed += 1;
                } else {
                    stats.nodes_pruned += 1;
                }
            } else {
                for (next, weight) in distances.neighbors(last) {
                    if node.visited[next] {
                        continue;
                    }
                    let remaining = table.step(node.remaining, node.level(), last, next);
                    let child = node.child(next, weight, remaining);
                    if child.bound < best_cost {
                        frontier.push(child.bound, child);
                        stats.nodes_pushed += 1;
                    } else {
                        stats.nodes_pruned += 1;
                    }
                }
            }
            stats.peak_frontier = stats.peak_frontier.max(frontier.len());
        }

        let outcome = match best {
            Some(node) => SearchOutcome {
                status: SearchStatus::Optimal,
                cost: Some(node.cost),
                tour: node.path,
                statistics: stats.clone(),
            },
            None => SearchOutcome::empty(SearchStatus::Infeasible, stats.clone()),
        };
        Some(outcome)
    }
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self::new(BranchAndBoundConfig::default())
    }
}

impl TourConstruction for BranchAndBound {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let outcome = self.solve(&instance.distances);
        let mut solution = Solution::from_tour(&instance.distances, outcome.tour, self.name());
        solution.computation_time = outcome.statistics.elapsed;
        solution.nodes_explored = Some(outcome.statistics.nodes_expanded);
        solution
    }

    fn name(&self) -> &str {
        "BranchAndBound"
    }
}

/// Exact tour within the default 30 minute budget, empty if none was found.
pub fn branch_and_bound(distances: &DistanceMatrix) -> Tour {
    BranchAndBound::default().solve(distances).tour
}

/// Exact tour within `time_limit`, empty if none was found.
pub fn branch_and_bound_with_deadline(distances: &DistanceMatrix, time_limit: Duration) -> Tour {
    BranchAndBound::new(BranchAndBoundConfig { time_limit }).solve(distances).tour
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::tour_weight;
    use crate::testing::{assert_hamiltonian, brute_force_optimum, random_euclidean};

    fn four() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 10.0, 15.0, 20.0],
            vec![10.0, 0.0, 35.0, 25.0],
            vec![15.0, 35.0, 0.0, 30.0],
            vec![20.0, 25.0, 30.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_four_cities() {
        let d = four();
        let tour = branch_and_bound(&d);
        assert_hamiltonian(&tour, 4);
        assert_eq!(tour_weight(&d, &tour), 80.0);
        assert!(tour == vec![0, 1, 3, 2, 0] || tour == vec![0, 2, 3, 1, 0]);
    }

    #[test]
    fn test_zero_deadline_returns_empty() {
        for n in [1, 4, 12] {
            let d = random_euclidean(n, 8);
            assert!(branch_and_bound_with_deadline(&d, Duration::ZERO).is_empty());
        }
        let outcome = BranchAndBound::new(BranchAndBoundConfig { time_limit: Duration::ZERO })
            .solve(&four());
        assert_eq!(outcome.status, SearchStatus::TimedOut);
        assert_eq!(outcome.cost, None);
    }

    #[test]
    fn test_matches_brute_force() {
        for seed in 0..8 {
            let n = 7 + (seed as usize % 2);
            let d = random_euclidean(n, 900 + seed);
            let outcome = BranchAndBound::default().solve(&d);
            assert_eq!(outcome.status, SearchStatus::Optimal);
            assert_hamiltonian(&outcome.tour, n);
            let optimum = brute_force_optimum(&d);
            let cost = outcome.cost.unwrap();
            assert!((cost - optimum).abs() < 1e-9, "{} != {}", cost, optimum);
            assert!((tour_weight(&d, &outcome.tour) - cost).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sparse_graph_uses_only_present_edges() {
        // ring 0-1-2-3-4-0 plus the expensive chord 0-2
        let mut rows = vec![vec![0.0; 5]; 5];
        for (u, v, w) in [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 0, 1.0), (0, 2, 9.0)] {
            rows[u][v] = w;
            rows[v][u] = w;
        }
        let d = DistanceMatrix::from_rows(rows).unwrap();
        let tour = branch_and_bound(&d);
        assert_eq!(tour, vec![0, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_degree_one_vertex_is_infeasible() {
        let d = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0, 0.0],
            vec![1.0, 1.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let outcome = BranchAndBound::default().solve(&d);
        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert!(outcome.tour.is_empty());
    }

    #[test]
    fn test_bowtie_is_infeasible_after_search() {
        // two triangles sharing vertex 0
        let mut rows = vec![vec![0.0; 5]; 5];
        for (u, v) in [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)] {
            rows[u][v] = 1.0;
            rows[v][u] = 1.0;
        }
        let d = DistanceMatrix::from_rows(rows).unwrap();
        let outcome = BranchAndBound::default().solve(&d);
        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert!(outcome.tour.is_empty());
        assert!(outcome.statistics.nodes_expanded > 0);
    }

    #[test]
    fn test_one_and_two_vertices() {
        let one = DistanceMatrix::from_rows(vec![vec![0.0]]).unwrap();
        assert_eq!(branch_and_bound(&one), vec![0, 0]);

        let two = DistanceMatrix::from_rows(vec![vec![0.0, 3.0], vec![3.0, 0.0]]).unwrap();
        let outcome = BranchAndBound::default().solve(&two);
        assert_eq!(outcome.tour, vec![0, 1, 0]);
        assert_eq!(outcome.cost, Some(6.0));
    }

    #[test]
    fn test_zero_length_edges() {
        let d = DistanceMatrix::from_options(vec![
            vec![None, Some(0.0), Some(5.0)],
            vec![Some(0.0), None, Some(5.0)],
            vec![Some(5.0), Some(5.0), None],
        ])
        .unwrap();
        let outcome = BranchAndBound::default().solve(&d);
        assert_eq!(outcome.cost, Some(10.0));
    }

    #[test]
    fn test_node_order_breaks_ties_by_cost_then_path() {
        let node = |path: Vec<usize>, cost: f64| SearchNode {
            visited: vec![false; 4],
            path,
            cost,
            remaining: 0.0,
            bound: 0.0,
        };
        assert!(node(vec![0, 1], 1.0) < node(vec![0, 2], 2.0));
        assert!(node(vec![0, 3], 1.0) < node(vec![0, 3, 1], 1.0));
        assert!(node(vec![0, 1, 3], 1.0) < node(vec![0, 2], 1.0));
    }

    #[test]
    fn test_deterministic_statistics() {
        let d = random_euclidean(9, 4);
        let a = BranchAndBound::default().solve(&d);
        let b = BranchAndBound::default().solve(&d);
        assert_eq!(a.tour, b.tour);
        assert_eq!(a.statistics.nodes_expanded, b.statistics.nodes_expanded);
        assert!(a.statistics.peak_frontier >= 1);
    }

    #[test]
    fn test_construct_records_nodes() {
        let instance = TspInstance::random_euclidean(6, 2, 10.0).unwrap();
        let solution = BranchAndBound::default().construct(&instance);
        assert!(solution.valid);
        assert!(solution.nodes_explored.unwrap_or(0) > 0);
    }
}
