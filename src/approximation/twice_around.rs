//! Twice-around-the-tree: MST preorder plus a closing edge.

use crate::approximation::TourConstruction;
use crate::graph::{minimum_spanning_tree, preorder_walk};
use crate::instance::TspInstance;
use crate::matrix::DistanceMatrix;
use crate::solution::{Solution, Tour};

/// Closed tour from a preorder walk of the minimum spanning tree.
///
/// At most twice the optimal weight on metric inputs.
pub fn twice_around_the_tree(distances: &DistanceMatrix) -> Tour {
    let tree = minimum_spanning_tree(distances);
    let mut tour = preorder_walk(&tree);
    if let Some(&start) = tour.first() {
        tour.push(start);
    }
    tour
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TwiceAroundTheTree;

impl TwiceAroundTheTree {
    pub fn new() -> Self {
        TwiceAroundTheTree
    }
}

impl TourConstruction for TwiceAroundTheTree {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let start = std::time::Instant::now();
        let tour = twice_around_the_tree(&instance.distances);

        let mut solution = Solution::from_tour(&instance.distances, tour, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        log::debug!(
            "{} on {}: cost {:.2} in {:.4}s",
            self.name(),
            instance.name,
            solution.cost,
            solution.computation_time
        );
        solution
    }

    fn name(&self) -> &str {
        "TwiceAroundTheTree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::tour_weight;
    use crate::testing::{assert_hamiltonian, brute_force_optimum, random_euclidean};

    #[test]
    fn test_known_tree_order() {
        // star around 0 on a line: 0 at 0, 1 at -1, 2 at 2, 3 at 3
        let pos = [0.0f64, -1.0, 2.0, 3.0];
        let rows = (0..4)
            .map(|i| (0..4).map(|j| (pos[i] - pos[j]).abs()).collect())
            .collect();
        let d = DistanceMatrix::from_rows(rows).unwrap();
        // MST: 0-1, 0-2, 2-3; preorder visits 2 before 1
        assert_eq!(twice_around_the_tree(&d), vec![0, 2, 3, 1, 0]);
    }

    #[test]
    fn test_permutation_cycle() {
        for seed in 0..10 {
            let n = 2 + seed as usize * 3;
            let d = random_euclidean(n, seed);
            assert_hamiltonian(&twice_around_the_tree(&d), n);
        }
    }

    #[test]
    fn test_within_twice_optimum() {
        for seed in 0..12 {
            let d = random_euclidean(7, 100 + seed);
            let weight = tour_weight(&d, &twice_around_the_tree(&d));
            let optimum = brute_force_optimum(&d);
            assert!(weight <= 2.0 * optimum + 1e-9, "{} > 2 * {}", weight, optimum);
        }
    }

    #[test]
    fn test_single_vertex() {
        let d = DistanceMatrix::from_rows(vec![vec![0.0]]).unwrap();
        assert_eq!(twice_around_the_tree(&d), vec![0, 0]);
    }

    #[test]
    fn test_disconnected_input_still_permutation() {
        // two components {0, 2} and {1, 3}
        let d = DistanceMatrix::from_rows(vec![
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 2.0],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 2.0, 0.0, 0.0],
        ])
        .unwrap();
        let tour = twice_around_the_tree(&d);
        assert_hamiltonian(&tour, 4);
        assert!(tour_weight(&d, &tour).is_infinite());
    }

    #[test]
    fn test_construct_reports_solution() {
        let instance = TspInstance::random_euclidean(12, 5, 100.0).unwrap();
        let solution = TwiceAroundTheTree::new().construct(&instance);
        assert!(solution.valid);
        assert_eq!(solution.algorithm, "TwiceAroundTheTree");
        assert!(solution.cost >= instance.statistics().mst_weight);
    }
}
