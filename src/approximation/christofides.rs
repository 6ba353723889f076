//! Christofides: spanning tree, matching on odd vertices, Eulerian circuit,
//! shortcut.

use crate::approximation::TourConstruction;
use crate::graph::{eulerian_tour, minimum_spanning_tree, GreedyMatching, PerfectMatching};
use crate::instance::TspInstance;
use crate::matrix::DistanceMatrix;
use crate::solution::{Solution, Tour};

/// Christofides with the default greedy matching.
pub fn christofides_tsp(distances: &DistanceMatrix) -> Tour {
    Christofides::new().tour(distances)
}

/// Keep the first visit of every vertex, append vertices the walk never
/// reached in ascending order, then close the cycle.
fn shortcut(walk: &[usize], n: usize) -> Tour {
    let mut seen = vec![false; n];
    let mut tour = Vec::with_capacity(n + 1);

    for &v in walk {
        if !seen[v] {
            seen[v] = true;
            tour.push(v);
        }
    }

    if tour.len() < n {
        log::warn!(
            "eulerian walk reached {} of {} vertices, appending the rest",
            tour.len(),
            n
        );
        tour.extend((0..n).filter(|&v| !seen[v]));
    }

    if let Some(&start) = tour.first() {
        tour.push(start);
    }
    tour
}

/// Christofides builder, generic over the matching strategy.
#[derive(Debug, Clone, Default)]
pub struct Christofides<M: PerfectMatching = GreedyMatching> {
    pub matching: M,
}

impl Christofides<GreedyMatching> {
    pub fn new() -> Self {
        Christofides { matching: GreedyMatching }
    }
}

impl<M: PerfectMatching> Christofides<M> {
    pub fn with_matching(matching: M) -> Self {
        Christofides { matching }
    }

    pub fn tour(&self, distances: &DistanceMatrix) -> Tour {
        let n = distances.len();
        if n == 0 {
            return Vec::new();
        }

        let mut multigraph = minimum_spanning_tree(distances);
        let odd = multigraph.odd_degree_vertices();
        if odd.len() % 2 == 1 {
            log::warn!("odd number of odd-degree vertices ({})", odd.len());
        }

        let pairs = self.matching.match_into(&mut multigraph, distances, &odd);
        log::debug!(
            "{} matching paired {} of {} odd vertices",
            self.matching.name(),
            pairs.len() * 2,
            odd.len()
        );

        let walk = eulerian_tour(&mut multigraph);
        shortcut(&walk, n)
    }
}

impl<M: PerfectMatching> TourConstruction for Christofides<M> {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let start = std::time::Instant::now();
        let tour = self.tour(&instance.distances);

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
        self.matching.builder_name()
    }
}
