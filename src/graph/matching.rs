//! Perfect matching strategies for the odd-degree vertices of a spanning tree.
//!
//! Christofides' 1.5 guarantee needs a minimum-weight perfect matching. The
//! [`GreedyMatching`] strategy gives that up for speed on large instances;
//! [`ExactMatching`] solves the matching exactly on small vertex sets.

use crate::matrix::{AdjacencyMatrix, DistanceMatrix};

pub trait PerfectMatching {
    /// Pair up `vertices`, write each pair into `target` as an edge weighted
    /// from `distances`, and return the pairs.
    fn match_into(
        &self,
        target: &mut AdjacencyMatrix,
        distances: &DistanceMatrix,
        vertices: &[usize],
    ) -> Vec<(usize, usize)>;

    fn name(&self) -> &str;

    /// Name reported by a Christofides builder running this strategy.
    fn builder_name(&self) -> &str;
}

/// Nearest-unmatched-partner heuristic.
///
/// Vertices are taken in list order; each unmatched one is paired with the
/// closest other unmatched vertex of the list. No global optimality.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyMatching;

impl PerfectMatching for GreedyMatching {
    fn match_into(
        &self,
        target: &mut AdjacencyMatrix,
        distances: &DistanceMatrix,
        vertices: &[usize],
    ) -> Vec<(usize, usize)> {
        let mut matched = vec![false; vertices.len()];
        let mut pairs = Vec::with_capacity(vertices.len() / 2);

        for i in 0..vertices.len() {
            if matched[i] {
                continue;
            }
            let vertex = vertices[i];
            matched[i] = true;

            let mut best: Option<(usize, f64)> = None;
            for (j, &other) in vertices.iter().enumerate() {
                if matched[j] {
                    continue;
                }
                if let Some(w) = distances.edge(vertex, other) {
                    if best.map_or(true, |(_, bw)| w < bw) {
                        best = Some((j, w));
                    }
                }
            }

            match best {
                Some((j, w)) => {
                    matched[j] = true;
                    target.add_edge(vertex, vertices[j], w);
                    pairs.push((vertex, vertices[j]));
                }
                None => log::warn!("vertex {} left unmatched", vertex),
            }
        }

        pairs
    }

    fn name(&self) -> &str {
        "Greedy"
    }

    fn builder_name(&self) -> &str {
        "Christofides"
    }
}

/// Minimum-weight perfect matching by dynamic programming over subsets.
///
/// Runs in `O(2^k * k)` time and `O(2^k)` memory for `k` vertices, so it is
/// only used up to [`ExactMatching::max_vertices`]; larger or odd-sized sets
/// fall back to [`GreedyMatching`].
#[derive(Debug, Clone, Copy)]
pub struct ExactMatching {
    max_vertices: usize,
}

/// Largest vertex set the subset DP accepts (a 32 MiB cost table).
pub const MAX_EXACT_MATCHING_VERTICES: usize = 22;

impl ExactMatching {
    pub fn new() -> Self {
        ExactMatching { max_vertices: 20 }
    }

    /// Limits above [`MAX_EXACT_MATCHING_VERTICES`] are clamped to it.
    pub fn with_limit(max_vertices: usize) -> Self {
        ExactMatching { max_vertices: max_vertices.min(MAX_EXACT_MATCHING_VERTICES) }
    }

    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Optimal pairs as indices into `vertices`, `None` if no perfect
    /// matching exists over the present edges.
    fn solve(&self, distances: &DistanceMatrix, vertices: &[usize]) -> Option<Vec<(usize, usize)>> {
        let k = vertices.len();
        let full = (1usize << k) - 1;
        let weight = |a: usize, b: usize| distances.edge(vertices[a], vertices[b]);

        // cost[mask] = cheapest perfect matching of the vertices in `mask`
        let mut cost = vec![f64::INFINITY; 1 << k];
        cost[0] = 0.0;
        for mask in 1..=full {
            if mask.count_ones() % 2 == 1 {
                continue;
            }
            let first = mask.trailing_zeros() as usize;
            let rest = mask & !(1 << first);
            let mut best = f64::INFINITY;
            let mut bits = rest;
            while bits != 0 {
                let second = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                if let Some(w) = weight(first, second) {
                    let candidate = cost[rest & !(1 << second)] + w;
                    if candidate < best {
                        best = candidate;
                    }
                }
            }
            cost[mask] = best;
        }

        if !cost[full].is_finite() {
            return None;
        }

        let mut pairs = Vec::with_capacity(k / 2);
        let mut mask = full;
        while mask != 0 {
            let first = mask.trailing_zeros() as usize;
            let rest = mask & !(1 << first);
            let mut bits = rest;
            let mut chosen = None;
            while bits != 0 {
                let second = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                if let Some(w) = weight(first, second) {
                    let sub = rest & !(1 << second);
                    if cost[sub] + w == cost[mask] {
                        chosen = Some((second, sub));
                        break;
                    }
                }
            }
            let (second, sub) = chosen?;
            pairs.push((first, second));
            mask = sub;
        }
        Some(pairs)
    }
}

impl Default for ExactMatching {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfectMatching for ExactMatching {
    fn match_into(
        &self,
        target: &mut AdjacencyMatrix,
        distances: &DistanceMatrix,
        vertices: &[usize],
    ) -> Vec<(usize, usize)> {
        if vertices.len() % 2 == 1 || vertices.len() > self.max_vertices {
            log::info!(
                "exact matching skipped for {} vertices (limit {}), using greedy",
                vertices.len(),
                self.max_vertices
            );
            return GreedyMatching.match_into(target, distances, vertices);
        }

        let Some(pairs) = self.solve(distances, vertices) else {
            log::warn!("no perfect matching over the available edges, using greedy");
            return GreedyMatching.match_into(target, distances, vertices);
        };

        pairs
            .into_iter()
            .map(|(a, b)| {
                let (u, v) = (vertices[a], vertices[b]);
                target.add_edge(u, v, distances.weight(u, v));
                (u, v)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "Exact"
    }

    fn builder_name(&self) -> &str {
        "ChristofidesExact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::random_euclidean;

    fn matching_weight(d: &DistanceMatrix, pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(u, v)| d.weight(u, v)).sum()
    }

    fn assert_perfect(pairs: &[(usize, usize)], vertices: &[usize]) {
        let mut seen: Vec<usize> = pairs.iter().flat_map(|&(u, v)| [u, v]).collect();
        seen.sort_unstable();
        let mut expected = vertices.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_greedy_picks_nearest_in_list_order() {
        // points on a line at 0, 1, 3, 10
        let d = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 3.0, 10.0],
            vec![1.0, 0.0, 2.0, 9.0],
            vec![3.0, 2.0, 0.0, 7.0],
            vec![10.0, 9.0, 7.0, 0.0],
        ])
        .unwrap();
        let mut target = AdjacencyMatrix::new(4);

        let pairs = GreedyMatching.match_into(&mut target, &d, &[1, 2, 0, 3]);
        // 1 grabs 0 (distance 1), leaving 2 with 3
        assert_eq!(pairs, vec![(1, 0), (2, 3)]);
        assert_eq!(target.weight(0, 1), Some(1.0));
        assert_eq!(target.weight(3, 2), Some(7.0));
        assert_eq!(target.edge_count(), 2);
    }

    #[test]
    fn test_greedy_odd_set_leaves_one_vertex() {
        let d = random_euclidean(5, 2);
        let mut target = AdjacencyMatrix::new(5);
        let pairs = GreedyMatching.match_into(&mut target, &d, &[0, 1, 2]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(target.edge_count(), 1);
    }

    #[test]
    fn test_matching_doubles_existing_edge() {
        let d = random_euclidean(2, 9);
        let mut target = AdjacencyMatrix::new(2);
        target.add_edge(0, 1, d.weight(0, 1));
        GreedyMatching.match_into(&mut target, &d, &[0, 1]);
        assert_eq!(target.degree(0), 2);
        assert_eq!(target.edge_count(), 2);
    }

    #[test]
    fn test_exact_beats_or_ties_greedy() {
        for seed in 0..15 {
            let d = random_euclidean(10, seed);
            let vertices: Vec<usize> = (0..10).collect();

            let mut a = AdjacencyMatrix::new(10);
            let mut b = AdjacencyMatrix::new(10);
            let greedy = GreedyMatching.match_into(&mut a, &d, &vertices);
            let exact = ExactMatching::new().match_into(&mut b, &d, &vertices);

            assert_perfect(&greedy, &vertices);
            assert_perfect(&exact, &vertices);
            assert!(matching_weight(&d, &exact) <= matching_weight(&d, &greedy) + 1e-9);
            assert!((b.total_weight() - matching_weight(&d, &exact)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_exact_finds_optimum_where_greedy_fails() {
        // line at 0, 2, 3, 5: greedy pairs 2-3 then 0-5 (1 + 5 = 6),
        // optimum is 0-2 and 3-5 (2 + 2 = 4)
        let pos = [0.0f64, 2.0, 3.0, 5.0];
        let rows = (0..4)
            .map(|i| (0..4).map(|j| (pos[i] - pos[j]).abs()).collect())
            .collect();
        let d = DistanceMatrix::from_rows(rows).unwrap();

        let mut a = AdjacencyMatrix::new(4);
        let greedy = GreedyMatching.match_into(&mut a, &d, &[1, 2, 0, 3]);
        assert!((matching_weight(&d, &greedy) - 6.0).abs() < 1e-12);

        let mut b = AdjacencyMatrix::new(4);
        let exact = ExactMatching::new().match_into(&mut b, &d, &[1, 2, 0, 3]);
        assert!((matching_weight(&d, &exact) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_falls_back_above_limit() {
        let d = random_euclidean(8, 4);
        let vertices: Vec<usize> = (0..8).collect();
        let mut a = AdjacencyMatrix::new(8);
        let mut b = AdjacencyMatrix::new(8);
        let limited = ExactMatching::with_limit(4).match_into(&mut a, &d, &vertices);
        let greedy = GreedyMatching.match_into(&mut b, &d, &vertices);
        assert_eq!(limited, greedy);
    }

    #[test]
    fn test_exact_limit_is_clamped() {
        assert_eq!(ExactMatching::new().max_vertices(), 20);
        assert_eq!(ExactMatching::with_limit(6).max_vertices(), 6);
        assert_eq!(ExactMatching::with_limit(1000).max_vertices(), MAX_EXACT_MATCHING_VERTICES);
        assert_eq!(ExactMatching::with_limit(usize::MAX).max_vertices(), MAX_EXACT_MATCHING_VERTICES);

        // sets above the cap take the greedy path instead of allocating the DP table
        let d = random_euclidean(30, 5);
        let vertices: Vec<usize> = (0..24).collect();
        let mut a = AdjacencyMatrix::new(30);
        let mut b = AdjacencyMatrix::new(30);
        let capped = ExactMatching::with_limit(1000).match_into(&mut a, &d, &vertices);
        let greedy = GreedyMatching.match_into(&mut b, &d, &vertices);
        assert_eq!(capped, greedy);
    }
}
