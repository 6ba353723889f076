//! Helpers shared by the unit tests: seeded instances and brute-force
//! references for small inputs.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::instance::Point;
use crate::matrix::DistanceMatrix;

pub(crate) fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect()
}

/// Complete Euclidean matrix over seeded random points.
pub(crate) fn random_euclidean(n: usize, seed: u64) -> DistanceMatrix {
    DistanceMatrix::from_points(&random_points(n, seed)).unwrap()
}

/// Optimal tour weight by enumerating every tour that starts at 0.
pub(crate) fn brute_force_optimum(d: &DistanceMatrix) -> f64 {
    fn extend(d: &DistanceMatrix, path: &mut Vec<usize>, used: &mut [bool], cost: f64, best: &mut f64) {
        let last = *path.last().unwrap();
        if path.len() == d.len() {
            if let Some(w) = d.edge(last, 0) {
                *best = best.min(cost + w);
            }
            return;
        }
        for next in 1..d.len() {
            if used[next] {
                continue;
            }
            if let Some(w) = d.edge(last, next) {
                used[next] = true;
                path.push(next);
                extend(d, path, used, cost + w, best);
                path.pop();
                used[next] = false;
            }
        }
    }

    if d.len() == 1 {
        return 0.0;
    }
    let mut best = f64::INFINITY;
    let mut used = vec![false; d.len()];
    used[0] = true;
    extend(d, &mut vec![0], &mut used, 0.0, &mut best);
    best
}

/// Minimum spanning tree weight by trying every `n - 1` edge subset.
pub(crate) fn brute_force_mst_weight(d: &DistanceMatrix) -> f64 {
    let n = d.len();
    let edges: Vec<(usize, usize, f64)> = (0..n)
        .flat_map(|u| d.neighbors(u).filter(move |&(v, _)| v > u).map(move |(v, w)| (u, v, w)))
        .collect();

    fn find(parent: &[usize], x: usize) -> usize {
        let mut root = x;
        while parent[root] != root {
            root = parent[root];
        }
        root
    }

    let mut best = f64::INFINITY;
    for mask in 0u32..(1 << edges.len()) {
        if mask.count_ones() as usize != n - 1 {
            continue;
        }
        let mut parent: Vec<usize> = (0..n).collect();
        let mut weight = 0.0;
        let mut acyclic = true;
        for (i, &(u, v, w)) in edges.iter().enumerate() {
            if mask & (1 << i) == 0 {
                continue;
            }
            let (ru, rv) = (find(&parent, u), find(&parent, v));
            if ru == rv {
                acyclic = false;
                break;
            }
            parent[ru] = rv;
            weight += w;
        }
        if acyclic {
            best = best.min(weight);
        }
    }
    best
}

/// Panics unless `tour` is a closed cycle visiting each of `0..n` once.
pub(crate) fn assert_hamiltonian(tour: &[usize], n: usize) {
    assert_eq!(tour.len(), n + 1, "tour {:?} has wrong length", tour);
    assert_eq!(tour.first(), tour.last(), "tour {:?} is not closed", tour);
    let mut seen = vec![false; n];
    for &v in &tour[..n] {
        assert!(v < n, "vertex {} out of range", v);
        assert!(!seen[v], "vertex {} visited twice in {:?}", v, tour);
        seen[v] = true;
    }
}
