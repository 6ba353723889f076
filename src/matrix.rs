//! Dense matrix representations used by every solver.
//!
//! [`DistanceMatrix`] is the validated solver input. Each cell is an
//! `Option<f64>` so that a missing edge and a zero-length edge stay distinct.
//! [`AdjacencyMatrix`] is the working graph of the approximation pipeline
//! (spanning tree, tree plus matching); it keeps an edge multiplicity per
//! cell so parallel edges survive.

use crate::error::{Result, TspError};
use crate::instance::Point;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Square, symmetric, non-negative weight matrix with an empty diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    weights: Vec<Option<f64>>,
}

impl DistanceMatrix {
    /// Build from dense rows. An off-diagonal `0.0` means "no edge".
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let options = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(j, w)| if i != j && w == 0.0 { None } else { Some(w) })
                    .collect()
            })
            .collect();
        Self::from_options(options)
    }

    /// Build from explicit optional weights. `Some(0.0)` is a real edge.
    pub fn from_options(rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(TspError::EmptyMatrix);
        }

        let mut weights = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(TspError::NotSquare { row: i, len: row.len(), expected: n });
            }
            for (j, cell) in row.into_iter().enumerate() {
                if let Some(w) = cell {
                    if !w.is_finite() {
                        return Err(TspError::NonFiniteWeight { from: i, to: j });
                    }
                    if w < 0.0 {
                        return Err(TspError::NegativeWeight { from: i, to: j, weight: w });
                    }
                    if i == j && w != 0.0 {
                        return Err(TspError::NonZeroDiagonal { vertex: i, weight: w });
                    }
                }
                weights.push(if i == j { None } else { cell });
            }
        }

        let matrix = DistanceMatrix { n, weights };
        matrix.check_symmetry()?;
        Ok(matrix)
    }

    /// Euclidean distances between points; every pair is connected.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let n = points.len();
        if n == 0 {
            return Err(TspError::EmptyMatrix);
        }

        let mut weights = vec![None; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance(&points[j]);
                if !d.is_finite() {
                    return Err(TspError::NonFiniteWeight { from: i, to: j });
                }
                weights[i * n + j] = Some(d);
                weights[j * n + i] = Some(d);
            }
        }

        Ok(DistanceMatrix { n, weights })
    }

    fn check_symmetry(&self) -> Result<()> {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let forward = self.edge(i, j);
                let backward = self.edge(j, i);
                let symmetric = match (forward, backward) {
                    (None, None) => true,
                    (Some(a), Some(b)) => {
                        (a - b).abs() <= SYMMETRY_TOLERANCE * a.abs().max(b.abs()).max(1.0)
                    }
                    _ => false,
                };
                if !symmetric {
                    return Err(TspError::Asymmetric { from: i, to: j, forward, backward });
                }
            }
        }
        Ok(())
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always false for a constructed matrix.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Weight of the edge between `i` and `j`, `None` if absent or `i == j`.
    #[inline]
    pub fn edge(&self, i: usize, j: usize) -> Option<f64> {
        self.weights[i * self.n + j]
    }

    /// Edge weight, or infinity when the edge does not exist.
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.edge(i, j).unwrap_or(f64::INFINITY)
    }

    /// Neighbours of `v` with their weights, in ascending index order.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.weights[v * self.n..(v + 1) * self.n]
            .iter()
            .enumerate()
            .filter_map(|(j, w)| w.map(|w| (j, w)))
    }

    /// Number of edges incident to `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.neighbors(v).count()
    }

    /// Dense rows with absent edges written as `0.0`.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n)
            .map(|i| (0..self.n).map(|j| self.edge(i, j).unwrap_or(0.0)).collect())
            .collect()
    }
}

/// One cell of an [`AdjacencyMatrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub weight: f64,
    pub multiplicity: u32,
}

/// Undirected multigraph over `n` vertices stored as a dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    n: usize,
    cells: Vec<Option<Edge>>,
}

impl AdjacencyMatrix {
    /// Graph with `n` isolated vertices.
    pub fn new(n: usize) -> Self {
        AdjacencyMatrix { n, cells: vec![None; n * n] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn edge(&self, u: usize, v: usize) -> Option<Edge> {
        self.cells[u * self.n + v]
    }

    #[inline]
    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        self.edge(u, v).map(|e| e.weight)
    }

    /// Add one copy of the edge `{u, v}`. Adding an existing edge raises its
    /// multiplicity and keeps the first weight.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) {
        debug_assert!(u != v, "self-loops are not supported");
        for idx in [u * self.n + v, v * self.n + u] {
            let cell = &mut self.cells[idx];
            match cell {
                Some(edge) => edge.multiplicity += 1,
                None => *cell = Some(Edge { weight, multiplicity: 1 }),
            }
        }
    }

    /// Remove one copy of the edge `{u, v}`, returning its weight.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> Option<f64> {
        let weight = self.weight(u, v)?;
        for idx in [u * self.n + v, v * self.n + u] {
            let remaining = match &mut self.cells[idx] {
                Some(edge) => {
                    edge.multiplicity -= 1;
                    edge.multiplicity
                }
                None => continue,
            };
            if remaining == 0 {
                self.cells[idx] = None;
            }
        }
        Some(weight)
    }

    #[inline]
    pub fn has_edges(&self, v: usize) -> bool {
        self.row(v).iter().any(Option::is_some)
    }

    /// Degree of `v`, counting parallel edges.
    pub fn degree(&self, v: usize) -> u32 {
        self.row(v).iter().flatten().map(|e| e.multiplicity).sum()
    }

    /// Distinct neighbours of `v` in ascending index order.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(v)
            .iter()
            .enumerate()
            .filter_map(|(j, e)| e.map(|_| j))
    }

    /// Number of edges, counting parallel edges.
    pub fn edge_count(&self) -> usize {
        (0..self.n)
            .flat_map(|u| ((u + 1)..self.n).map(move |v| (u, v)))
            .filter_map(|(u, v)| self.edge(u, v))
            .map(|e| e.multiplicity as usize)
            .sum()
    }

    /// Sum of edge weights, counting parallel edges.
    pub fn total_weight(&self) -> f64 {
        (0..self.n)
            .flat_map(|u| ((u + 1)..self.n).map(move |v| (u, v)))
            .filter_map(|(u, v)| self.edge(u, v))
            .map(|e| e.weight * e.multiplicity as f64)
            .sum()
    }

    /// Vertices of odd degree, ascending.
    pub fn odd_degree_vertices(&self) -> Vec<usize> {
        (0..self.n).filter(|&v| self.degree(v) % 2 == 1).collect()
    }

    fn row(&self, v: usize) -> &[Option<Edge>] {
        &self.cells[v * self.n..(v + 1) * self.n]
    }
}
