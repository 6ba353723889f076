//! Hierholzer's algorithm over an [`AdjacencyMatrix`] multigraph.

use crate::matrix::AdjacencyMatrix;

/// Extract an Eulerian circuit starting and ending at vertex 0.
///
/// Edges are consumed from `graph` as they are walked, lowest-index
/// neighbour first, so the graph is empty afterwards. The caller guarantees
/// that every vertex has even degree and that all edges are reachable from
/// vertex 0; otherwise the returned walk misses edges.
///
/// The returned sequence has `edge_count + 1` entries.
pub fn eulerian_tour(graph: &mut AdjacencyMatrix) -> Vec<usize> {
    let n = graph.len();
    if n == 0 {
        return Vec::new();
    }

    // Edges are only ever removed, so the lowest remaining neighbour of a
    // vertex never moves left; each row is scanned once overall.
    let mut cursor = vec![0usize; n];
    let mut next_edge = |graph: &AdjacencyMatrix, v: usize| -> Option<usize> {
        while cursor[v] < n {
            if graph.edge(v, cursor[v]).is_some() {
                return Some(cursor[v]);
            }
            cursor[v] += 1;
        }
        None
    };

    let mut tour = Vec::new();
    let mut stack = Vec::new();
    let mut vertex = 0;

    loop {
        match next_edge(graph, vertex) {
            Some(neighbor) => {
                stack.push(vertex);
                graph.remove_edge(vertex, neighbor);
                vertex = neighbor;
            }
            None => {
                tour.push(vertex);
                match stack.pop() {
                    Some(previous) => vertex = previous,
                    None => break,
                }
            }
        }
    }

    tour
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn edge_multiset(graph: &AdjacencyMatrix) -> HashMap<(usize, usize), u32> {
        let mut edges = HashMap::new();
        for u in 0..graph.len() {
            for v in graph.neighbors(u).filter(|&v| v > u) {
                edges.insert((u, v), graph.edge(u, v).map_or(0, |e| e.multiplicity));
            }
        }
        edges
    }

    fn assert_eulerian(graph: AdjacencyMatrix) {
        let mut edges = edge_multiset(&graph);
        let edge_count = graph.edge_count();
        let mut work = graph;

        let tour = eulerian_tour(&mut work);

        assert_eq!(tour.len(), edge_count + 1);
        assert_eq!(tour.first(), Some(&0));
        assert_eq!(tour.last(), Some(&0));
        assert_eq!(work.edge_count(), 0);

        for pair in tour.windows(2) {
            let key = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            let remaining = edges.get_mut(&key).expect("walk used a non-edge");
            assert!(*remaining > 0, "edge {:?} used too often", key);
            *remaining -= 1;
        }
        assert!(edges.values().all(|&m| m == 0));
    }

    #[test]
    fn test_two_triangles_sharing_a_vertex() {
        let mut g = AdjacencyMatrix::new(5);
        for (u, v) in [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)] {
            g.add_edge(u, v, 1.0);
        }
        assert_eulerian(g);
    }

    #[test]
    fn test_parallel_edges_are_walked_twice() {
        // tree 0-1-2 with both edges doubled
        let mut g = AdjacencyMatrix::new(3);
        for (u, v) in [(0, 1), (0, 1), (1, 2), (2, 1)] {
            g.add_edge(u, v, 2.0);
        }
        let mut work = g.clone();
        assert_eq!(eulerian_tour(&mut work), vec![0, 1, 2, 1, 0]);
        assert_eulerian(g);
    }

    #[test]
    fn test_complete_graph_on_five_vertices() {
        let mut g = AdjacencyMatrix::new(5);
        for u in 0..5 {
            for v in (u + 1)..5 {
                g.add_edge(u, v, (u + v) as f64);
            }
        }
        assert_eulerian(g);
    }

    #[test]
    fn test_no_edges() {
        let mut g = AdjacencyMatrix::new(3);
        assert_eq!(eulerian_tour(&mut g), vec![0]);
    }
}
