//! Depth-first preorder walk over a tree stored as an [`AdjacencyMatrix`].

use crate::matrix::AdjacencyMatrix;

/// Preorder walk starting at vertex 0, using an explicit stack.
///
/// Neighbours are pushed in ascending index order, so the highest-index child
/// is visited first and the order is fixed for a given tree. When the stack
/// runs dry before every vertex was seen (a forest), the walk restarts from
/// the lowest unvisited vertex; the result always lists all `n` vertices once.
pub fn preorder_walk(tree: &AdjacencyMatrix) -> Vec<usize> {
    let n = tree.len();
    let mut visited = vec![false; n];
    let mut walk = Vec::with_capacity(n);
    let mut stack = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        if root != 0 {
            log::debug!("preorder walk restarts at unreachable vertex {}", root);
        }

        stack.push(root);
        while let Some(vertex) = stack.pop() {
            if visited[vertex] {
                continue;
            }
            visited[vertex] = true;
            walk.push(vertex);

            stack.extend(tree.neighbors(vertex).filter(|&nb| !visited[nb]));
        }
    }

    walk
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(n: usize, edges: &[(usize, usize)]) -> AdjacencyMatrix {
        let mut t = AdjacencyMatrix::new(n);
        for &(u, v) in edges {
            t.add_edge(u, v, 1.0);
        }
        t
    }

    #[test]
    fn test_preorder_visits_highest_child_first() {
        //      0
        //    / | \
        //   1  2  3
        //  / \
        // 4   5
        let t = tree(6, &[(0, 1), (0, 2), (0, 3), (1, 4), (1, 5)]);
        assert_eq!(preorder_walk(&t), vec![0, 3, 2, 1, 5, 4]);
    }

    #[test]
    fn test_path_graph() {
        let t = tree(4, &[(0, 2), (2, 1), (1, 3)]);
        assert_eq!(preorder_walk(&t), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_forest_still_covers_every_vertex() {
        let t = tree(5, &[(0, 3), (1, 4)]);
        assert_eq!(preorder_walk(&t), vec![0, 3, 1, 4, 2]);
    }

    #[test]
    fn test_long_chain() {
        let n = 1_000;
        let mut t = AdjacencyMatrix::new(n);
        for v in 1..n {
            t.add_edge(v - 1, v, 1.0);
        }
        assert_eq!(preorder_walk(&t), (0..n).collect::<Vec<_>>());
    }
}
