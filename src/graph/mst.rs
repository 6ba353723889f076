//! Prim's minimum spanning tree over a [`DistanceMatrix`].

use crate::matrix::{AdjacencyMatrix, DistanceMatrix};
use crate::queue::MinQueue;

/// Lazy Prim's algorithm rooted at vertex 0.
///
/// The queue holds `(weight, (vertex, parent))` candidates and may carry
/// stale entries for vertices that were reached through a cheaper edge in the
/// meantime; those are skipped when popped. If the graph is disconnected the
/// tree spans only the component of vertex 0 and the other vertices stay
/// isolated.
pub fn minimum_spanning_tree(distances: &DistanceMatrix) -> AdjacencyMatrix {
    let n = distances.len();
    let mut tree = AdjacencyMatrix::new(n);
    if n == 0 {
        return tree;
    }

    let mut visited = vec![false; n];
    let mut reached = 0usize;
    let mut queue: MinQueue<(usize, Option<usize>)> = MinQueue::with_capacity(n);
    queue.push(0.0, (0, None));

    while let Some((weight, (vertex, parent))) = queue.pop_min() {
        if visited[vertex] {
            continue;
        }
        visited[vertex] = true;
        reached += 1;

        if let Some(parent) = parent {
            tree.add_edge(parent, vertex, weight);
        }

        for (neighbor, w) in distances.neighbors(vertex) {
            if !visited[neighbor] {
                queue.push(w, (neighbor, Some(vertex)));
            }
        }
    }

    if reached < n {
        log::warn!(
            "graph is disconnected: spanning tree reaches {} of {} vertices",
            reached,
            n
        );
    }

    tree
}
