//! Vertex adjacency derived from face loops.
//!
//! Every face contributes an undirected edge between each pair of consecutive
//! loop vertices, including the closing edge from the last vertex back to the
//! first. Neighbour sets are kept per vertex index, so the graph needs no
//! pointers and stays trivially shareable.

use std::collections::BTreeSet;

use super::mesh::CrownMesh;

/// Symmetric vertex → neighbour-set mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdjacencyGraph {
    neighbors: Vec<BTreeSet<usize>>,
}

impl AdjacencyGraph {
    /// Builds the graph from the face loops of `mesh`.
    ///
    /// A face that repeats a vertex links that vertex to itself; such
    /// self-links never disqualify a maximum because their height
    /// difference is zero.
    #[must_use]
    pub fn from_mesh(mesh: &CrownMesh) -> Self {
        let mut neighbors = vec![BTreeSet::new(); mesh.vertex_count()];
        for face in mesh.faces() {
            for (prev, current, next) in face.loop_triples() {
                neighbors[current].insert(prev);
                neighbors[current].insert(next);
            }
        }
        log::debug!(
            "adjacency built for {} vertices from {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        Self { neighbors }
    }

    /// Neighbours of `vertex`; empty for vertices outside every face.
    pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors.get(vertex).into_iter().flatten().copied()
    }

    #[must_use]
    pub fn degree(&self, vertex: usize) -> usize {
        self.neighbors.get(vertex).map_or(0, BTreeSet::len)
    }

    #[must_use]
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors.get(a).is_some_and(|set| set.contains(&b))
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Total number of undirected edges (self-links count once).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let mut directed = 0;
        let mut loops = 0;
        for (v, set) in self.neighbors.iter().enumerate() {
            directed += set.len();
            if set.contains(&v) {
                loops += 1;
            }
        }
        (directed - loops) / 2 + loops
    }

    /// Returns true if every edge is present in both directions.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.neighbors
            .iter()
            .enumerate()
            .all(|(v, set)| set.iter().all(|&n| self.are_adjacent(n, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_loop_links_consecutive_vertices_only() {
        let mesh = CrownMesh::from_buffers(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            &[vec![0, 1, 2, 3]],
        )
        .unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh);

        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![1, 3]);
        assert!(!graph.are_adjacent(0, 2));
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn shared_edges_merge_into_sets() {
        let mesh = CrownMesh::from_buffers(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            &[vec![0, 1, 2], vec![1, 3, 2]],
        )
        .unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh);

        assert_eq!(graph.degree(1), 3);
        assert_eq!(graph.degree(2), 3);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.edge_count(), 5);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn vertices_without_faces_have_no_neighbors() {
        let mesh = CrownMesh::from_buffers(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [9.0, 9.0, 9.0]],
            &[vec![0, 1, 2]],
        )
        .unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh);

        assert_eq!(graph.degree(3), 0);
        assert_eq!(graph.neighbors(3).count(), 0);
        assert_eq!(graph.degree(42), 0);
    }

    #[test]
    fn repeated_vertex_creates_self_link() {
        let mesh = CrownMesh::from_buffers(&[[0.0; 3], [1.0, 0.0, 0.0]], &[vec![0, 0, 1]]).unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh);

        assert!(graph.are_adjacent(0, 0));
        assert!(graph.are_adjacent(0, 1));
        assert!(graph.is_symmetric());
        assert_eq!(graph.edge_count(), 2);
    }
}
