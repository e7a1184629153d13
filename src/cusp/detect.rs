//! Cusp detection: local maxima of the crown height field.
//!
//! A vertex is a cusp when all of the following hold:
//!
//! 1. its x coordinate is neither the global minimum nor maximum x,
//! 2. no neighbour is higher by `tie_tolerance` or more,
//! 3. it has more than two neighbours,
//! 4. its largest height difference to any neighbour exceeds `saliency_threshold`.
//!
//! Height is `-z`. Rules are applied in this order and each rejected vertex is
//! counted once, under the first rule it fails.

use serde::{Deserialize, Serialize};

use crate::geom::{AdjacencyGraph, CrownMesh, Point3, Tolerance};

/// Parameters of the local-maximum search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuspOptions {
    /// Minimum height contrast against the most different neighbour.
    pub saliency_threshold: f64,
    /// Neighbour heights closer than this count as ties.
    pub tie_tolerance: f64,
}

impl Default for CuspOptions {
    fn default() -> Self {
        Self {
            saliency_threshold: 0.5,
            tie_tolerance: Tolerance::HEIGHT_TIE.eps,
        }
    }
}

impl CuspOptions {
    #[must_use]
    pub fn with_saliency(saliency_threshold: f64) -> Self {
        Self {
            saliency_threshold,
            ..Default::default()
        }
    }
}

/// A detected cusp: the vertex index and its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cusp {
    pub vertex: usize,
    pub position: Point3,
}

/// Counts of vertices rejected by each detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DetectionDiagnostics {
    pub vertex_count: usize,
    pub boundary_excluded: usize,
    pub higher_neighbor: usize,
    pub low_degree: usize,
    pub low_saliency: usize,
    pub cusp_count: usize,
}

/// Positions of `cusps`, in the same order.
#[must_use]
pub fn cusp_positions(cusps: &[Cusp]) -> Vec<Point3> {
    cusps.iter().map(|c| c.position).collect()
}

/// Finds cusps of `mesh` in vertex order.
#[must_use]
pub fn detect_cusps(mesh: &CrownMesh, graph: &AdjacencyGraph, options: &CuspOptions) -> Vec<Cusp> {
    detect_cusps_with_diagnostics(mesh, graph, options).0
}

/// Finds cusps and reports how many vertices each rule rejected.
#[must_use]
pub fn detect_cusps_with_diagnostics(
    mesh: &CrownMesh,
    graph: &AdjacencyGraph,
    options: &CuspOptions,
) -> (Vec<Cusp>, DetectionDiagnostics) {
    let mut diag = DetectionDiagnostics {
        vertex_count: mesh.vertex_count(),
        ..Default::default()
    };
    let Some((min_x, max_x)) = mesh.x_extent() else {
        return (Vec::new(), diag);
    };

    let heights = mesh.heights();
    let mut cusps = Vec::new();

    for (vertex, &position) in mesh.vertices().iter().enumerate() {
        #[allow(clippy::float_cmp)]
        if position.x == min_x || position.x == max_x {
            diag.boundary_excluded += 1;
            continue;
        }

        let height = heights[vertex];
        if !is_local_maximum(graph, &heights, vertex, options.tie_tolerance) {
            diag.higher_neighbor += 1;
            continue;
        }

        if graph.degree(vertex) <= 2 {
            diag.low_degree += 1;
            continue;
        }

        let contrast = graph
            .neighbors(vertex)
            .map(|n| (height - heights[n]).abs())
            .fold(0.0_f64, f64::max);
        if contrast <= options.saliency_threshold {
            diag.low_saliency += 1;
            continue;
        }

        cusps.push(Cusp { vertex, position });
    }

    diag.cusp_count = cusps.len();
    log::debug!(
        "cusp detection: {} cusps from {} vertices (boundary {}, higher neighbour {}, degree {}, saliency {})",
        diag.cusp_count,
        diag.vertex_count,
        diag.boundary_excluded,
        diag.higher_neighbor,
        diag.low_degree,
        diag.low_saliency
    );
    (cusps, diag)
}

/// No neighbour may exceed the vertex height by `tie_tolerance` or more.
fn is_local_maximum(graph: &AdjacencyGraph, heights: &[f64], vertex: usize, tie_tolerance: f64) -> bool {
    let height = heights[vertex];
    graph.neighbors(vertex).all(|n| {
        let neighbor = heights[n];
        (neighbor - height).abs() < tie_tolerance || neighbor <= height
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A square fan around a raised centre vertex.
    ///
    /// Vertex 0 sits at (0.5, 0.5) with height `peak`; vertices 1..=4 are the
    /// square corners at height 0, so only the centre is inside the x range.
    fn fan(peak: f64) -> CrownMesh {
        let vertices = [
            [0.5, 0.5, -peak],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let faces = [vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4], vec![0, 4, 1]];
        CrownMesh::from_buffers(&vertices, &faces).unwrap()
    }

    #[test]
    fn raised_centre_is_a_cusp() {
        let mesh = fan(1.0);
        let graph = AdjacencyGraph::from_mesh(&mesh);
        let (cusps, diag) = detect_cusps_with_diagnostics(&mesh, &graph, &CuspOptions::default());

        assert_eq!(cusps.len(), 1);
        assert_eq!(cusps[0].vertex, 0);
        assert_eq!(cusps[0].position, Point3::new(0.5, 0.5, -1.0));
        assert_eq!(diag.boundary_excluded, 4);
        assert_eq!(diag.cusp_count, 1);
    }

    #[test]
    fn low_peak_fails_saliency() {
        let mesh = fan(0.5);
        let graph = AdjacencyGraph::from_mesh(&mesh);
        let (cusps, diag) = detect_cusps_with_diagnostics(&mesh, &graph, &CuspOptions::default());

        assert!(cusps.is_empty());
        assert_eq!(diag.low_saliency, 1);
        assert_eq!(detect_cusps(&mesh, &graph, &CuspOptions::with_saliency(0.4)).len(), 1);
    }

    #[test]
    fn sunken_centre_is_not_a_maximum() {
        let mesh = fan(-1.0);
        let graph = AdjacencyGraph::from_mesh(&mesh);
        let (cusps, diag) = detect_cusps_with_diagnostics(&mesh, &graph, &CuspOptions::default());

        assert!(cusps.is_empty());
        assert_eq!(diag.higher_neighbor, 1);
    }

    #[test]
    fn near_ties_do_not_disqualify() {
        // Vertex 1 is higher than vertex 0 by less than the tie tolerance.
        let vertices = [
            [0.5, 0.5, -1.0],
            [0.5, 0.6, -1.00005],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.5, 1.0, 0.0],
        ];
        let faces = [vec![0, 2, 3], vec![0, 3, 1], vec![0, 1, 4], vec![0, 4, 2]];
        let mesh = CrownMesh::from_buffers(&vertices, &faces).unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh);

        let cusps = detect_cusps(&mesh, &graph, &CuspOptions::default());
        let found: Vec<usize> = cusps.iter().map(|c| c.vertex).collect();
        assert!(found.contains(&0));
    }

    #[test]
    fn degree_two_vertices_are_excluded() {
        // Vertex 1 is the highest point but only touches one triangle.
        let mesh =
            CrownMesh::from_buffers(&[[0.0, 0.0, 0.0], [0.5, 1.0, -3.0], [1.0, 0.0, 0.0]], &[vec![0, 1, 2]])
                .unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh);
        let (cusps, diag) = detect_cusps_with_diagnostics(&mesh, &graph, &CuspOptions::default());

        assert!(cusps.is_empty());
        assert_eq!(diag.low_degree, 1);
    }

    #[test]
    fn empty_mesh_has_no_cusps() {
        let mesh = CrownMesh::default();
        let graph = AdjacencyGraph::from_mesh(&mesh);
        assert!(detect_cusps(&mesh, &graph, &CuspOptions::default()).is_empty());
    }
}
