use crate::geom::{AdjacencyGraph, MeshDiagnostics, ReliefClass, ReliefOptions, relief_report};
use crate::parse::off::parse_off;

const COFF_MESH: &str = "COFF
5 3 0
0 0 0 255 255 255 255
1 0 0 255 255 255 255
1 1 -0.25 255 255 255 255
0 1 0 255 255 255 255
2 2 2 255 255 255 255

4 0 1 2 3
3 1 2 0
2 0 3
";

#[test]
fn coff_mesh_loads_with_consistent_topology() {
    let mesh = parse_off(COFF_MESH).unwrap();
    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.face_count(), 3);

    let graph = AdjacencyGraph::from_mesh(&mesh);
    assert!(graph.is_symmetric());
    assert!(graph.are_adjacent(0, 1));
    assert!(graph.are_adjacent(3, 0));
    assert!(graph.are_adjacent(0, 2));
    assert!(!graph.are_adjacent(1, 3));
    assert_eq!(graph.degree(4), 0);

    let vertex_faces = mesh.vertex_face_map();
    assert_eq!(vertex_faces.faces_of(0), &[0, 1, 2]);
    assert_eq!(vertex_faces.faces_of(4), &[] as &[usize]);

    let diag = MeshDiagnostics::for_mesh(&mesh, &vertex_faces);
    assert_eq!(diag.polygon_face_count, 1);
    assert_eq!(diag.degenerate_face_count, 1);
    assert_eq!(diag.isolated_vertex_count, 1);
    assert!(diag.has_warnings());
    assert_eq!(diag.summary(), "V:5 F:3 polygons:1 degenerate:1 isolated:1");
}

#[test]
fn relief_spans_all_vertices() {
    let mesh = parse_off(COFF_MESH).unwrap();
    let report = relief_report(&mesh, &ReliefOptions::default()).unwrap();
    assert!((report.relief - 2.25).abs() < 1e-12);
    assert_eq!(report.class, ReliefClass::TallEnough);
}
