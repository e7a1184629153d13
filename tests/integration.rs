use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crown_engine::batch::{DEFAULT_PATTERN, run_cusp_batch};
use crown_engine::cusp::UndefinedAngle;
use crown_engine::geom::CrownMesh;
use crown_engine::parse::off::parse_off;
use crown_engine::report::{
    ANGLES_FILE, COMBINED_HEADER, FAILS_FILE, FULL_BATCH_FILE, SUMMARY_HEADER, combine_opc,
};
use crown_engine::{AnalysisConfig, analyze_file, analyze_mesh};

fn off_text(vertices: &[[f64; 3]], faces: &[Vec<usize>]) -> String {
    let mut out = format!("OFF\n{} {} 0\n", vertices.len(), faces.len());
    for [x, y, z] in vertices {
        let _ = writeln!(out, "{x} {y} {z}");
    }
    for face in faces {
        let indices: Vec<String> = face.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "{} {}", face.len(), indices.join(" "));
    }
    out
}

fn flat_triangle() -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
    (
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![vec![0, 1, 2]],
    )
}

/// Two raised fans stacked in y; the peaks sit at x = 0.45 and `second_x`.
fn two_peaks(second_x: f64) -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
    let vertices = vec![
        [0.45, 0.0, -1.0],
        [0.0, -0.5, 0.0],
        [1.0, -0.5, 0.0],
        [1.0, 0.5, 0.0],
        [0.0, 0.5, 0.0],
        [second_x, 1.0, -1.0],
        [1.0, 1.5, 0.0],
        [0.0, 1.5, 0.0],
    ];
    let faces = vec![
        vec![0, 1, 2],
        vec![0, 2, 3],
        vec![0, 3, 4],
        vec![0, 4, 1],
        vec![5, 4, 3],
        vec![5, 3, 6],
        vec![5, 6, 7],
        vec![5, 7, 4],
    ];
    (vertices, faces)
}

/// Three raised fans in a row along x. The middle peak is closest to the
/// origin; the outer peaks sit higher, which breaks the inhibitory cascade.
fn three_peaks() -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
    let mut vertices = Vec::new();
    for y in [-0.5, 0.5] {
        for i in 0..4 {
            vertices.push([-1.5 + f64::from(i), y, 0.0]);
        }
    }
    vertices.extend([[-1.0, 0.0, -2.0], [0.0, 0.0, -1.0], [1.0, 0.0, -2.0]]);

    let mut faces = Vec::new();
    for k in 0..3 {
        let (c, a, b, d, e) = (8 + k, k, k + 1, 5 + k, 4 + k);
        faces.extend([vec![c, a, b], vec![c, b, d], vec![c, d, e], vec![c, e, a]]);
    }
    (vertices, faces)
}

fn mesh_of((vertices, faces): (Vec<[f64; 3]>, Vec<Vec<usize>>)) -> CrownMesh {
    CrownMesh::from_buffers(&vertices, &faces).expect("valid mesh")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("crown_engine_it_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn flat_triangle_has_no_cusps() {
    let analysis = analyze_mesh(&mesh_of(flat_triangle()), &AnalysisConfig::default());
    assert!(analysis.cusps.is_empty());
    assert_eq!(analysis.detection.boundary_excluded, 3);
    assert_eq!(analysis.report.cusp_count, 0);
    assert_eq!(analysis.report.angle, Err(UndefinedAngle::NoCusps));
    assert_eq!(analysis.report.real_cusp_count, 0);
    assert!(analysis.report.cascade.passes());
}

#[test]
fn close_peaks_form_one_real_cusp() {
    let config = AnalysisConfig::default();

    let close = analyze_mesh(&mesh_of(two_peaks(0.5)), &config);
    assert_eq!(close.report.cusp_count, 2);
    assert_eq!(close.report.real_cusp_count, 1);

    let apart = analyze_mesh(&mesh_of(two_peaks(0.65)), &config);
    assert_eq!(apart.report.cusp_count, 2);
    assert_eq!(apart.report.real_cusp_count, 2);
    assert_eq!(apart.report.principal, Some(0));
    assert_eq!(apart.report.angle, Err(UndefinedAngle::NoLeftNeighbor));
    assert!(apart.report.cascade.passes());
}

#[test]
fn three_peaks_have_right_angle_and_fail_cascade() {
    let analysis = analyze_mesh(&mesh_of(three_peaks()), &AnalysisConfig::default());
    let vertices: Vec<usize> = analysis.cusps.iter().map(|c| c.vertex).collect();
    assert_eq!(vertices, vec![8, 9, 10]);

    let angle = analysis.report.angle().expect("defined angle");
    assert_eq!(angle.radians, 1.571);
    assert_eq!(angle.degrees, 90.0);
    assert_eq!(analysis.report.real_cusp_count, 3);
    assert!(!analysis.report.cascade.passes());
}

#[test]
fn parsed_file_matches_in_memory_mesh() {
    let (vertices, faces) = three_peaks();
    let parsed = parse_off(&off_text(&vertices, &faces)).expect("parse");
    assert_eq!(parsed, mesh_of((vertices, faces)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = analyze_file("/definitely/not/here.off", &AnalysisConfig::default()).unwrap_err();
    assert!(!err.is_format_error());
    assert!(!err.is_index_error());
}

#[test]
fn batch_writes_result_tables() {
    let dir = scratch_dir("batch");
    let write = |name: &str, (v, f): (Vec<[f64; 3]>, Vec<Vec<usize>>)| {
        fs::write(dir.join(name), off_text(&v, &f)).expect("write mesh");
    };
    write("run9_flat.off", flat_triangle());
    write("run9_pair.off", two_peaks(0.5));
    write("run9_three.off", three_peaks());
    fs::write(dir.join("broken.off"), "OFF\n3 1 0\n0 0 0\n").expect("write broken mesh");

    let summary = run_cusp_batch(&dir, DEFAULT_PATTERN, &AnalysisConfig::default(), None).expect("batch");
    assert_eq!(summary.rows.len(), 3);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].path.ends_with("broken.off"));

    let results = dir.join("z_batch_results");
    assert_eq!(summary.results_dir, results);
    let read = |name: &str| fs::read_to_string(results.join(name)).expect("read table");

    let flat = "flat\t\t\t\t0\t";
    let pair = "pair\t\t\t\t1\t";
    let three = "three\t1.571\t90.0\t\t3\tFAILS";
    assert_eq!(
        read(FULL_BATCH_FILE),
        format!("{SUMMARY_HEADER}\n{flat}\n{pair}\n{three}\n")
    );
    assert_eq!(read(ANGLES_FILE), format!("{SUMMARY_HEADER}\n{three}\n"));
    assert_eq!(read(FAILS_FILE), format!("{SUMMARY_HEADER}\n{three}\n"));
    assert_eq!(read("0_cusp.txt"), format!("{SUMMARY_HEADER}\n{flat}\n"));
    assert_eq!(read("1_cusp.txt"), format!("{SUMMARY_HEADER}\n{pair}\n"));
    assert_eq!(read("3_cusp.txt"), format!("{SUMMARY_HEADER}\n{three}\n"));
    assert!(!results.join("2_cusp.txt").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn combine_joins_batch_output_with_opc_table() {
    let cusps = format!("{SUMMARY_HEADER}\n101\t1.571\t90.0\t\t3\tFAILS\n102\t\t\t\t1\t\n");
    let opc = "Filename,OPC Value\nsim_9000_102_opc.csv,55.25\n";
    let combined = combine_opc(opc, &cusps).expect("combine");
    assert_eq!(combined, format!("{COMBINED_HEADER}\n102\t\t\t\t1\t\t55.25\n"));
}
