#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Cusp analysis of simulated dental crowns.
//!
//! A crown is read from an OFF mesh, its cusps are found as salient local
//! maxima of the height field (`-z`), and the cusp set is summarized by the
//! apex angle at the principal cusp, the number of real (x-clustered) cusps
//! and the inhibitory-cascade height check.

pub mod batch;
pub mod cusp;
pub mod geom;
pub mod parse;
pub mod report;

use std::path::Path;

use serde::{Deserialize, Serialize};

use cusp::{AnalysisOptions, Cusp, CuspOptions, CuspReport, DetectionDiagnostics};
use geom::{
    AdjacencyGraph, AnalysisMetrics, CrownMesh, MeshDiagnostics, MeshNormals, ReliefOptions,
    ReliefReport, TimingBucket, TimingReport,
};
use parse::ParseResult;

/// All tunable parameters of one tooth analysis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub cusp: CuspOptions,
    pub analysis: AnalysisOptions,
    pub relief: ReliefOptions,
}

/// Result of analyzing one crown mesh.
#[derive(Debug, Clone, Serialize)]
pub struct ToothAnalysis {
    pub cusps: Vec<Cusp>,
    pub detection: DetectionDiagnostics,
    pub report: CuspReport,
    /// `None` for a mesh without vertices.
    pub relief: Option<ReliefReport>,
    /// Only populated with the `analysis_metrics` feature.
    pub timing: Option<TimingReport>,
}

/// Detects and analyzes the cusps of an already loaded mesh.
#[must_use]
pub fn analyze_mesh(mesh: &CrownMesh, config: &AnalysisConfig) -> ToothAnalysis {
    let mut metrics = AnalysisMetrics::default();
    metrics.begin();
    let analysis = run_pipeline(mesh, config, &mut metrics);
    ToothAnalysis {
        timing: metrics.end(),
        ..analysis
    }
}

/// Loads an OFF file and analyzes it.
pub fn analyze_file(path: impl AsRef<Path>, config: &AnalysisConfig) -> ParseResult<ToothAnalysis> {
    let path = path.as_ref();
    let mut metrics = AnalysisMetrics::default();
    metrics.begin();

    let mesh = metrics.time(TimingBucket::Load, || parse::off::load_off(path))?;
    log::debug!(
        "{}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );

    let analysis = run_pipeline(&mesh, config, &mut metrics);
    Ok(ToothAnalysis {
        timing: metrics.end(),
        ..analysis
    })
}

/// Outward-oriented normals of one mesh file.
#[derive(Debug, Clone)]
pub struct NormalsAnalysis {
    pub normals: MeshNormals,
    pub diagnostics: MeshDiagnostics,
    /// Only populated with the `analysis_metrics` feature.
    pub timing: Option<TimingReport>,
}

/// Loads an OFF file and computes its face and vertex normals.
pub fn normals_for_file(path: impl AsRef<Path>) -> ParseResult<NormalsAnalysis> {
    let path = path.as_ref();
    let mut metrics = AnalysisMetrics::default();
    metrics.begin();

    let mesh = metrics.time(TimingBucket::Load, || parse::off::load_off(path))?;
    let vertex_faces = metrics.time(TimingBucket::Adjacency, || mesh.vertex_face_map());
    let (normals, diagnostics) = metrics.time(TimingBucket::Normals, || {
        geom::compute_normals(&mesh, &vertex_faces)
    });
    if diagnostics.has_warnings() {
        log::warn!("{}: {}", path.display(), diagnostics.summary());
    }

    Ok(NormalsAnalysis {
        normals,
        diagnostics,
        timing: metrics.end(),
    })
}

fn run_pipeline(mesh: &CrownMesh, config: &AnalysisConfig, metrics: &mut AnalysisMetrics) -> ToothAnalysis {
    let graph = metrics.time(TimingBucket::Adjacency, || AdjacencyGraph::from_mesh(mesh));
    let (cusps, detection) = metrics.time(TimingBucket::CuspDetection, || {
        cusp::detect_cusps_with_diagnostics(mesh, &graph, &config.cusp)
    });
    let report = metrics.time(TimingBucket::CuspAnalysis, || {
        cusp::analyze_cusps(&cusp::cusp_positions(&cusps), &config.analysis)
    });

    ToothAnalysis {
        cusps,
        detection,
        report,
        relief: geom::relief_report(mesh, &config.relief),
        timing: None,
    }
}
