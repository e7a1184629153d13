mod adjacency;
mod core;
mod diagnostics;
mod mesh;
mod metrics;
mod normals;
mod relief;

pub use adjacency::AdjacencyGraph;
pub use core::{Point3, Tolerance, Vec3, round_to};
pub use diagnostics::MeshDiagnostics;
pub use mesh::{CrownMesh, Face, MeshError, VertexFaceMap};
pub use metrics::{AnalysisMetrics, TimingBucket, TimingReport};
pub use normals::{
    MeshNormals, OrientationVote, compute_normals, enforce_outward, face_normal, face_normals,
    normalize, normalize_all, orientation_vote, vertex_normals,
};
pub use relief::{
    ReliefClass, ReliefOptions, ReliefReport, classify_relief, crown_relief, relief_report,
};

#[cfg(test)]
mod tests;
