//! Data-quality diagnostics for loaded crown meshes.
//!
//! Diagnostics are collected while normals are computed and can be used for:
//!
//! - Spotting faces that cannot be oriented (fewer than three vertices)
//! - Counting vertices that belong to no face
//! - Reporting NaN values produced during normal accumulation
//! - Recording whether the global outward flip was applied
//!
//! # Example
//!
//! ```ignore
//! use crown_engine::geom::compute_normals;
//!
//! let (normals, diagnostics) = compute_normals(&mesh, &mesh.vertex_face_map());
//! if !diagnostics.is_clean() {
//!     for warning in &diagnostics.warnings {
//!         eprintln!("Warning: {}", warning);
//!     }
//! }
//! ```

use std::fmt;

use super::mesh::{CrownMesh, VertexFaceMap};

/// Diagnostics describing the quality of a crown mesh and its normals.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshDiagnostics {
    /// Total number of vertices in the mesh.
    pub vertex_count: usize,

    /// Total number of faces in the mesh.
    pub face_count: usize,

    /// Number of faces with more than three vertices.
    ///
    /// Only the first three vertices of these faces define their normal.
    pub polygon_face_count: usize,

    /// Number of faces with fewer than three vertices.
    ///
    /// These faces have no normal and contribute the zero vector.
    pub degenerate_face_count: usize,

    /// Number of vertices that belong to no face.
    pub isolated_vertex_count: usize,

    /// Vertices whose normal accumulation encountered NaN.
    pub nan_normal_vertices: Vec<usize>,

    /// Whether all normals were negated to point outward.
    pub normals_flipped: bool,

    /// Human-readable warnings about data-quality issues.
    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the topology counts of `mesh`.
    #[must_use]
    pub fn for_mesh(mesh: &CrownMesh, vertex_faces: &VertexFaceMap) -> Self {
        let mut diag = Self {
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            isolated_vertex_count: vertex_faces.isolated_vertex_count(),
            ..Self::default()
        };
        for face in mesh.faces() {
            if face.len() < 3 {
                diag.degenerate_face_count += 1;
            } else if face.len() > 3 {
                diag.polygon_face_count += 1;
            }
        }
        if diag.degenerate_face_count > 0 {
            diag.add_warning(format!(
                "{} faces have fewer than three vertices",
                diag.degenerate_face_count
            ));
        }
        diag
    }

    /// Returns `true` if no issues were detected and no flip was needed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degenerate_face_count == 0
            && self.isolated_vertex_count == 0
            && self.nan_normal_vertices.is_empty()
            && !self.normals_flipped
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Records a NaN found while summing the face normals of `vertex`.
    pub fn record_nan_normal(&mut self, vertex: usize) {
        self.nan_normal_vertices.push(vertex);
        self.add_warning(format!("nan found during vertex normal creation at vertex #{vertex}"));
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} F:{faces} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} F:{}", self.vertex_count, self.face_count)];

        if self.polygon_face_count > 0 {
            parts.push(format!("polygons:{}", self.polygon_face_count));
        }
        if self.degenerate_face_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_face_count));
        }
        if self.isolated_vertex_count > 0 {
            parts.push(format!("isolated:{}", self.isolated_vertex_count));
        }
        if !self.nan_normal_vertices.is_empty() {
            parts.push(format!("nan:{}", self.nan_normal_vertices.len()));
        }
        if self.normals_flipped {
            parts.push("flipped".to_string());
        }

        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;

        if self.polygon_face_count > 0 {
            writeln!(f, "  Polygons (oriented by first triangle): {}", self.polygon_face_count)?;
        }
        if self.degenerate_face_count > 0 || self.isolated_vertex_count > 0 {
            writeln!(f, "  Topology issues:")?;
            if self.degenerate_face_count > 0 {
                writeln!(f, "    - Faces with < 3 vertices: {}", self.degenerate_face_count)?;
            }
            if self.isolated_vertex_count > 0 {
                writeln!(f, "    - Isolated vertices: {}", self.isolated_vertex_count)?;
            }
        }
        if !self.nan_normal_vertices.is_empty() {
            writeln!(f, "  NaN normals: {}", self.nan_normal_vertices.len())?;
        }
        if self.normals_flipped {
            writeln!(f, "  Normals: flipped outward")?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {}", warning)?;
            }
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {}", status)?;

        Ok(())
    }
}
