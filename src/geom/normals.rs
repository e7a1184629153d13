//! Face and vertex normals with global outward orientation.
//!
//! Face normals are taken from the first three vertices of each face only,
//! so a non-planar polygon is oriented by its leading triangle. Vertex normals
//! are the unweighted sum of the unit normals of their incident faces.
//!
//! After both sets are computed, orientation is decided by majority vote: each
//! vertex normal is compared with the direction from the mesh centroid to the
//! vertex. If more vertices point inward than outward, every normal is negated
//! in one pass.

use super::diagnostics::MeshDiagnostics;
use super::mesh::{CrownMesh, Face, VertexFaceMap};
use super::Vec3;

/// Unit face and vertex normals of a mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshNormals {
    /// One normal per face, in face order.
    pub face: Vec<Vec3>,
    /// One normal per vertex, in vertex order.
    pub vertex: Vec<Vec3>,
    /// Whether the global outward flip was applied.
    pub flipped: bool,
}

/// Tally of vertex-normal alignment against the centroid → vertex direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrientationVote {
    pub outward: usize,
    pub inward: usize,
}

impl OrientationVote {
    /// Normals are inward on average when inward votes outnumber outward ones.
    #[must_use]
    pub fn needs_flip(self) -> bool {
        self.inward > self.outward
    }
}

/// Raw (unnormalized) normal of `face`: `cross(b - a, c - a)` over its first
/// three vertices. Faces with fewer than three vertices yield `None`.
#[must_use]
pub fn face_normal(mesh: &CrownMesh, face: &Face) -> Option<Vec3> {
    let [a, b, c] = match face.indices() {
        [a, b, c, ..] => [*a, *b, *c],
        _ => return None,
    };
    let a = mesh.vertex(a)?;
    let b = mesh.vertex(b)?;
    let c = mesh.vertex(c)?;
    Some((b - a).cross(c - a))
}

/// Raw normals of every face; degenerate faces map to the zero vector.
#[must_use]
pub fn face_normals(mesh: &CrownMesh) -> Vec<Vec3> {
    mesh.faces()
        .iter()
        .map(|face| face_normal(mesh, face).unwrap_or(Vec3::ZERO))
        .collect()
}

/// Scales a vector to unit length.
///
/// Magnitudes below machine epsilon are treated as 1, leaving the vector
/// unscaled instead of producing NaN.
#[must_use]
pub fn normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len < f64::EPSILON { v } else { v / len }
}

#[must_use]
pub fn normalize_all(vectors: &[Vec3]) -> Vec<Vec3> {
    vectors.iter().copied().map(normalize).collect()
}

/// Unit vertex normals from already-normalized face normals.
///
/// Vertices without incident faces get the zero vector. A NaN in any incident
/// face normal is reported through `diagnostics` but does not stop the pass.
pub fn vertex_normals(
    unit_face_normals: &[Vec3],
    vertex_faces: &VertexFaceMap,
    diagnostics: &mut MeshDiagnostics,
) -> Vec<Vec3> {
    let mut normals = Vec::with_capacity(vertex_faces.vertex_count());
    for vertex in 0..vertex_faces.vertex_count() {
        let mut sum = Vec3::ZERO;
        let mut saw_nan = false;
        for &face in vertex_faces.faces_of(vertex) {
            let n = unit_face_normals.get(face).copied().unwrap_or(Vec3::ZERO);
            saw_nan |= n.has_nan();
            sum += n;
        }
        if saw_nan {
            log::warn!("NaN found during vertex normal accumulation at vertex #{vertex}");
            diagnostics.record_nan_normal(vertex);
        }
        normals.push(normalize(sum));
    }
    normals
}

/// Counts vertices whose normal points away from (outward) or towards
/// (inward) the centroid. Zero dot products do not vote.
#[must_use]
pub fn orientation_vote(mesh: &CrownMesh, vertex_normals: &[Vec3]) -> OrientationVote {
    let mut vote = OrientationVote::default();
    let Some(centroid) = mesh.centroid() else {
        return vote;
    };
    for (position, normal) in mesh.vertices().iter().zip(vertex_normals) {
        let d = (*position - centroid).dot(*normal);
        if d > 0.0 {
            vote.outward += 1;
        } else if d < 0.0 {
            vote.inward += 1;
        }
    }
    vote
}

/// Negates all face and vertex normals when the majority points inward.
/// Returns the vote that drove the decision.
pub fn enforce_outward(mesh: &CrownMesh, normals: &mut MeshNormals) -> OrientationVote {
    let vote = orientation_vote(mesh, &normals.vertex);
    if vote.needs_flip() {
        log::debug!(
            "outward normal flipping has occurred ({} inward vs {} outward)",
            vote.inward,
            vote.outward
        );
        for n in normals.face.iter_mut().chain(normals.vertex.iter_mut()) {
            *n = -*n;
        }
        normals.flipped = !normals.flipped;
    }
    vote
}

/// Computes unit face and vertex normals and enforces outward orientation.
#[must_use]
pub fn compute_normals(mesh: &CrownMesh, vertex_faces: &VertexFaceMap) -> (MeshNormals, MeshDiagnostics) {
    let mut diagnostics = MeshDiagnostics::for_mesh(mesh, vertex_faces);

    let face = normalize_all(&face_normals(mesh));
    let vertex = vertex_normals(&face, vertex_faces, &mut diagnostics);

    let nan_after = vertex.iter().filter(|n| n.has_nan()).count();
    if nan_after > 0 {
        log::warn!("{nan_after} vertex normals contain NaN after normalization");
    }

    let mut normals = MeshNormals {
        face,
        vertex,
        flipped: false,
    };
    enforce_outward(mesh, &mut normals);
    diagnostics.normals_flipped = normals.flipped;
    if normals.flipped {
        diagnostics.add_warning("mesh normals flipped to point outward");
    }

    (normals, diagnostics)
}
