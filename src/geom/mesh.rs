use super::{Point3, Vec3};

/// A polygon face: an ordered loop of vertex indices.
///
/// Faces are not restricted to triangles. The loop closes implicitly from the
/// last index back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    indices: Vec<usize>,
}

impl Face {
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Yields `(previous, current, next)` for every loop position.
    pub fn loop_triples(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |k| {
            let prev = self.indices[(k + n - 1) % n];
            let next = self.indices[(k + 1) % n];
            (prev, self.indices[k], next)
        })
    }
}

impl From<Vec<usize>> for Face {
    fn from(indices: Vec<usize>) -> Self {
        Self::new(indices)
    }
}

/// Errors raised when a mesh violates its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// An immutable crown mesh: vertex positions plus polygon faces.
///
/// Vertex indices are stable identities used by every downstream analysis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrownMesh {
    vertices: Vec<Point3>,
    faces: Vec<Face>,
}

impl CrownMesh {
    /// Builds a mesh, rejecting faces that reference missing vertices.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Face>) -> Result<Self, MeshError> {
        let vertex_count = vertices.len();
        for (face_idx, face) in faces.iter().enumerate() {
            if let Some(&index) = face.indices().iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    face: face_idx,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Convenience constructor from raw coordinate and index buffers.
    pub fn from_buffers(vertices: &[[f64; 3]], faces: &[Vec<usize>]) -> Result<Self, MeshError> {
        Self::new(
            vertices.iter().copied().map(Point3::from).collect(),
            faces.iter().cloned().map(Face::new).collect(),
        )
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<Point3> {
        self.vertices.get(index).copied()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Per-vertex heights (`-z`).
    #[must_use]
    pub fn heights(&self) -> Vec<f64> {
        self.vertices.iter().map(|v| v.height()).collect()
    }

    /// Global minimum and maximum x coordinate, or `None` for an empty mesh.
    #[must_use]
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.vertices.iter().map(|v| v.x))
    }

    /// Global minimum and maximum z coordinate, or `None` for an empty mesh.
    #[must_use]
    pub fn z_extent(&self) -> Option<(f64, f64)> {
        extent(self.vertices.iter().map(|v| v.z))
    }

    /// Mean of all vertex positions.
    #[must_use]
    pub fn centroid(&self) -> Option<Point3> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut sum = Vec3::ZERO;
        for v in &self.vertices {
            sum += v.to_vec3();
        }
        let mean = sum / self.vertices.len() as f64;
        Some(Point3::new(mean.x, mean.y, mean.z))
    }

    /// Builds the vertex → incident-face map.
    #[must_use]
    pub fn vertex_face_map(&self) -> VertexFaceMap {
        VertexFaceMap::from_mesh(self)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
    })
}

/// Arena-indexed map from vertex index to the faces that contain it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexFaceMap {
    faces: Vec<Vec<usize>>,
}

impl VertexFaceMap {
    #[must_use]
    pub fn from_mesh(mesh: &CrownMesh) -> Self {
        let mut faces = vec![Vec::new(); mesh.vertex_count()];
        for (face_idx, face) in mesh.faces().iter().enumerate() {
            for &v in face.indices() {
                let incident: &mut Vec<usize> = &mut faces[v];
                // A face that repeats a vertex is still incident only once.
                if incident.last() != Some(&face_idx) {
                    incident.push(face_idx);
                }
            }
        }
        Self { faces }
    }

    /// Faces incident to `vertex`, in face order. Unknown vertices have none.
    #[must_use]
    pub fn faces_of(&self, vertex: usize) -> &[usize] {
        self.faces.get(vertex).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices that belong to no face.
    #[must_use]
    pub fn isolated_vertex_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_empty()).count()
    }
}
