//! FOLD pattern model.
//!
//! Patterns arrive as FOLD documents (`vertices_coords`, `faces_vertices`,
//! `edges_vertices`, `edges_assignment`). Two-dimensional coordinates are
//! lifted onto the pattern plane, which is the XZ plane: `[x, y]` becomes
//! `(x, 0, y)`.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;

// ---------------------------------------------------------------------------
// EdgeAssignment
// ---------------------------------------------------------------------------

/// Fold classification of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeAssignment {
    /// Mountain fold.
    #[serde(rename = "M", alias = "m")]
    Mountain,
    /// Valley fold.
    #[serde(rename = "V", alias = "v")]
    Valley,
    /// Outer boundary of the paper.
    #[serde(rename = "B", alias = "b")]
    Boundary,
    /// Flat facet edge produced by triangulation.
    #[serde(rename = "F", alias = "f")]
    Facet,
    /// Crease with no fold direction.
    #[default]
    #[serde(rename = "U", alias = "u")]
    Unassigned,
    /// Cut line.
    #[serde(rename = "C", alias = "c")]
    Cut,
}

impl EdgeAssignment {
    /// All assignments, in the order the classified line buffers are laid out.
    pub const ALL: [EdgeAssignment; 6] = [
        EdgeAssignment::Mountain,
        EdgeAssignment::Valley,
        EdgeAssignment::Boundary,
        EdgeAssignment::Facet,
        EdgeAssignment::Unassigned,
        EdgeAssignment::Cut,
    ];
}

// ---------------------------------------------------------------------------
// FoldFile (raw serde view)
// ---------------------------------------------------------------------------

/// Raw FOLD document as it appears on disk.
///
/// Unknown FOLD fields (`file_spec`, `frame_title`, ...) are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldFile {
    /// Vertex coordinates, two or three components each.
    pub vertices_coords: Vec<Vec<f64>>,
    /// Vertex indices of each face, counter-clockwise.
    pub faces_vertices: Vec<Vec<usize>>,
    /// Vertex index pairs of each edge.
    pub edges_vertices: Vec<[usize; 2]>,
    /// Fold classification of each edge.
    pub edges_assignment: Vec<EdgeAssignment>,
    /// Target fold angle of each edge in degrees, positive for valley.
    #[serde(rename = "edges_foldAngle", skip_serializing_if = "Option::is_none")]
    pub edges_fold_angle: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// FoldPattern
// ---------------------------------------------------------------------------

/// A validated crease pattern.
///
/// Construct through [`FoldPattern::new`], [`FoldPattern::from_json`] or
/// `TryFrom<FoldFile>`; every face and edge index is guaranteed to refer to
/// an existing vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldPattern {
    vertices_coords: Vec<DVec3>,
    faces_vertices: Vec<Vec<usize>>,
    edges_vertices: Vec<[usize; 2]>,
    edges_assignment: Vec<EdgeAssignment>,
    edges_fold_angle: Option<Vec<f64>>,
}

impl FoldPattern {
    /// Builds and validates a pattern.
    ///
    /// An empty `edges_assignment` marks every edge as unassigned.
    pub fn new(
        vertices_coords: Vec<DVec3>,
        faces_vertices: Vec<Vec<usize>>,
        edges_vertices: Vec<[usize; 2]>,
        edges_assignment: Vec<EdgeAssignment>,
    ) -> Result<Self, PatternError> {
        let edges_assignment = if edges_assignment.is_empty() {
            vec![EdgeAssignment::Unassigned; edges_vertices.len()]
        } else {
            edges_assignment
        };
        let pattern = Self {
            vertices_coords,
            faces_vertices,
            edges_vertices,
            edges_assignment,
            edges_fold_angle: None,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Attaches per-edge fold angles (degrees, FOLD sign convention).
    pub fn with_fold_angles(mut self, angles: Vec<f64>) -> Result<Self, PatternError> {
        if angles.len() != self.edges_vertices.len() {
            return Err(PatternError::LengthMismatch {
                field: "edges_foldAngle",
                expected: self.edges_vertices.len(),
                found: angles.len(),
            });
        }
        self.edges_fold_angle = Some(angles);
        Ok(self)
    }

    /// Parses a FOLD JSON document.
    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        let file: FoldFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// Reads and parses a `.fold` file.
    pub fn load(path: &Path) -> Result<Self, PatternError> {
        let contents = std::fs::read_to_string(path)?;
        let pattern = Self::from_json(&contents)?;
        tracing::debug!(
            "Loaded pattern {}: {} vertices, {} faces, {} edges",
            path.display(),
            pattern.vertex_count(),
            pattern.face_count(),
            pattern.edge_count()
        );
        Ok(pattern)
    }

    fn validate(&self) -> Result<(), PatternError> {
        if self.vertices_coords.is_empty() {
            return Err(PatternError::NoPatternData);
        }
        if self.faces_vertices.is_empty() {
            return Err(PatternError::NoFaces);
        }
        let vertex_count = self.vertices_coords.len();

        for (vertex, p) in self.vertices_coords.iter().enumerate() {
            if !p.is_finite() {
                return Err(PatternError::BadCoordinate {
                    vertex,
                    reason: format!("non-finite component in {p}"),
                });
            }
        }

        for (face, verts) in self.faces_vertices.iter().enumerate() {
            if verts.len() < 3 {
                return Err(PatternError::FaceTooSmall {
                    face,
                    count: verts.len(),
                });
            }
            if let Some(&vertex) = verts.iter().find(|&&v| v >= vertex_count) {
                return Err(PatternError::FaceIndexOutOfRange {
                    face,
                    vertex,
                    vertex_count,
                });
            }
        }

        for (edge, pair) in self.edges_vertices.iter().enumerate() {
            if let Some(&vertex) = pair.iter().find(|&&v| v >= vertex_count) {
                return Err(PatternError::EdgeIndexOutOfRange {
                    edge,
                    vertex,
                    vertex_count,
                });
            }
        }

        if self.edges_assignment.len() != self.edges_vertices.len() {
            return Err(PatternError::LengthMismatch {
                field: "edges_assignment",
                expected: self.edges_vertices.len(),
                found: self.edges_assignment.len(),
            });
        }

        Ok(())
    }

    /// Vertex positions on the pattern plane.
    pub fn vertices_coords(&self) -> &[DVec3] {
        &self.vertices_coords
    }

    /// Vertex indices of every face.
    pub fn faces_vertices(&self) -> &[Vec<usize>] {
        &self.faces_vertices
    }

    /// Vertex index pairs of every edge.
    pub fn edges_vertices(&self) -> &[[usize; 2]] {
        &self.edges_vertices
    }

    /// Assignment of every edge.
    pub fn edges_assignment(&self) -> &[EdgeAssignment] {
        &self.edges_assignment
    }

    /// Per-edge fold angles in degrees, when the document supplied them.
    pub fn edges_fold_angle(&self) -> Option<&[f64]> {
        self.edges_fold_angle.as_deref()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices_coords.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces_vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges_vertices.len()
    }

    /// Fan-triangulates one face into vertex-index triples.
    pub fn face_triangles(&self, face: usize) -> impl Iterator<Item = [usize; 3]> + '_ {
        let verts = &self.faces_vertices[face];
        (1..verts.len() - 1).map(move |i| [verts[0], verts[i], verts[i + 1]])
    }

    /// Fan-triangulates every face, yielding `(face_index, triangle)`.
    pub fn triangles(&self) -> impl Iterator<Item = (usize, [usize; 3])> + '_ {
        (0..self.face_count()).flat_map(move |face| {
            self.face_triangles(face).map(move |tri| (face, tri))
        })
    }
}

impl TryFrom<FoldFile> for FoldPattern {
    type Error = PatternError;

    fn try_from(file: FoldFile) -> Result<Self, Self::Error> {
        let mut vertices = Vec::with_capacity(file.vertices_coords.len());
        for (vertex, coords) in file.vertices_coords.iter().enumerate() {
            let point = match coords.as_slice() {
                [x, y] => DVec3::new(*x, 0.0, *y),
                [x, y, z] => DVec3::new(*x, *y, *z),
                other => {
                    return Err(PatternError::BadCoordinate {
                        vertex,
                        reason: format!("expected 2 or 3 components, found {}", other.len()),
                    });
                }
            };
            vertices.push(point);
        }

        let pattern = FoldPattern::new(
            vertices,
            file.faces_vertices,
            file.edges_vertices,
            file.edges_assignment,
        )?;

        match file.edges_fold_angle {
            Some(angles) => pattern.with_fold_angles(angles),
            None => Ok(pattern),
        }
    }
}

impl From<&FoldPattern> for FoldFile {
    fn from(pattern: &FoldPattern) -> Self {
        Self {
            vertices_coords: pattern
                .vertices_coords
                .iter()
                .map(|p| vec![p.x, p.y, p.z])
                .collect(),
            faces_vertices: pattern.faces_vertices.clone(),
            edges_vertices: pattern.edges_vertices.clone(),
            edges_assignment: pattern.edges_assignment.clone(),
            edges_fold_angle: pattern.edges_fold_angle.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_WITH_DIAGONAL: &str = r#"{
        "file_spec": 1.1,
        "vertices_coords": [[0, 0], [1, 0], [1, 1], [0, 1]],
        "faces_vertices": [[0, 1, 2], [0, 2, 3]],
        "edges_vertices": [[0, 1], [1, 2], [2, 3], [3, 0], [0, 2]],
        "edges_assignment": ["B", "B", "B", "B", "V"]
    }"#;

    #[test]
    fn test_parse_fold_lifts_2d_coords_onto_xz_plane() {
        let pattern = FoldPattern::from_json(SQUARE_WITH_DIAGONAL).unwrap();
        assert_eq!(pattern.vertex_count(), 4);
        assert_eq!(pattern.vertices_coords()[2], DVec3::new(1.0, 0.0, 1.0));
        assert_eq!(pattern.edges_assignment()[4], EdgeAssignment::Valley);
    }

    #[test]
    fn test_3d_coords_are_kept() {
        let json = r#"{
            "vertices_coords": [[0, 1, 0], [1, 2, 0], [0, 3, 1]],
            "faces_vertices": [[0, 1, 2]]
        }"#;
        let pattern = FoldPattern::from_json(json).unwrap();
        assert_eq!(pattern.vertices_coords()[1], DVec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_missing_assignment_defaults_to_unassigned() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [0, 1]],
            "faces_vertices": [[0, 1, 2]],
            "edges_vertices": [[0, 1], [1, 2]]
        }"#;
        let pattern = FoldPattern::from_json(json).unwrap();
        assert!(
            pattern
                .edges_assignment()
                .iter()
                .all(|a| *a == EdgeAssignment::Unassigned)
        );
    }

    #[test]
    fn test_empty_vertices_is_no_pattern_data() {
        let result = FoldPattern::from_json("{}");
        assert!(matches!(result, Err(PatternError::NoPatternData)));
    }

    #[test]
    fn test_no_faces_rejected() {
        let json = r#"{ "vertices_coords": [[0, 0], [1, 0]] }"#;
        assert!(matches!(
            FoldPattern::from_json(json),
            Err(PatternError::NoFaces)
        ));
    }

    #[test]
    fn test_out_of_range_face_index_rejected() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [0, 1]],
            "faces_vertices": [[0, 1, 7]]
        }"#;
        assert!(matches!(
            FoldPattern::from_json(json),
            Err(PatternError::FaceIndexOutOfRange { face: 0, vertex: 7, .. })
        ));
    }

    #[test]
    fn test_out_of_range_edge_index_rejected() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [0, 1]],
            "faces_vertices": [[0, 1, 2]],
            "edges_vertices": [[0, 3]],
            "edges_assignment": ["B"]
        }"#;
        assert!(matches!(
            FoldPattern::from_json(json),
            Err(PatternError::EdgeIndexOutOfRange { edge: 0, vertex: 3, .. })
        ));
    }

    #[test]
    fn test_assignment_length_mismatch_rejected() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [0, 1]],
            "faces_vertices": [[0, 1, 2]],
            "edges_vertices": [[0, 1], [1, 2]],
            "edges_assignment": ["B"]
        }"#;
        assert!(matches!(
            FoldPattern::from_json(json),
            Err(PatternError::LengthMismatch { field: "edges_assignment", .. })
        ));
    }

    #[test]
    fn test_two_vertex_face_rejected() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [0, 1]],
            "faces_vertices": [[0, 1]]
        }"#;
        assert!(matches!(
            FoldPattern::from_json(json),
            Err(PatternError::FaceTooSmall { face: 0, count: 2 })
        ));
    }

    #[test]
    fn test_unknown_assignment_code_is_json_error() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [0, 1]],
            "faces_vertices": [[0, 1, 2]],
            "edges_vertices": [[0, 1]],
            "edges_assignment": ["X"]
        }"#;
        assert!(matches!(FoldPattern::from_json(json), Err(PatternError::Json(_))));
    }

    #[test]
    fn test_all_assignments_in_fold_code_order() {
        let parsed: Vec<EdgeAssignment> =
            serde_json::from_str(r#"["M", "V", "B", "F", "U", "C"]"#).unwrap();
        assert_eq!(parsed, EdgeAssignment::ALL, "Line buffers follow M, V, B, F, U, C");
        let lower: Vec<EdgeAssignment> = serde_json::from_str(r#"["m", "c"]"#).unwrap();
        assert_eq!(lower, [EdgeAssignment::Mountain, EdgeAssignment::Cut]);
    }

    #[test]
    fn test_quad_face_fan_triangulation() {
        let json = r#"{
            "vertices_coords": [[0, 0], [1, 0], [1, 1], [0, 1]],
            "faces_vertices": [[0, 1, 2, 3]]
        }"#;
        let pattern = FoldPattern::from_json(json).unwrap();
        let tris: Vec<_> = pattern.triangles().collect();
        assert_eq!(tris, vec![(0, [0, 1, 2]), (0, [0, 2, 3])]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.fold");
        std::fs::write(&path, SQUARE_WITH_DIAGONAL).unwrap();
        let pattern = FoldPattern::load(&path).unwrap();
        assert_eq!(pattern.face_count(), 2);
        assert_eq!(pattern.edge_count(), 5);
    }

    #[test]
    fn test_fold_file_conversion_preserves_pattern() {
        let pattern = FoldPattern::from_json(SQUARE_WITH_DIAGONAL).unwrap();
        let file = FoldFile::from(&pattern);
        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"V\""));
        assert_eq!(FoldPattern::from_json(&json).unwrap(), pattern);
    }
}
