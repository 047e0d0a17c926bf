//! Pattern error types.

use thiserror::Error;

/// Errors raised while importing or validating a crease pattern.
///
/// Every variant is fatal to the load that produced it: callers keep the
/// previously loaded pattern and surface the error as a warning.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern has no vertices.
    #[error("pattern has no vertex data")]
    NoPatternData,

    /// The pattern has vertices but no faces.
    #[error("pattern has no faces")]
    NoFaces,

    /// A face lists fewer than three vertices.
    #[error("face {face} has {count} vertices, at least 3 are required")]
    FaceTooSmall {
        /// Offending face index.
        face: usize,
        /// Number of vertices listed.
        count: usize,
    },

    /// A face refers to a vertex that does not exist.
    #[error("face {face} refers to vertex {vertex}, but only {vertex_count} vertices are defined")]
    FaceIndexOutOfRange {
        /// Offending face index.
        face: usize,
        /// The out-of-range vertex index.
        vertex: usize,
        /// Number of vertices in the pattern.
        vertex_count: usize,
    },

    /// An edge refers to a vertex that does not exist.
    #[error("edge {edge} refers to vertex {vertex}, but only {vertex_count} vertices are defined")]
    EdgeIndexOutOfRange {
        /// Offending edge index.
        edge: usize,
        /// The out-of-range vertex index.
        vertex: usize,
        /// Number of vertices in the pattern.
        vertex_count: usize,
    },

    /// A per-edge list does not have one entry per edge.
    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the FOLD field.
        field: &'static str,
        /// Number of edges.
        expected: usize,
        /// Number of entries found.
        found: usize,
    },

    /// A vertex coordinate is not a 2D or 3D finite point.
    #[error("vertex {vertex} has an invalid coordinate: {reason}")]
    BadCoordinate {
        /// Offending vertex index.
        vertex: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The FOLD document could not be parsed.
    #[error("invalid FOLD json: {0}")]
    Json(#[from] serde_json::Error),

    /// The FOLD file could not be read.
    #[error("failed to read FOLD file: {0}")]
    Io(#[from] std::io::Error),
}
