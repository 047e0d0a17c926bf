//! Mesh error types.

use thiserror::Error;

/// Errors raised by the geometry stage.
#[derive(Debug, Error)]
pub enum MeshError {
    /// No vertices to derive a transform from.
    #[error("pattern has no vertex data")]
    NoPatternData,

    /// The target canvas has a zero dimension.
    #[error("canvas {width}x{height} has no area")]
    EmptyCanvas {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
    },
}
