//! Render-ready view of a session.

use crease_materials::AtlasRegion;
use crease_mesh::EdgeLineBuffers;
use serde::Serialize;

/// Borrowed buffers for an external renderer.
#[derive(Debug, Serialize)]
pub struct RenderOutput<'a> {
    /// Positions, 3 floats per vertex, normalized to the target radius.
    pub positions: &'a [f32],
    /// UVs, 2 floats per vertex, in `[0, 1]`.
    pub uvs: &'a [f32],
    /// Triangle indices.
    pub indices: &'a [u32],
    /// Classified edge line indices.
    pub edge_lines: &'a EdgeLineBuffers,
    /// Atlas region per texture; empty when untextured.
    pub regions: &'a [Option<AtlasRegion>],
    /// Atlas raster; `None` when untextured.
    #[serde(skip)]
    pub atlas_image: Option<&'a image::RgbaImage>,
}

impl RenderOutput<'_> {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}
