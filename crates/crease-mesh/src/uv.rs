//! Per-face UV generation against the shared [`Transform`].

use crease_materials::{AtlasRegion, FaceTextureMapping, TextureAtlas};
use crease_pattern::FoldPattern;
use glam::{DVec2, DVec3};

use crate::transform::Transform;

/// Tunables for degenerate-triangle handling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvSettings {
    /// Triangles whose absolute area (pattern units²) is below this collapse
    /// to their centroid.
    pub degenerate_area_epsilon: f64,
    /// Per-face step used to separate collapsed UVs that land on `v = 0`.
    pub perturb_step: f64,
}

impl Default for UvSettings {
    fn default() -> Self {
        Self {
            degenerate_area_epsilon: 1e-3,
            perturb_step: 0.01,
        }
    }
}

/// Signed area of a triangle projected onto the pattern (XZ) plane.
pub fn signed_area(v0: DVec3, v1: DVec3, v2: DVec3) -> f64 {
    0.5 * ((v1.x - v0.x) * (v2.z - v0.z) - (v2.x - v0.x) * (v1.z - v0.z))
}

fn atlas_uv(p: DVec3, transform: &Transform, region: &AtlasRegion) -> DVec2 {
    let px = transform.to_atlas(p, region);
    DVec2::new(
        px.x / f64::from(transform.canvas_width),
        px.y / f64::from(transform.canvas_height),
    )
}

fn clamp_uv(uv: DVec2) -> [f32; 2] {
    [uv.x.clamp(0.0, 1.0) as f32, uv.y.clamp(0.0, 1.0) as f32]
}

/// Computes UVs for the three corners of one triangle of face `face_index`.
///
/// A degenerate triangle gets the same UV on all three corners: the mapped
/// centroid, with `v` moved to `(face_index * perturb_step) mod 1` if it sits
/// exactly on 0.
pub fn map_face(
    face_index: usize,
    corners: [DVec3; 3],
    transform: &Transform,
    region: &AtlasRegion,
    settings: &UvSettings,
) -> [[f32; 2]; 3] {
    let [v0, v1, v2] = corners;
    if signed_area(v0, v1, v2).abs() < settings.degenerate_area_epsilon {
        let centroid = (v0 + v1 + v2) / 3.0;
        let mut uv = atlas_uv(centroid, transform, region);
        if uv.y == 0.0 {
            uv.y = (face_index as f64 * settings.perturb_step).rem_euclid(1.0);
        }
        let uv = clamp_uv(uv);
        return [uv; 3];
    }
    corners.map(|p| clamp_uv(atlas_uv(p, transform, region)))
}

/// Builds the per-vertex UV buffer (`2 × vertex_count`) for a whole pattern.
///
/// Polygon faces are fan-triangulated. Faces whose texture has no atlas
/// region (untextured fallback, skipped texture) use the full canvas. A
/// vertex shared by several faces keeps the UV of the last face processed;
/// vertices outside every face stay at `(0, 0)`.
pub fn map_pattern(
    pattern: &FoldPattern,
    mapping: &FaceTextureMapping,
    atlas: Option<&TextureAtlas>,
    transform: &Transform,
    settings: &UvSettings,
) -> Vec<f32> {
    let vertices = pattern.vertices_coords();
    let mut uvs = vec![0.0_f32; vertices.len() * 2];
    let full = AtlasRegion::full(transform.canvas_width, transform.canvas_height);

    for (face, tri) in pattern.triangles() {
        let region = mapping
            .texture_for(face)
            .and_then(|t| atlas.and_then(|a| a.region_for(t)))
            .unwrap_or(full);
        let corners = tri.map(|i| vertices[i]);
        let mapped = map_face(face, corners, transform, &region, settings);
        for (&vertex, uv) in tri.iter().zip(mapped) {
            uvs[vertex * 2] = uv[0];
            uvs[vertex * 2 + 1] = uv[1];
        }
    }

    uvs
}
