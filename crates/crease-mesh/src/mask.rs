//! Binary face masks in atlas pixel space.
//!
//! Masks are rasterized through [`Transform::to_atlas`], the same mapping the
//! UV mapper divides by the canvas size, so a mask edge and the matching UV
//! edge land on the same pixel. Coverage is a hard pixel-centre test with no
//! antialiasing.

use crease_materials::{AtlasRegion, FaceTextureMapping};
use crease_pattern::FoldPattern;
use glam::DVec2;
use image::{GrayImage, Luma};

use crate::transform::Transform;

/// Mask value for covered pixels.
pub const COVERED: Luma<u8> = Luma([255]);

/// Rasterizes every face assigned to `texture` into `region`.
///
/// The returned mask has the size of the transform's canvas.
pub fn render_texture_mask(
    pattern: &FoldPattern,
    mapping: &FaceTextureMapping,
    texture: usize,
    transform: &Transform,
    region: &AtlasRegion,
) -> GrayImage {
    let mut mask = GrayImage::new(transform.canvas_width, transform.canvas_height);
    let vertices = pattern.vertices_coords();

    for face in mapping.faces_with(texture) {
        if face >= pattern.face_count() {
            continue;
        }
        for tri in pattern.face_triangles(face) {
            let pts = tri.map(|i| transform.to_atlas(vertices[i], region));
            fill_triangle(&mut mask, pts);
        }
    }

    mask
}

fn edge(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn fill_triangle(mask: &mut GrayImage, [a, b, c]: [DVec2; 3]) {
    let area = edge(a, b, c);
    if area == 0.0 {
        return;
    }

    let (w, h) = (mask.width() as f64, mask.height() as f64);
    let min_x = a.x.min(b.x).min(c.x).floor().clamp(0.0, w) as u32;
    let max_x = a.x.max(b.x).max(c.x).ceil().clamp(0.0, w) as u32;
    let min_y = a.y.min(b.y).min(c.y).floor().clamp(0.0, h) as u32;
    let max_y = a.y.max(b.y).max(c.y).ceil().clamp(0.0, h) as u32;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
            let w0 = edge(b, c, p);
            let w1 = edge(c, a, p);
            let w2 = edge(a, b, p);
            // Inclusive test for either winding.
            let inside = if area > 0.0 {
                w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
            } else {
                w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
            };
            if inside {
                mask.put_pixel(x, y, COVERED);
            }
        }
    }
}
