//! Pattern-to-atlas transform.
//!
//! One [`Transform`] maps pattern-plane coordinates (X and Z) into atlas pixel
//! space. It is derived once per (pattern, canvas) pair and handed to both the
//! mask renderer and the UV mapper; they must never derive their own.

use crease_materials::AtlasRegion;
use glam::{DVec2, DVec3};

use crate::error::MeshError;

/// Extents below this are treated as zero.
const EXTENT_EPSILON: f64 = 1e-9;

/// Which substitution was applied for a flat bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundsFallback {
    /// Zero width: the height was used as the width.
    WidthFromHeight,
    /// Zero height: the width was used as the height.
    HeightFromWidth,
    /// Both zero: a unit square was used.
    UnitSquare,
}

/// Uniform scale plus centering offset from pattern plane to canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Pixels per pattern unit.
    pub scale: f64,
    /// Horizontal centering offset in pixels.
    pub offset_x: f64,
    /// Vertical centering offset in pixels.
    pub offset_y: f64,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// Minimum X of the pattern bounding box.
    pub min_x: f64,
    /// Minimum Z of the pattern bounding box.
    pub min_z: f64,
    /// Set when the bounding box was degenerate.
    pub fallback: Option<BoundsFallback>,
}

impl Transform {
    /// Maps a pattern point to canvas pixels.
    #[inline]
    pub fn to_canvas(&self, p: DVec3) -> DVec2 {
        DVec2::new(
            (p.x - self.min_x) * self.scale + self.offset_x,
            (p.z - self.min_z) * self.scale + self.offset_y,
        )
    }

    /// Maps a pattern point into `region` of the atlas, in atlas pixels.
    ///
    /// The full canvas is squeezed into the region, so the whole pattern
    /// shows the whole texture regardless of which cell it lives in.
    #[inline]
    pub fn to_atlas(&self, p: DVec3, region: &AtlasRegion) -> DVec2 {
        let c = self.to_canvas(p);
        DVec2::new(
            f64::from(region.x) + wrap_unit(c.x / f64::from(self.canvas_width)) * f64::from(region.w),
            f64::from(region.y) + wrap_unit(c.y / f64::from(self.canvas_height)) * f64::from(region.h),
        )
    }
}

/// Wraps a canvas fraction into `[0, 1]`.
///
/// Values already in range, including exactly 1.0 on the far border, are
/// returned unchanged.
#[inline]
pub fn wrap_unit(t: f64) -> f64 {
    if (0.0..=1.0).contains(&t) {
        t
    } else {
        t.rem_euclid(1.0)
    }
}

/// Computes the transform fitting `vertices` into a `canvas_width × canvas_height` canvas.
///
/// Scaling is uniform, so the pattern keeps its aspect ratio and is centered
/// along the slack axis.
pub fn compute_transform(
    vertices: &[DVec3],
    canvas_width: u32,
    canvas_height: u32,
) -> Result<Transform, MeshError> {
    if vertices.is_empty() {
        return Err(MeshError::NoPatternData);
    }
    if canvas_width == 0 || canvas_height == 0 {
        return Err(MeshError::EmptyCanvas {
            width: canvas_width,
            height: canvas_height,
        });
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_z, mut max_z) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in vertices {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_z = min_z.min(p.z);
        max_z = max_z.max(p.z);
    }

    let mut width = max_x - min_x;
    let mut height = max_z - min_z;
    let fallback = match (width < EXTENT_EPSILON, height < EXTENT_EPSILON) {
        (false, false) => None,
        (true, false) => {
            width = height;
            Some(BoundsFallback::WidthFromHeight)
        }
        (false, true) => {
            height = width;
            Some(BoundsFallback::HeightFromWidth)
        }
        (true, true) => {
            width = 1.0;
            height = 1.0;
            Some(BoundsFallback::UnitSquare)
        }
    };
    if let Some(fallback) = fallback {
        tracing::warn!("Degenerate pattern bounds ({fallback:?}); using square fallback");
    }

    let cw = f64::from(canvas_width);
    let ch = f64::from(canvas_height);
    let scale = (cw / width).min(ch / height);

    Ok(Transform {
        scale,
        offset_x: (cw - width * scale) / 2.0,
        offset_y: (ch - height * scale) / 2.0,
        canvas_width,
        canvas_height,
        min_x,
        min_z,
        fallback,
    })
}
