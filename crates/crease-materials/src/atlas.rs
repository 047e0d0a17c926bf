//! Texture atlas: composites the texture library into one raster laid out as a grid.
//!
//! A single texture is passed through untouched. Two or more are resized into
//! square cells of a `cols × rows` grid whose larger side fits `max_dim`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::texture::TextureLibrary;

/// Default upper bound for the composite canvas side, in pixels.
pub const DEFAULT_MAX_DIM: u32 = 2048;

// ---------------------------------------------------------------------------
// AtlasError
// ---------------------------------------------------------------------------

/// Errors returned while loading textures or building the atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// The library is empty, or none of its textures could be decoded.
    #[error("no usable textures")]
    NoTextures,

    /// Some textures could not be decoded; the rest are still usable.
    #[error("{} texture(s) failed to decode ({}), {remaining} remaining", .failed.len(), .failed.join(", "))]
    PartialTextureDecode {
        /// Names of the textures that failed.
        failed: Vec<String>,
        /// Number of decodable textures left.
        remaining: usize,
    },

    /// Image encode/decode error.
    #[error("image error: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// I/O error while reading textures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration validation error.
    #[error("invalid atlas config: {0}")]
    InvalidConfig(String),
}

// ---------------------------------------------------------------------------
// AtlasConfig
// ---------------------------------------------------------------------------

/// Configuration for atlas construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Upper bound for the larger side of a composite atlas, in pixels.
    pub max_dim: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            max_dim: DEFAULT_MAX_DIM,
        }
    }
}

impl AtlasConfig {
    /// Validates that `max_dim` is usable.
    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.max_dim == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_dim must be greater than 0".to_string(),
            ));
        }
        if self.max_dim > 16_384 {
            return Err(AtlasError::InvalidConfig(format!(
                "max_dim {} exceeds 16384",
                self.max_dim
            )));
        }
        Ok(())
    }

    /// Grid shape `(cols, rows)` for `texture_count` textures.
    pub fn grid_for(texture_count: usize) -> (u32, u32) {
        let n = texture_count.max(1) as u32;
        let cols = (n as f64).sqrt().ceil() as u32;
        let rows = n.div_ceil(cols);
        (cols, rows)
    }

    /// Cell side length for a `cols × rows` grid.
    pub fn cell_size(&self, cols: u32, rows: u32) -> u32 {
        self.max_dim / cols.max(rows).max(1)
    }
}

// ---------------------------------------------------------------------------
// AtlasRegion / AtlasLayout
// ---------------------------------------------------------------------------

/// Pixel rectangle of one texture inside the atlas canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasRegion {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl AtlasRegion {
    /// Region covering a whole `width × height` canvas.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            w: width,
            h: height,
        }
    }

    /// Returns `(uv_min, uv_max)` of this region on a canvas of the given size.
    pub fn uv_rect(&self, canvas_width: u32, canvas_height: u32) -> ([f32; 2], [f32; 2]) {
        let cw = canvas_width as f32;
        let ch = canvas_height as f32;
        (
            [self.x as f32 / cw, self.y as f32 / ch],
            [(self.x + self.w) as f32 / cw, (self.y + self.h) as f32 / ch],
        )
    }
}

/// Grid layout of a composite atlas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasLayout {
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// Side length of every cell.
    pub cell_size: u32,
    /// Canvas width (`cols * cell_size`).
    pub canvas_width: u32,
    /// Canvas height (`rows * cell_size`).
    pub canvas_height: u32,
}

// ---------------------------------------------------------------------------
// TextureAtlas
// ---------------------------------------------------------------------------

/// A finished atlas: raster plus per-texture regions.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    /// Grid layout; `None` for a single-texture pass-through.
    pub layout: Option<AtlasLayout>,
    /// Region of each library texture, `None` for skipped textures.
    pub regions: Vec<Option<AtlasRegion>>,
    /// Atlas raster. For a single texture this is the source image itself.
    pub image: Arc<image::RgbaImage>,
    /// Names of library entries that were skipped because they were undecodable.
    pub skipped: Vec<String>,
}

impl TextureAtlas {
    /// Canvas width in pixels.
    pub fn canvas_width(&self) -> u32 {
        self.image.width()
    }

    /// Canvas height in pixels.
    pub fn canvas_height(&self) -> u32 {
        self.image.height()
    }

    /// Region of `texture`, if it was placed.
    pub fn region_for(&self, texture: usize) -> Option<AtlasRegion> {
        self.regions.get(texture).copied().flatten()
    }

    /// Returns `(uv_min, uv_max)` for `texture`, if it was placed.
    pub fn uv_rect(&self, texture: usize) -> Option<([f32; 2], [f32; 2])> {
        self.region_for(texture)
            .map(|r| r.uv_rect(self.canvas_width(), self.canvas_height()))
    }

    /// Returns `true` when several textures were composited.
    pub fn is_composite(&self) -> bool {
        self.layout.is_some()
    }
}

// ---------------------------------------------------------------------------
// AtlasBuilder
// ---------------------------------------------------------------------------

/// Packs a [`TextureLibrary`] into a [`TextureAtlas`].
pub struct AtlasBuilder {
    config: AtlasConfig,
}

impl AtlasBuilder {
    /// Creates a builder, validating the configuration.
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns a reference to the atlas configuration.
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Builds the atlas for `library`.
    pub fn build(&self, library: &TextureLibrary) -> Result<TextureAtlas, AtlasError> {
        match library.len() {
            0 => Err(AtlasError::NoTextures),
            1 => Self::single(library),
            _ => self.composite(library),
        }
    }

    fn single(library: &TextureLibrary) -> Result<TextureAtlas, AtlasError> {
        let asset = library.get(0).ok_or(AtlasError::NoTextures)?;
        let Some(image) = asset.image() else {
            tracing::warn!("Only texture '{}' is undecodable", asset.name());
            return Err(AtlasError::NoTextures);
        };
        Ok(TextureAtlas {
            layout: None,
            regions: vec![Some(AtlasRegion::full(image.width(), image.height()))],
            image: Arc::clone(image),
            skipped: Vec::new(),
        })
    }

    fn composite(&self, library: &TextureLibrary) -> Result<TextureAtlas, AtlasError> {
        let n = library.len();
        let (cols, rows) = AtlasConfig::grid_for(n);
        let cell = self.config.cell_size(cols, rows);
        if cell == 0 {
            return Err(AtlasError::InvalidConfig(format!(
                "max_dim {} too small for a {cols}x{rows} grid",
                self.config.max_dim
            )));
        }
        let layout = AtlasLayout {
            rows,
            cols,
            cell_size: cell,
            canvas_width: cols * cell,
            canvas_height: rows * cell,
        };

        let mut canvas = image::RgbaImage::new(layout.canvas_width, layout.canvas_height);
        let mut regions = Vec::with_capacity(n);
        let mut skipped = Vec::new();

        for (i, asset) in library.iter().enumerate() {
            let Some(source) = asset.image() else {
                tracing::warn!("Skipping undecodable texture '{}' in atlas", asset.name());
                skipped.push(asset.name().to_string());
                regions.push(None);
                continue;
            };

            let tile = if source.width() != cell || source.height() != cell {
                image::imageops::resize(
                    &**source,
                    cell,
                    cell,
                    image::imageops::FilterType::Lanczos3,
                )
            } else {
                (**source).clone()
            };

            let col = i as u32 % cols;
            let row = i as u32 / cols;
            let region = AtlasRegion {
                x: col * cell,
                y: row * cell,
                w: cell,
                h: cell,
            };
            // Straight copy: no blending against the transparent canvas.
            image::imageops::replace(&mut canvas, &tile, i64::from(region.x), i64::from(region.y));
            regions.push(Some(region));
        }

        if skipped.len() == n {
            return Err(AtlasError::NoTextures);
        }

        tracing::debug!(
            "Built {}x{} atlas: {cols}x{rows} grid, {cell}px cells, {} skipped",
            layout.canvas_width,
            layout.canvas_height,
            skipped.len()
        );

        Ok(TextureAtlas {
            layout: Some(layout),
            regions,
            image: Arc::new(canvas),
            skipped,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
