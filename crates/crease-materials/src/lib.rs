//! Texture side of the pipeline: the texture library, seeded face-to-texture
//! assignment, and the atlas that composites several textures into one raster.

mod assignment;
mod atlas;
mod texture;

pub use assignment::{FaceTextureMapping, assign, base_assignment, shuffle};
pub use atlas::{
    AtlasBuilder, AtlasConfig, AtlasError, AtlasLayout, AtlasRegion, DEFAULT_MAX_DIM, TextureAtlas,
};
pub use texture::{TextureAsset, TextureLibrary, TexturePixels};
