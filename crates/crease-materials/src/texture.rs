//! Source textures and the name-sorted texture library.

use std::path::Path;
use std::sync::Arc;

use crate::atlas::AtlasError;

/// File extensions picked up by [`TextureLibrary::load_dir`].
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

// ---------------------------------------------------------------------------
// TextureAsset
// ---------------------------------------------------------------------------

/// Pixel payload of a texture.
#[derive(Clone, Debug)]
pub enum TexturePixels {
    /// Decoded RGBA8 pixels, shared so single-texture atlases reuse them.
    Decoded(Arc<image::RgbaImage>),
    /// The source bytes could not be decoded.
    Undecodable {
        /// Decoder error message.
        reason: String,
    },
}

/// A named source texture.
#[derive(Clone, Debug)]
pub struct TextureAsset {
    name: String,
    pixels: TexturePixels,
}

impl TextureAsset {
    /// Wraps an already-decoded image.
    pub fn from_image(name: impl Into<String>, image: image::RgbaImage) -> Self {
        Self {
            name: name.into(),
            pixels: TexturePixels::Decoded(Arc::new(image)),
        }
    }

    /// Decodes encoded image bytes (PNG, JPEG).
    ///
    /// Decoding failures are kept as [`TexturePixels::Undecodable`] rather
    /// than returned, so one corrupt file doesn't sink the whole library.
    pub fn from_encoded(name: impl Into<String>, bytes: &[u8]) -> Self {
        let name = name.into();
        let pixels = match image::load_from_memory(bytes) {
            Ok(img) => TexturePixels::Decoded(Arc::new(img.to_rgba8())),
            Err(err) => {
                tracing::warn!("Texture '{name}' failed to decode: {err}");
                TexturePixels::Undecodable {
                    reason: err.to_string(),
                }
            }
        };
        Self { name, pixels }
    }

    /// Texture name (file name when loaded from disk).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel payload.
    pub fn pixels(&self) -> &TexturePixels {
        &self.pixels
    }

    /// Decoded image, if decoding succeeded.
    pub fn image(&self) -> Option<&Arc<image::RgbaImage>> {
        match &self.pixels {
            TexturePixels::Decoded(img) => Some(img),
            TexturePixels::Undecodable { .. } => None,
        }
    }

    /// Returns `true` when pixels are available.
    pub fn is_decodable(&self) -> bool {
        self.image().is_some()
    }

    /// Width in pixels, 0 when undecodable.
    pub fn width(&self) -> u32 {
        self.image().map_or(0, |img| img.width())
    }

    /// Height in pixels, 0 when undecodable.
    pub fn height(&self) -> u32 {
        self.image().map_or(0, |img| img.height())
    }
}

// ---------------------------------------------------------------------------
// TextureLibrary
// ---------------------------------------------------------------------------

/// Ordered, deduplicated texture set.
///
/// Order is by name so library indices do not depend on the order files
/// were supplied in.
#[derive(Clone, Debug, Default)]
pub struct TextureLibrary {
    assets: Vec<TextureAsset>,
}

impl TextureLibrary {
    /// Builds a library: sorts by name and keeps the first asset of each name.
    pub fn new(assets: impl IntoIterator<Item = TextureAsset>) -> Self {
        let mut assets: Vec<TextureAsset> = assets.into_iter().collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        let before = assets.len();
        assets.dedup_by(|later, first| later.name == first.name);
        if assets.len() != before {
            tracing::debug!(
                "Dropped {} duplicate texture name(s)",
                before - assets.len()
            );
        }
        Self { assets }
    }

    /// Loads every PNG/JPEG file directly inside `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, AtlasError> {
        let mut assets = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_image || !path.is_file() {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bytes = std::fs::read(&path)?;
            assets.push(TextureAsset::from_encoded(name, &bytes));
        }
        let library = Self::new(assets);
        tracing::info!("Loaded {} texture(s) from {}", library.len(), dir.display());
        Ok(library)
    }

    /// Number of textures, decodable or not.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` when the library holds no textures.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Texture at `index`.
    pub fn get(&self, index: usize) -> Option<&TextureAsset> {
        self.assets.get(index)
    }

    /// Library index of the texture called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.assets
            .binary_search_by(|asset| asset.name.as_str().cmp(name))
            .ok()
    }

    /// Iterates textures in library order.
    pub fn iter(&self) -> impl Iterator<Item = &TextureAsset> {
        self.assets.iter()
    }

    /// Names of textures that failed to decode.
    pub fn undecodable_names(&self) -> Vec<String> {
        self.assets
            .iter()
            .filter(|a| !a.is_decodable())
            .map(|a| a.name.clone())
            .collect()
    }

    /// Reports the decode health of the library.
    ///
    /// `PartialTextureDecode` when some textures are undecodable, escalating
    /// to `NoTextures` when none are usable.
    pub fn check_decoded(&self) -> Result<(), AtlasError> {
        let failed = self.undecodable_names();
        let remaining = self.len() - failed.len();
        if remaining == 0 {
            return Err(AtlasError::NoTextures);
        }
        if !failed.is_empty() {
            return Err(AtlasError::PartialTextureDecode { failed, remaining });
        }
        Ok(())
    }

    /// Drops undecodable textures, returning their names.
    pub fn retain_decodable(&mut self) -> Vec<String> {
        let failed = self.undecodable_names();
        self.assets.retain(TextureAsset::is_decodable);
        failed
    }
}
