//! The [`TexturingSession`] context object.

use std::path::Path;

use crease_config::Config;
use crease_materials::{
    AtlasBuilder, AtlasConfig, AtlasError, FaceTextureMapping, TextureAtlas, TextureLibrary,
};
use crease_mesh::{
    MeshError, MeshSynchronizer, Transform, UvSettings, compute_transform, map_pattern,
    render_texture_mask,
};
use crease_pattern::{FoldPattern, PatternError, derive_creases};
use crease_seed::SeededRandomSource;
use image::GrayImage;
use thiserror::Error;

use crate::output::RenderOutput;
use crate::warning::SessionWarning;

/// Fatal errors. The session keeps its previous state when one is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The pattern could not be loaded or is malformed.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// The transform could not be computed.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Texture loading or atlas packing failed.
    #[error("atlas error: {0}")]
    Atlas(#[from] AtlasError),
}

/// Tunables for a session, usually taken from [`Config`].
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    /// Atlas packing limits.
    pub atlas: AtlasConfig,
    /// Degenerate-triangle handling for UVs.
    pub uv: UvSettings,
    /// Bounding-sphere radius of the synced mesh.
    pub target_radius: f64,
    /// Seed used until [`TexturingSession::set_seed`] is called.
    pub seed: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            atlas: AtlasConfig {
                max_dim: config.atlas.max_dim,
            },
            uv: UvSettings {
                degenerate_area_epsilon: config.uv.degenerate_area_epsilon,
                perturb_step: config.uv.perturb_step,
            },
            target_radius: config.mesh.target_radius,
            seed: config.assignment.default_seed.clone(),
        }
    }
}

/// Everything derived from (pattern, textures, seed). Replaced as a unit.
struct Derived {
    rng: SeededRandomSource,
    mapping: FaceTextureMapping,
    atlas: Option<TextureAtlas>,
    transform: Transform,
    uvs: Vec<f32>,
    warnings: Vec<SessionWarning>,
}

/// Owns the inputs of the texturing pipeline and all state derived from them.
///
/// Any change to the pattern, the texture set or the seed recomputes the
/// mapping, atlas, transform and UVs together and then syncs the mesh.
pub struct TexturingSession {
    settings: SessionSettings,
    atlas_builder: AtlasBuilder,
    pattern: Option<FoldPattern>,
    library: TextureLibrary,
    /// Names dropped from a library that still had decodable textures.
    decode_failures: Vec<String>,
    seed: String,
    derived: Option<Derived>,
    mesh: MeshSynchronizer,
}

impl TexturingSession {
    /// Creates an empty session. Fails only on an invalid atlas configuration.
    pub fn new(settings: SessionSettings) -> Result<Self, SessionError> {
        let atlas_builder = AtlasBuilder::new(settings.atlas.clone())?;
        Ok(Self {
            mesh: MeshSynchronizer::new(settings.target_radius),
            seed: settings.seed.clone(),
            settings,
            atlas_builder,
            pattern: None,
            library: TextureLibrary::default(),
            decode_failures: Vec::new(),
            derived: None,
        })
    }

    /// Creates a session from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        Self::new(SessionSettings::from(config))
    }

    /// Replaces the pattern and rebuilds.
    pub fn set_pattern(&mut self, pattern: FoldPattern) -> Result<(), SessionError> {
        let derived = self.derive(&pattern, &self.library, &self.decode_failures, &self.seed)?;
        self.commit(pattern, derived);
        Ok(())
    }

    /// Parses FOLD JSON and installs it as the pattern.
    ///
    /// A malformed document leaves the session untouched.
    pub fn load_pattern_json(&mut self, json: &str) -> Result<(), SessionError> {
        let pattern = FoldPattern::from_json(json)?;
        self.set_pattern(pattern)
    }

    /// Loads a FOLD file and installs it as the pattern.
    pub fn load_pattern(&mut self, path: &Path) -> Result<(), SessionError> {
        let pattern = FoldPattern::load(path)?;
        self.set_pattern(pattern)
    }

    /// Replaces the texture set and rebuilds.
    ///
    /// Undecodable textures are dropped and reported as
    /// [`SessionWarning::PartialTextureDecode`]. When none are left the
    /// rebuild reports only [`SessionWarning::NoTextures`].
    pub fn set_textures(&mut self, mut library: TextureLibrary) -> Result<(), SessionError> {
        let failed = match library.check_decoded() {
            Ok(()) => Vec::new(),
            Err(AtlasError::PartialTextureDecode { failed, remaining }) => {
                tracing::debug!("{remaining} decodable texture(s) kept");
                failed
            }
            Err(AtlasError::NoTextures) => {
                let dropped = library.undecodable_names();
                if !dropped.is_empty() {
                    tracing::debug!("No decodable textures among: {}", dropped.join(", "));
                }
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        library.retain_decodable();
        if let Some(pattern) = self.pattern.take() {
            let result = self.derive(&pattern, &library, &failed, &self.seed);
            match result {
                Ok(derived) => {
                    self.library = library;
                    self.decode_failures = failed;
                    self.commit(pattern, derived);
                }
                Err(e) => {
                    self.pattern = Some(pattern);
                    return Err(e);
                }
            }
        } else {
            self.library = library;
            self.decode_failures = failed;
        }
        Ok(())
    }

    /// Loads every texture in `dir` and installs the set.
    pub fn load_textures(&mut self, dir: &Path) -> Result<(), SessionError> {
        let library = TextureLibrary::load_dir(dir)?;
        self.set_textures(library)
    }

    /// Changes the assignment seed and rebuilds.
    pub fn set_seed(&mut self, seed: impl Into<String>) -> Result<(), SessionError> {
        let seed = seed.into();
        if let Some(pattern) = self.pattern.take() {
            match self.derive(&pattern, &self.library, &self.decode_failures, &seed) {
                Ok(derived) => {
                    self.seed = seed;
                    self.commit(pattern, derived);
                }
                Err(e) => {
                    self.pattern = Some(pattern);
                    return Err(e);
                }
            }
        } else {
            self.seed = seed;
        }
        Ok(())
    }

    /// Recomputes everything from the current inputs.
    pub fn rebuild(&mut self) -> Result<(), SessionError> {
        let Some(pattern) = self.pattern.take() else {
            return Ok(());
        };
        match self.derive(&pattern, &self.library, &self.decode_failures, &self.seed) {
            Ok(derived) => {
                self.commit(pattern, derived);
                Ok(())
            }
            Err(e) => {
                self.pattern = Some(pattern);
                Err(e)
            }
        }
    }

    fn derive(
        &self,
        pattern: &FoldPattern,
        library: &TextureLibrary,
        decode_failures: &[String],
        seed: &str,
    ) -> Result<Derived, SessionError> {
        let mut warnings = Vec::new();
        if !decode_failures.is_empty() {
            warnings.push(SessionWarning::PartialTextureDecode {
                failed: decode_failures.to_vec(),
            });
        }

        let mut rng = SeededRandomSource::new(seed);
        let mapping = crease_materials::assign(pattern.face_count(), library.len(), &mut rng);

        let atlas = match self.atlas_builder.build(library) {
            Ok(atlas) => Some(atlas),
            Err(AtlasError::NoTextures) => {
                warnings.push(SessionWarning::NoTextures);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let (width, height) = atlas.as_ref().map_or(
            (self.settings.atlas.max_dim, self.settings.atlas.max_dim),
            |a| (a.canvas_width(), a.canvas_height()),
        );
        let transform = compute_transform(pattern.vertices_coords(), width, height)?;
        if let Some(fallback) = transform.fallback {
            warnings.push(SessionWarning::DegenerateBounds(fallback));
        }

        let uvs = map_pattern(pattern, &mapping, atlas.as_ref(), &transform, &self.settings.uv);

        Ok(Derived {
            rng,
            mapping,
            atlas,
            transform,
            uvs,
            warnings,
        })
    }

    fn commit(&mut self, pattern: FoldPattern, derived: Derived) {
        for warning in &derived.warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            "Rebuilt session: {} faces, {} textures, seed '{}'",
            pattern.face_count(),
            self.library.len(),
            derived.rng.seed()
        );
        let creases = derive_creases(&pattern);
        self.mesh.sync(pattern.clone(), creases);
        self.pattern = Some(pattern);
        self.derived = Some(derived);
    }

    /// Current pattern, if one was set.
    pub fn pattern(&self) -> Option<&FoldPattern> {
        self.pattern.as_ref()
    }

    /// Decodable textures in the current set.
    pub fn textures(&self) -> &TextureLibrary {
        &self.library
    }

    /// Current seed string.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Settings the session was created with.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Random source after the last assignment's draws.
    pub fn rng(&self) -> Option<&SeededRandomSource> {
        self.derived.as_ref().map(|d| &d.rng)
    }

    /// Face-to-texture mapping of the last rebuild.
    pub fn mapping(&self) -> Option<&FaceTextureMapping> {
        self.derived.as_ref().map(|d| &d.mapping)
    }

    /// Current atlas; `None` when untextured or before the first rebuild.
    pub fn atlas(&self) -> Option<&TextureAtlas> {
        self.derived.as_ref().and_then(|d| d.atlas.as_ref())
    }

    /// Transform shared by the UVs and the face masks.
    pub fn transform(&self) -> Option<&Transform> {
        self.derived.as_ref().map(|d| &d.transform)
    }

    /// UV buffer, 2 floats per vertex.
    pub fn uvs(&self) -> &[f32] {
        self.derived.as_ref().map_or(&[], |d| d.uvs.as_slice())
    }

    /// Warnings raised by the last successful rebuild.
    pub fn warnings(&self) -> &[SessionWarning] {
        self.derived.as_ref().map_or(&[], |d| d.warnings.as_slice())
    }

    /// Mesh synchronizer holding the render buffers.
    pub fn mesh(&self) -> &MeshSynchronizer {
        &self.mesh
    }

    /// Mask of the faces assigned to `texture`, through the shared transform.
    ///
    /// `None` before the first rebuild or when `texture` has no atlas region.
    pub fn texture_mask(&self, texture: usize) -> Option<GrayImage> {
        let pattern = self.pattern.as_ref()?;
        let derived = self.derived.as_ref()?;
        let region = derived.atlas.as_ref()?.region_for(texture)?;
        Some(render_texture_mask(
            pattern,
            &derived.mapping,
            texture,
            &derived.transform,
            &region,
        ))
    }

    /// Buffers for a renderer; `None` until a pattern has been set.
    pub fn render_output(&self) -> Option<RenderOutput<'_>> {
        let derived = self.derived.as_ref()?;
        let buffers = self.mesh.buffers();
        Some(RenderOutput {
            positions: &buffers.positions,
            uvs: &derived.uvs,
            indices: &buffers.indices,
            edge_lines: &buffers.edge_lines,
            regions: derived.atlas.as_ref().map_or(&[], |a| a.regions.as_slice()),
            atlas_image: derived.atlas.as_ref().map(|a| &*a.image),
        })
    }
}
