//! Recoverable conditions reported by a rebuild.

use std::fmt;

use crease_mesh::BoundsFallback;

/// A non-fatal condition hit while rebuilding; the session recovered locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionWarning {
    /// The pattern bounding box was flat; a square fallback transform was used.
    DegenerateBounds(BoundsFallback),
    /// No usable textures; the mesh is untextured.
    NoTextures,
    /// Some textures failed to decode and were dropped.
    PartialTextureDecode {
        /// Names of the dropped textures.
        failed: Vec<String>,
    },
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateBounds(fallback) => {
                write!(f, "degenerate pattern bounds, using {fallback:?} fallback")
            }
            Self::NoTextures => write!(f, "no usable textures, falling back to untextured"),
            Self::PartialTextureDecode { failed } => {
                write!(f, "dropped undecodable textures: {}", failed.join(", "))
            }
        }
    }
}
