//! Texturing session: the single owner of pattern, textures, seed and every
//! value derived from them.
//!
//! Face mapping, atlas, transform and UVs are always recomputed together and
//! swapped in as one unit, so the atlas and the UVs can never disagree about
//! the transform they were built from.

mod output;
mod session;
mod warning;

pub use output::RenderOutput;
pub use session::{SessionError, SessionSettings, TexturingSession};
pub use warning::SessionWarning;
