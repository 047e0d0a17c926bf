//! Geometry side of the pipeline: the shared pattern-to-atlas transform, face
//! masks, per-face UV mapping, and render buffer synchronization.

pub mod mask;
pub mod sync;
pub mod transform;
pub mod uv;

mod error;

pub use error::MeshError;
pub use mask::render_texture_mask;
pub use sync::{Beam, EdgeLineBuffers, MeshBuffers, MeshSynchronizer, Node, SyncState};
pub use transform::{BoundsFallback, Transform, compute_transform};
pub use uv::{UvSettings, map_face, map_pattern};
