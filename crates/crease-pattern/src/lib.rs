//! Crease pattern data model: FOLD import, validation, triangulation, and crease extraction.

mod crease;
mod error;
mod fold;

pub use crease::{CreaseParams, FoldType, derive_creases};
pub use error::PatternError;
pub use fold::{EdgeAssignment, FoldFile, FoldPattern};
