//! Crease extraction: pairs every fold edge with the two faces it hinges.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::fold::{EdgeAssignment, FoldPattern};

/// Fold direction of a crease.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoldType {
    /// Folds away from the viewer.
    Mountain,
    /// Folds toward the viewer.
    Valley,
    /// Stays flat; stiffens a triangulated facet.
    Facet,
}

/// A hinge between two adjacent faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreaseParams {
    /// The two faces sharing the crease edge.
    pub faces: [usize; 2],
    /// Index into `edges_vertices`.
    pub edge: usize,
    /// Target dihedral angle in radians. Negative for mountain folds.
    pub target_angle: f64,
    /// Fold direction.
    pub fold_type: FoldType,
}

/// Derives crease parameters for every mountain, valley and facet edge that
/// borders exactly two faces.
///
/// Target angles come from `edges_foldAngle` when present, otherwise a full
/// fold (`-π` mountain, `+π` valley, `0` facet). Boundary, cut and unassigned
/// edges produce no crease.
pub fn derive_creases(pattern: &FoldPattern) -> Vec<CreaseParams> {
    let mut edge_faces: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (face, verts) in pattern.faces_vertices().iter().enumerate() {
        for i in 0..verts.len() {
            let a = verts[i];
            let b = verts[(i + 1) % verts.len()];
            edge_faces.entry(edge_key(a, b)).or_default().push(face);
        }
    }

    let angles = pattern.edges_fold_angle();
    let mut creases = Vec::new();

    for (edge, (&[a, b], &assignment)) in pattern
        .edges_vertices()
        .iter()
        .zip(pattern.edges_assignment())
        .enumerate()
    {
        let fold_type = match assignment {
            EdgeAssignment::Mountain => FoldType::Mountain,
            EdgeAssignment::Valley => FoldType::Valley,
            EdgeAssignment::Facet => FoldType::Facet,
            EdgeAssignment::Boundary | EdgeAssignment::Unassigned | EdgeAssignment::Cut => {
                continue;
            }
        };

        let faces = match edge_faces.get(&edge_key(a, b)).map(Vec::as_slice) {
            Some(&[f0, f1]) => [f0, f1],
            other => {
                tracing::warn!(
                    "Crease edge {edge} ({a}-{b}) borders {} faces, expected 2; skipping",
                    other.map_or(0, <[usize]>::len)
                );
                continue;
            }
        };

        let target_angle = match angles {
            Some(angles) => angles[edge].to_radians(),
            None => match fold_type {
                FoldType::Mountain => -PI,
                FoldType::Valley => PI,
                FoldType::Facet => 0.0,
            },
        };

        creases.push(CreaseParams {
            faces,
            edge,
            target_angle,
            fold_type,
        });
    }

    creases
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}
