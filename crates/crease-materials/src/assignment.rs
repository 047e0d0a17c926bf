//! Seeded face-to-texture assignment.
//!
//! Builds a base array that contains every texture index at least once (when
//! there are enough faces), then shuffles it with Fisher–Yates driven by a
//! [`SeededRandomSource`]. The shuffle only reorders, so coverage survives.

use crease_seed::SeededRandomSource;

/// Total mapping from face index to texture-library index.
///
/// Rebuilt from scratch whenever the pattern, the library or the seed
/// changes; never patched in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceTextureMapping {
    textures: Vec<usize>,
}

impl FaceTextureMapping {
    /// Texture index assigned to `face`, or `None` past the end.
    pub fn texture_for(&self, face: usize) -> Option<usize> {
        self.textures.get(face).copied()
    }

    /// Number of faces covered.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns `true` when no face is mapped.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture indices in face order.
    pub fn as_slice(&self) -> &[usize] {
        &self.textures
    }

    /// Iterates `(face, texture)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.textures.iter().copied().enumerate()
    }

    /// How many faces use each texture.
    pub fn usage_counts(&self, texture_count: usize) -> Vec<usize> {
        let mut counts = vec![0; texture_count];
        for &t in &self.textures {
            if let Some(c) = counts.get_mut(t) {
                *c += 1;
            }
        }
        counts
    }

    /// Faces assigned to `texture`, in ascending order.
    pub fn faces_with(&self, texture: usize) -> impl Iterator<Item = usize> + '_ {
        self.iter()
            .filter(move |&(_, t)| t == texture)
            .map(|(face, _)| face)
    }
}

/// Unshuffled assignment: `0..texture_count` first (when it fits), then
/// `i mod texture_count`.
///
/// With fewer faces than textures the trailing textures go unused.
pub fn base_assignment(face_count: usize, texture_count: usize) -> Vec<usize> {
    if texture_count == 0 {
        return Vec::new();
    }
    // `i mod T` already yields 0..T for the first T slots; the two cases in
    // the contract collapse to the same sequence.
    (0..face_count).map(|i| i % texture_count).collect()
}

/// In-place Fisher–Yates shuffle from the back.
pub fn shuffle(values: &mut [usize], rng: &mut SeededRandomSource) {
    for i in (1..values.len()).rev() {
        // next_f64 can return exactly 1.0.
        let j = ((rng.next_f64() * (i + 1) as f64).floor() as usize).min(i);
        values.swap(i, j);
    }
}

/// Assigns a texture to each of `face_count` faces.
///
/// When `face_count >= texture_count` every texture appears at least once.
/// `texture_count == 0` produces an empty mapping.
pub fn assign(
    face_count: usize,
    texture_count: usize,
    rng: &mut SeededRandomSource,
) -> FaceTextureMapping {
    let mut textures = base_assignment(face_count, texture_count);
    shuffle(&mut textures, rng);
    if face_count < texture_count {
        tracing::debug!(
            "{face_count} faces for {texture_count} textures: {} textures unused",
            texture_count - face_count
        );
    }
    FaceTextureMapping { textures }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_worked_example_golden_assignment() {
        let mut rng = SeededRandomSource::new("origami-2024");
        let mapping = assign(10, 3, &mut rng);
        assert_eq!(mapping.len(), 10);
        assert_eq!(mapping.as_slice(), &[0, 2, 2, 1, 0, 1, 2, 0, 0, 1]);
        assert!(mapping.usage_counts(3).iter().all(|&c| c >= 1));
    }

    #[test]
    fn test_same_seed_same_mapping() {
        let a = assign(57, 5, &mut SeededRandomSource::new("crane"));
        let b = assign(57, 5, &mut SeededRandomSource::new("crane"));
        assert_eq!(a, b, "Identical inputs must yield identical mappings");
    }

    #[test]
    fn test_full_coverage_when_faces_outnumber_textures() {
        for seed in ["a", "b", "kabuto", "tsuru", "origami-2024"] {
            for textures in 1..=8 {
                for faces in textures..textures + 12 {
                    let mapping = assign(faces, textures, &mut SeededRandomSource::new(seed));
                    let counts = mapping.usage_counts(textures);
                    assert!(
                        counts.iter().all(|&c| c >= 1),
                        "seed={seed} F={faces} T={textures}: missing texture in {counts:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let base = base_assignment(23, 4);
        let mut shuffled = base.clone();
        shuffle(&mut shuffled, &mut SeededRandomSource::new("permute"));
        assert_eq!(sorted(base), sorted(shuffled));
    }

    #[test]
    fn test_fewer_faces_than_textures_leaves_some_unused() {
        let mapping = assign(2, 4, &mut SeededRandomSource::new("x"));
        assert_eq!(mapping.as_slice(), &[1, 0]);
        let counts = mapping.usage_counts(4);
        assert_eq!(counts, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_zero_textures_gives_empty_mapping() {
        let mapping = assign(12, 0, &mut SeededRandomSource::new("empty"));
        assert!(mapping.is_empty());
        assert_eq!(mapping.texture_for(0), None);
    }

    #[test]
    fn test_base_assignment_starts_with_every_texture() {
        assert_eq!(base_assignment(7, 3), vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_faces_with_lists_assigned_faces() {
        let mapping = assign(6, 4, &mut SeededRandomSource::new("panels"));
        assert_eq!(mapping.as_slice(), &[1, 1, 0, 2, 0, 3]);
        assert_eq!(mapping.faces_with(1).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(mapping.faces_with(3).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_rng_advances_once_per_swap() {
        let mut rng = SeededRandomSource::new("count");
        let _ = assign(9, 2, &mut rng);
        let mut reference = SeededRandomSource::new("count");
        for _ in 0..8 {
            reference.step();
        }
        assert_eq!(rng.state(), reference.state());
    }
}
