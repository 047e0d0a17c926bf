//! End-to-end checks across seed, materials, mesh and session.

use std::sync::Arc;

use crease_materials::{AtlasConfig, TextureAsset, TextureLibrary, base_assignment};
use crease_mesh::{MeshSynchronizer, SyncState, compute_transform};
use crease_pattern::{FoldPattern, derive_creases};
use crease_session::{SessionSettings, SessionWarning, TexturingSession};
use glam::DVec3;

/// Triangle strip with `faces` triangles over two rows of vertices.
fn strip(faces: usize) -> FoldPattern {
    let vertices = (0..faces + 2)
        .map(|k| DVec3::new((k / 2) as f64, 0.0, (k % 2) as f64))
        .collect();
    let triangles = (0..faces).map(|k| vec![k, k + 1, k + 2]).collect();
    FoldPattern::new(vertices, triangles, Vec::new(), Vec::new()).unwrap()
}

fn library(count: usize) -> TextureLibrary {
    TextureLibrary::new((0..count).map(|i| {
        let shade = (i * 40) as u8;
        TextureAsset::from_image(
            format!("tex{i:02}"),
            image::RgbaImage::from_pixel(8, 8, image::Rgba([shade, 255 - shade, 0, 255])),
        )
    }))
}

fn session(max_dim: u32) -> TexturingSession {
    TexturingSession::new(SessionSettings {
        atlas: AtlasConfig { max_dim },
        ..SessionSettings::default()
    })
    .unwrap()
}

#[test]
fn test_golden_assignment_through_session() {
    let mut s = session(64);
    s.set_textures(library(3)).unwrap();
    s.set_seed("origami-2024").unwrap();
    s.set_pattern(strip(10)).unwrap();
    assert_eq!(
        s.mapping().unwrap().as_slice(),
        &[0, 2, 2, 1, 0, 1, 2, 0, 0, 1],
        "Worked example must be reproduced exactly"
    );
}

#[test]
fn test_assignment_deterministic_across_sessions() {
    let build = || {
        let mut s = session(64);
        s.set_textures(library(4)).unwrap();
        s.set_seed("kite-base").unwrap();
        s.set_pattern(strip(17)).unwrap();
        s
    };
    let (a, b) = (build(), build());
    assert_eq!(a.mapping(), b.mapping());
    assert_eq!(a.uvs(), b.uvs());
}

#[test]
fn test_assignment_is_permutation_with_full_coverage() {
    let mut s = session(64);
    s.set_textures(library(5)).unwrap();
    s.set_pattern(strip(13)).unwrap();
    let mapping = s.mapping().unwrap();

    let mut sorted = mapping.as_slice().to_vec();
    sorted.sort_unstable();
    let mut expected = base_assignment(13, 5);
    expected.sort_unstable();
    assert_eq!(sorted, expected, "Shuffle must preserve the multiset");
    assert!(
        mapping.usage_counts(5).iter().all(|&c| c >= 1),
        "Every texture must be used when F >= T"
    );
}

#[test]
fn test_uvs_stay_in_unit_square() {
    let mut s = session(128);
    s.set_textures(library(7)).unwrap();
    s.set_seed("bounds").unwrap();
    s.set_pattern(strip(21)).unwrap();
    let uvs = s.uvs();
    assert_eq!(uvs.len(), 2 * 23);
    assert!(uvs.iter().all(|&c| (0.0..=1.0).contains(&c)), "{uvs:?}");
}

#[test]
fn test_degenerate_face_uvs_identical() {
    // Face 1 is a sliver along the top edge and is processed last.
    let pattern = FoldPattern::from_json(
        r#"{
            "vertices_coords": [[0, 0], [1, 0], [1, 1], [2, 1], [3, 1], [4, 1]],
            "faces_vertices": [[0, 1, 2], [3, 4, 5]]
        }"#,
    )
    .unwrap();
    let mut s = session(64);
    s.set_textures(library(2)).unwrap();
    s.set_pattern(pattern).unwrap();
    let uvs = s.uvs();
    let corner = |v: usize| [uvs[v * 2], uvs[v * 2 + 1]];
    assert_eq!(corner(3), corner(4));
    assert_eq!(corner(4), corner(5));
}

#[test]
fn test_transform_shared_and_idempotent() {
    let mut s = session(64);
    s.set_textures(library(3)).unwrap();
    s.set_pattern(strip(6)).unwrap();

    let atlas = s.atlas().unwrap();
    let pattern = s.pattern().unwrap();
    let recomputed =
        compute_transform(pattern.vertices_coords(), atlas.canvas_width(), atlas.canvas_height())
            .unwrap();
    assert_eq!(s.transform(), Some(&recomputed), "UVs and atlas share one transform");

    let transform = *s.transform().unwrap();
    s.rebuild().unwrap();
    assert_eq!(s.transform(), Some(&transform), "Rebuild without changes is idempotent");
}

#[test]
fn test_single_texture_is_not_composited() {
    let textures = library(1);
    let source = Arc::clone(textures.get(0).unwrap().image().unwrap());
    let mut s = session(2048);
    s.set_textures(textures).unwrap();
    s.set_pattern(strip(4)).unwrap();

    let atlas = s.atlas().unwrap();
    assert!(!atlas.is_composite());
    assert!(Arc::ptr_eq(&atlas.image, &source), "Texture must pass through untouched");
    let region = atlas.region_for(0).unwrap();
    assert_eq!((region.x, region.y, region.w, region.h), (0, 0, 8, 8));
    assert!(s.warnings().is_empty());
}

#[test]
fn test_mesh_normalized_to_unit_radius() {
    let mut s = session(64);
    s.set_pattern(strip(9)).unwrap();
    let out = s.render_output().unwrap();
    let radius = out
        .positions
        .chunks_exact(3)
        .map(|p| glam::Vec3::from_slice(p).length())
        .fold(0.0_f32, f32::max);
    assert!((radius - 1.0).abs() < 1e-6, "radius was {radius}");
    assert_eq!(out.indices.len(), 9 * 3);
    assert_eq!(s.warnings(), &[SessionWarning::NoTextures]);
}

#[test]
fn test_queued_syncs_last_write_wins() {
    let mut sync = MeshSynchronizer::default();
    let first = strip(2);
    let second = strip(5);
    sync.request_sync(first.clone(), derive_creases(&first));
    sync.request_sync(second.clone(), derive_creases(&second));
    assert_eq!(sync.state(), SyncState::PendingSync);

    assert!(sync.tick());
    assert_eq!(sync.pattern(), Some(&second));
    assert_eq!(sync.state(), SyncState::Idle);
    assert!(!sync.tick(), "The superseded request must not run");
}

#[test]
fn test_render_output_serializes() {
    let mut s = session(64);
    s.set_textures(library(2)).unwrap();
    s.set_pattern(strip(3)).unwrap();
    let json = serde_json::to_value(s.render_output().unwrap()).unwrap();
    assert_eq!(json["positions"].as_array().unwrap().len(), 5 * 3);
    assert_eq!(json["uvs"].as_array().unwrap().len(), 5 * 2);
    assert_eq!(json["regions"].as_array().unwrap().len(), 2);
    assert!(json.get("atlas_image").is_none());
}
