//! Render buffer synchronization.
//!
//! [`MeshSynchronizer`] turns a [`FoldPattern`] plus its creases into the
//! buffers a renderer uploads: positions, triangle indices, and one line
//! index buffer per edge assignment. Every rebuild throws away the previous
//! nodes, beams and creases, and normalizes the result so its bounding
//! sphere has the configured radius.

use crease_pattern::{CreaseParams, EdgeAssignment, FoldPattern};
use glam::DVec3;
use serde::Serialize;

/// Radius below which a pattern is treated as a single point and not rescaled.
const MIN_RADIUS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Simulation objects
// ---------------------------------------------------------------------------

/// A vertex of the synchronized mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Index into `vertices_coords`.
    pub index: usize,
    /// Normalized position.
    pub position: DVec3,
}

/// An edge of the synchronized mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beam {
    /// Index into `edges_vertices`.
    pub edge: usize,
    /// The two node indices.
    pub nodes: [usize; 2],
    /// Fold classification.
    pub assignment: EdgeAssignment,
}

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

/// Line index buffers, one per [`EdgeAssignment`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EdgeLineBuffers {
    /// Mountain fold lines.
    pub mountain: Vec<u32>,
    /// Valley fold lines.
    pub valley: Vec<u32>,
    /// Paper boundary lines.
    pub boundary: Vec<u32>,
    /// Triangulation facet lines.
    pub facet: Vec<u32>,
    /// Unassigned crease lines.
    pub unassigned: Vec<u32>,
    /// Cut lines.
    pub cut: Vec<u32>,
}

impl EdgeLineBuffers {
    /// The buffer holding lines of `assignment`.
    pub fn get(&self, assignment: EdgeAssignment) -> &[u32] {
        match assignment {
            EdgeAssignment::Mountain => &self.mountain,
            EdgeAssignment::Valley => &self.valley,
            EdgeAssignment::Boundary => &self.boundary,
            EdgeAssignment::Facet => &self.facet,
            EdgeAssignment::Unassigned => &self.unassigned,
            EdgeAssignment::Cut => &self.cut,
        }
    }

    fn get_mut(&mut self, assignment: EdgeAssignment) -> &mut Vec<u32> {
        match assignment {
            EdgeAssignment::Mountain => &mut self.mountain,
            EdgeAssignment::Valley => &mut self.valley,
            EdgeAssignment::Boundary => &mut self.boundary,
            EdgeAssignment::Facet => &mut self.facet,
            EdgeAssignment::Unassigned => &mut self.unassigned,
            EdgeAssignment::Cut => &mut self.cut,
        }
    }

    /// Total number of line segments across all buffers.
    pub fn segment_count(&self) -> usize {
        EdgeAssignment::ALL
            .iter()
            .map(|&a| self.get(a).len() / 2)
            .sum()
    }
}

/// GPU-ready buffers produced by a sync pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MeshBuffers {
    /// Positions, 3 floats per vertex.
    pub positions: Vec<f32>,
    /// Triangle indices, 3 per triangle.
    pub indices: Vec<u32>,
    /// Classified edge lines, 2 indices per segment.
    pub edge_lines: EdgeLineBuffers,
}

impl MeshBuffers {
    /// Number of vertices in the position buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles in the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// Lifecycle of the synchronizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing queued.
    #[default]
    Idle,
    /// A pattern is waiting in the pending slot.
    PendingSync,
    /// A rebuild is running.
    Syncing,
}

struct PendingSync {
    pattern: FoldPattern,
    creases: Vec<CreaseParams>,
    version: u64,
}

// ---------------------------------------------------------------------------
// MeshSynchronizer
// ---------------------------------------------------------------------------

/// Rebuilds render buffers from a crease pattern, last-write-wins.
pub struct MeshSynchronizer {
    state: SyncState,
    pending: Option<PendingSync>,
    /// Version of the most recent request.
    requested_version: u64,
    /// Version of the pattern currently in the buffers.
    synced_version: u64,
    target_radius: f64,
    pattern: Option<FoldPattern>,
    nodes: Vec<Node>,
    beams: Vec<Beam>,
    creases: Vec<CreaseParams>,
    buffers: MeshBuffers,
    center: DVec3,
    scale: f64,
}

impl MeshSynchronizer {
    /// Creates an idle synchronizer that normalizes to `target_radius`.
    pub fn new(target_radius: f64) -> Self {
        Self {
            state: SyncState::Idle,
            pending: None,
            requested_version: 0,
            synced_version: 0,
            target_radius,
            pattern: None,
            nodes: Vec::new(),
            beams: Vec::new(),
            creases: Vec::new(),
            buffers: MeshBuffers::default(),
            center: DVec3::ZERO,
            scale: 1.0,
        }
    }

    /// Queues `pattern` for the next [`tick`](Self::tick).
    ///
    /// Overwrites anything already pending; a superseded pattern is dropped.
    pub fn request_sync(&mut self, pattern: FoldPattern, creases: Vec<CreaseParams>) {
        self.requested_version += 1;
        if let Some(old) = self.pending.take() {
            tracing::debug!(
                "Discarding superseded sync request v{} in favour of v{}",
                old.version,
                self.requested_version
            );
        }
        self.pending = Some(PendingSync {
            pattern,
            creases,
            version: self.requested_version,
        });
        if self.state == SyncState::Idle {
            self.state = SyncState::PendingSync;
        }
    }

    /// Applies the pending pattern, if any. Returns `true` when a rebuild ran.
    pub fn tick(&mut self) -> bool {
        let Some(job) = self.pending.take() else {
            return false;
        };
        self.state = SyncState::Syncing;
        self.rebuild(job.pattern, job.creases);
        self.synced_version = job.version;
        self.state = if self.pending.is_some() {
            SyncState::PendingSync
        } else {
            SyncState::Idle
        };
        true
    }

    /// Queues `pattern` and applies it immediately.
    pub fn sync(&mut self, pattern: FoldPattern, creases: Vec<CreaseParams>) {
        self.request_sync(pattern, creases);
        self.tick();
    }

    fn rebuild(&mut self, pattern: FoldPattern, creases: Vec<CreaseParams>) {
        self.nodes.clear();
        self.beams.clear();
        self.creases.clear();

        let coords = pattern.vertices_coords();
        let (center, radius) = bounding_sphere(coords);
        self.center = center;
        self.scale = if radius > MIN_RADIUS {
            self.target_radius / radius
        } else {
            tracing::warn!("Pattern has zero extent; skipping scale normalization");
            1.0
        };

        self.nodes.extend(coords.iter().enumerate().map(|(index, &p)| Node {
            index,
            position: (p - self.center) * self.scale,
        }));

        self.beams.extend(
            pattern
                .edges_vertices()
                .iter()
                .zip(pattern.edges_assignment())
                .enumerate()
                .map(|(edge, (&nodes, &assignment))| Beam {
                    edge,
                    nodes,
                    assignment,
                }),
        );

        let face_count = pattern.face_count();
        for crease in creases {
            if crease.faces.iter().any(|&f| f >= face_count) {
                tracing::warn!(
                    "Crease on edge {} references faces {:?} outside 0..{face_count}; dropped",
                    crease.edge,
                    crease.faces
                );
                continue;
            }
            self.creases.push(crease);
        }

        let mut buffers = MeshBuffers {
            positions: Vec::with_capacity(self.nodes.len() * 3),
            indices: Vec::new(),
            edge_lines: EdgeLineBuffers::default(),
        };
        for node in &self.nodes {
            buffers.positions.extend_from_slice(&node.position.as_vec3().to_array());
        }
        for (_, tri) in pattern.triangles() {
            buffers.indices.extend(tri.iter().map(|&i| i as u32));
        }
        for beam in &self.beams {
            buffers
                .edge_lines
                .get_mut(beam.assignment)
                .extend(beam.nodes.iter().map(|&i| i as u32));
        }
        self.buffers = buffers;

        tracing::debug!(
            "Synced mesh: {} nodes, {} beams, {} creases, {} triangles",
            self.nodes.len(),
            self.beams.len(),
            self.creases.len(),
            self.buffers.triangle_count()
        );

        self.pattern = Some(pattern);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Returns `true` when a request has not been applied yet.
    pub fn is_stale(&self) -> bool {
        self.synced_version != self.requested_version
    }

    /// The pattern currently reflected in the buffers.
    pub fn pattern(&self) -> Option<&FoldPattern> {
        self.pattern.as_ref()
    }

    /// Nodes of the current mesh.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Beams of the current mesh.
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    /// Creases of the current mesh.
    pub fn creases(&self) -> &[CreaseParams] {
        &self.creases
    }

    /// Render buffers of the current mesh.
    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Center subtracted during normalization, in pattern units.
    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Scale applied during normalization.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for MeshSynchronizer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Bounding-box center and the largest distance from it.
pub fn bounding_sphere(points: &[DVec3]) -> (DVec3, f64) {
    if points.is_empty() {
        return (DVec3::ZERO, 0.0);
    }
    let (min, max) = points
        .iter()
        .fold((DVec3::INFINITY, DVec3::NEG_INFINITY), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        });
    let center = (min + max) * 0.5;
    let radius = points
        .iter()
        .map(|p| p.distance(center))
        .fold(0.0_f64, f64::max);
    (center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_pattern::derive_creases;

    fn square(size: f64) -> FoldPattern {
        let json = format!(
            r#"{{
                "vertices_coords": [[0, 0], [{size}, 0], [{size}, {size}], [0, {size}]],
                "faces_vertices": [[0, 1, 2], [0, 2, 3]],
                "edges_vertices": [[0, 1], [1, 2], [2, 3], [3, 0], [0, 2]],
                "edges_assignment": ["B", "B", "B", "B", "M"]
            }}"#
        );
        FoldPattern::from_json(&json).unwrap()
    }

    fn triangle() -> FoldPattern {
        FoldPattern::from_json(
            r#"{
                "vertices_coords": [[10, 10], [13, 10], [10, 14]],
                "faces_vertices": [[0, 1, 2]],
                "edges_vertices": [[0, 1], [1, 2], [2, 0]],
                "edges_assignment": ["B", "C", "U"]
            }"#,
        )
        .unwrap()
    }

    fn buffer_radius(buffers: &MeshBuffers) -> f64 {
        buffers
            .positions
            .chunks_exact(3)
            .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64).length())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_new_synchronizer_is_idle() {
        let sync = MeshSynchronizer::default();
        assert_eq!(sync.state(), SyncState::Idle);
        assert!(!sync.is_stale());
        assert!(sync.pattern().is_none());
    }

    #[test]
    fn test_request_moves_to_pending() {
        let mut sync = MeshSynchronizer::default();
        sync.request_sync(square(1.0), Vec::new());
        assert_eq!(sync.state(), SyncState::PendingSync);
        assert!(sync.is_stale());
        assert!(sync.tick());
        assert_eq!(sync.state(), SyncState::Idle);
        assert!(!sync.is_stale());
        assert!(!sync.tick(), "Nothing left to apply");
    }

    #[test]
    fn test_last_write_wins() {
        let mut sync = MeshSynchronizer::default();
        sync.request_sync(square(1.0), Vec::new());
        sync.request_sync(triangle(), Vec::new());
        sync.tick();
        assert_eq!(sync.pattern(), Some(&triangle()));
        assert_eq!(sync.buffers().vertex_count(), 3);
        assert!(!sync.tick(), "Superseded request must not be applied later");
    }

    #[test]
    fn test_bounding_radius_normalized_to_one() {
        for size in [0.001, 1.0, 400.0] {
            let mut sync = MeshSynchronizer::default();
            sync.sync(square(size), Vec::new());
            let radius = buffer_radius(sync.buffers());
            assert!((radius - 1.0).abs() < 1e-6, "size {size}: radius {radius}");
        }
    }

    #[test]
    fn test_offset_pattern_recentered() {
        let mut sync = MeshSynchronizer::default();
        sync.sync(triangle(), Vec::new());
        assert_eq!(sync.center(), DVec3::new(11.5, 0.0, 12.0));
        assert!((buffer_radius(sync.buffers()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_edges_bucketed_by_assignment() {
        let mut sync = MeshSynchronizer::default();
        sync.sync(triangle(), Vec::new());
        let lines = &sync.buffers().edge_lines;
        assert_eq!(lines.boundary, vec![0, 1]);
        assert_eq!(lines.cut, vec![1, 2]);
        assert_eq!(lines.unassigned, vec![2, 0]);
        assert!(lines.mountain.is_empty() && lines.valley.is_empty() && lines.facet.is_empty());
        assert_eq!(lines.segment_count(), 3);
    }

    #[test]
    fn test_index_buffer_from_faces() {
        let mut sync = MeshSynchronizer::default();
        sync.sync(square(2.0), Vec::new());
        assert_eq!(sync.buffers().indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(sync.buffers().triangle_count(), 2);
    }

    #[test]
    fn test_resync_replaces_previous_objects() {
        let mut sync = MeshSynchronizer::default();
        let pattern = square(1.0);
        let creases = derive_creases(&pattern);
        sync.sync(pattern, creases);
        assert_eq!(sync.nodes().len(), 4);
        assert_eq!(sync.beams().len(), 5);
        assert_eq!(sync.creases().len(), 1);

        sync.sync(triangle(), Vec::new());
        assert_eq!(sync.nodes().len(), 3);
        assert_eq!(sync.beams().len(), 3);
        assert!(sync.creases().is_empty());
    }

    #[test]
    fn test_crease_with_bad_face_dropped() {
        let mut sync = MeshSynchronizer::default();
        let bogus = CreaseParams {
            faces: [0, 9],
            edge: 0,
            target_angle: 1.0,
            fold_type: crease_pattern::FoldType::Valley,
        };
        sync.sync(triangle(), vec![bogus]);
        assert!(sync.creases().is_empty());
    }

    #[test]
    fn test_single_point_extent_not_scaled() {
        let (center, radius) = bounding_sphere(&[DVec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(center, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(radius, 0.0);
    }
}
