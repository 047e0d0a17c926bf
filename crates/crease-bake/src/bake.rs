//! The bake pipeline behind the CLI.

use std::io::Write;
use std::path::{Path, PathBuf};

use crease_config::Config;
use crease_session::{RenderOutput, SessionError, TexturingSession};
use serde::Serialize;
use thiserror::Error;

/// Atlas raster file name inside the output directory.
pub const ATLAS_FILE: &str = "atlas.png";
/// Mesh buffer file name inside the output directory.
pub const MESH_FILE: &str = "mesh.json";

/// Errors that abort a bake.
#[derive(Debug, Error)]
pub enum BakeError {
    /// Pattern, texture or atlas stage failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Output directory or file could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// Atlas PNG encoding failed.
    #[error("failed to encode atlas: {0}")]
    Image(#[from] image::ImageError),

    /// Mesh JSON encoding failed.
    #[error("failed to encode mesh: {0}")]
    Json(#[from] serde_json::Error),

    /// The session had no pattern after loading.
    #[error("session produced no mesh")]
    NoOutput,
}

/// Inputs and output location of one bake.
#[derive(Clone, Debug)]
pub struct BakeJob {
    /// FOLD file to load.
    pub pattern: PathBuf,
    /// Texture directory; `None` bakes an untextured mesh.
    pub textures: Option<PathBuf>,
    /// Directory receiving `atlas.png` and `mesh.json`.
    pub out: PathBuf,
}

/// What a bake produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BakeSummary {
    /// Vertices in the mesh.
    pub vertex_count: usize,
    /// Triangles in the index buffer.
    pub triangle_count: usize,
    /// Session warnings raised by the rebuild.
    pub warning_count: usize,
    /// Whether `atlas.png` was written.
    pub wrote_atlas: bool,
}

/// `mesh.json` document.
#[derive(Serialize)]
struct MeshDocument<'a> {
    seed: &'a str,
    face_textures: &'a [usize],
    warnings: Vec<String>,
    #[serde(flatten)]
    buffers: RenderOutput<'a>,
}

/// Runs the session over `job` and writes its outputs.
pub fn run(job: &BakeJob, config: &Config) -> Result<BakeSummary, BakeError> {
    let mut session = TexturingSession::from_config(config)?;
    if let Some(dir) = &job.textures {
        session.load_textures(dir)?;
    }
    session.load_pattern(&job.pattern)?;

    let output = session.render_output().ok_or(BakeError::NoOutput)?;

    std::fs::create_dir_all(&job.out)?;

    let wrote_atlas = match output.atlas_image {
        Some(atlas) => {
            atlas.save(job.out.join(ATLAS_FILE))?;
            true
        }
        None => false,
    };

    let document = MeshDocument {
        seed: session.seed(),
        face_textures: session.mapping().map_or(&[], |m| m.as_slice()),
        warnings: session.warnings().iter().map(ToString::to_string).collect(),
        buffers: output,
    };
    let summary = BakeSummary {
        vertex_count: document.buffers.vertex_count(),
        triangle_count: document.buffers.indices.len() / 3,
        warning_count: document.warnings.len(),
        wrote_atlas,
    };
    write_json(&job.out.join(MESH_FILE), &document)?;

    Ok(summary)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), BakeError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
