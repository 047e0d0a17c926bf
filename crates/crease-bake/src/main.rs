//! `crease-bake`: textures a FOLD crease pattern and writes the atlas and mesh
//! buffers to disk.
//!
//! Run with: `cargo run -p crease-bake -- --pattern crane.fold --textures tex/ --out out/`

mod bake;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crease_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

/// CLI arguments for the bake binary.
#[derive(Parser, Debug)]
#[command(name = "crease-bake", about = "Bake a textured mesh from a crease pattern")]
struct BakeArgs {
    /// FOLD file to texture.
    #[arg(long)]
    pattern: PathBuf,

    /// Directory of PNG/JPEG textures. Omit for an untextured mesh.
    #[arg(long)]
    textures: Option<PathBuf>,

    /// Output directory for `atlas.png` and `mesh.json`.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    #[command(flatten)]
    overrides: CliArgs,
}

fn main() -> ExitCode {
    let args = BakeArgs::parse();

    let config_dir = args.overrides.config.clone().or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = match config_dir.as_deref() {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args.overrides);

    let log_dir = config
        .debug
        .log_dir
        .clone()
        .or_else(|| config_dir.map(|dir| dir.join("logs")));
    crease_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let job = bake::BakeJob {
        pattern: args.pattern,
        textures: args.textures,
        out: args.out,
    };
    match bake::run(&job, &config) {
        Ok(summary) => {
            info!(
                "Baked {} vertices, {} triangles, {} warning(s) into {}{}",
                summary.vertex_count,
                summary.triangle_count,
                summary.warning_count,
                job.out.display(),
                if summary.wrote_atlas { "" } else { " (untextured)" }
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Bake failed: {e}");
            ExitCode::FAILURE
        }
    }
}
