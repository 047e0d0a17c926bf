//! Command-line overrides for pipeline configuration.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Configuration overrides shared by the crease binaries.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    /// Seed for face-to-texture assignment.
    #[arg(long)]
    pub seed: Option<String>,

    /// Larger side of the composite atlas in pixels.
    #[arg(long)]
    pub max_dim: Option<u32>,

    /// Bounding-sphere radius after normalization.
    #[arg(long)]
    pub target_radius: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref seed) = args.seed {
            self.assignment.default_seed = seed.clone();
        }
        if let Some(max_dim) = args.max_dim {
            self.atlas.max_dim = max_dim;
        }
        if let Some(radius) = args.target_radius {
            self.mesh.target_radius = radius;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        overrides: CliArgs,
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some("origami-2024".to_string()),
            max_dim: Some(1024),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.assignment.default_seed, "origami-2024");
        assert_eq!(config.atlas.max_dim, 1024);
        // Non-overridden fields retain defaults
        assert_eq!(config.mesh.target_radius, 1.0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let harness =
            Harness::try_parse_from(["crease", "--seed", "kite", "--log-level", "debug"]).unwrap();
        assert_eq!(harness.overrides.seed.as_deref(), Some("kite"));
        assert_eq!(harness.overrides.log_level.as_deref(), Some("debug"));
        assert!(harness.overrides.max_dim.is_none());
    }
}
