//! Command-line overrides.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Flags shared by every subcommand.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Default)]
pub struct CliArgs {
    /// Interface to bind the HTTP server to.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// HTTP port.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Directory holding the per-job voxel data.
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref root) = args.data_root {
            self.storage.data_root = root.clone();
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
        args: CliArgs,
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            port: Some(8080),
            data_root: Some(PathBuf::from("/srv/jobs")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.data_root, PathBuf::from("/srv/jobs"));
        // Non-overridden fields retain defaults
        assert_eq!(config.server.host, "0.0.0.0");
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
    fn test_parse_flags() {
        let harness =
            Harness::try_parse_from(["ifcvox", "--port", "9000", "--log-level", "debug"]).unwrap();
        assert_eq!(harness.args.port, Some(9000));
        assert_eq!(harness.args.log_level.as_deref(), Some("debug"));
        assert!(harness.args.host.is_none());
    }
}
