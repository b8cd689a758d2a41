//! The `ifcvox` binary: serves voxel slices and prepares annotation files
//! for the viewer.

mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ifcvox_config::{CliArgs, Config, ConfigError};
use ifcvox_mesh::{MeshBuffer, MeshError};
use ifcvox_server::{JobStore, ServerError, SliceServer};
use platform::{PlatformDirs, PlatformError};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ifcvox", about = "Voxel slice server and annotation encoder")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve slices, composites and job files over HTTP.
    Serve,
    /// Pack polygon files into a mesh buffer: `OUT IN` or
    /// `OUT IN1 COLOR1 [IN2 COLOR2 ...]`.
    Encode {
        #[arg(required = true, num_args = 2..)]
        args: Vec<String>,
    },
    /// Map the objects of a polygon file to building storeys.
    Storeys {
        /// Polygon file with `g`/`o` object markers.
        polygons: PathBuf,
        /// JSON list of `{ "global_id", "elevation" }` storeys.
        storeys: PathBuf,
        /// Output sidecar path.
        out: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, _dirs) = match setup(&cli.args) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("ifcvox: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves directories, loads config with CLI overrides, and installs
/// logging.
fn setup(args: &CliArgs) -> Result<(Config, PlatformDirs), AppError> {
    let dirs = match &args.config {
        Some(root) => PlatformDirs::resolve_with_root(root),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);

    ifcvox_log::init_logging(Some(&dirs.log_dir), Some(&config));
    info!(config = %dirs.config_dir.display(), "ifcvox starting");
    Ok((config, dirs))
}

fn run(command: Command, config: &Config) -> Result<(), AppError> {
    match command {
        Command::Serve => {
            let mut server = SliceServer::new(config.bind_address());
            server.start(JobStore::from_config(config))?;
            info!(port = server.actual_port(), "serving");
            server.wait()?;
        }
        Command::Encode { args } => {
            let (out, inputs) = ifcvox_mesh::parse_encode_args(&args)?;
            let pairs: Vec<_> = inputs.into_iter().map(|i| (i.path, i.color)).collect();
            let buffer = MeshBuffer::from_files(&pairs)?;
            let header = buffer.header();
            let bytes = buffer.write_file(&out)?;
            info!(
                objects = header.object_count,
                face_indices = header.face_index_count,
                line_indices = header.line_index_count,
                vertex_components = header.vertex_component_count,
                bytes,
                "encoded mesh buffer"
            );
        }
        Command::Storeys {
            polygons,
            storeys,
            out,
        } => {
            let storeys = ifcvox_mesh::load_storeys(&storeys)?;
            let count = ifcvox_mesh::write_sidecar(&polygons, &storeys, &out)?;
            info!(objects = count, path = %out.display(), "wrote storey sidecar");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode_command() {
        let cli = Cli::try_parse_from(["ifcvox", "encode", "out.bin", "a.obj", "0f0"]).unwrap();
        let Command::Encode { args } = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args, ["out.bin", "a.obj", "0f0"]);
        assert!(Cli::try_parse_from(["ifcvox", "encode", "out.bin"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ifcvox", "serve", "--port", "8080", "--data-root", "/srv"])
            .unwrap();
        assert!(matches!(cli.command, Command::Serve));
        assert_eq!(cli.args.port, Some(8080));
        assert_eq!(cli.args.data_root, Some(PathBuf::from("/srv")));
    }

    #[test]
    fn test_encode_and_storeys_commands() {
        let dir = tempfile::tempdir().unwrap();
        let polygons = dir.path().join("unsafe.obj");
        std::fs::write(
            &polygons,
            "g rail\nv 0 0 3.5\nv 1 0 3.5\nv 1 1 3.5\nv 0 1 3.5\nf 1 2 3\nf 1 3 4\n",
        )
        .unwrap();
        let storeys = dir.path().join("storeys.json");
        std::fs::write(&storeys, r#"[{"global_id":"a","elevation":0.0},{"global_id":"b","elevation":3.0}]"#)
            .unwrap();
        let config = Config::default();

        let out = dir.path().join("buffer.bin");
        let args = vec![
            out.display().to_string(),
            polygons.display().to_string(),
        ];
        run(Command::Encode { args }, &config).unwrap();
        let len = std::fs::metadata(&out).unwrap().len();
        assert_eq!(len, 48 + 4 * 6 + 52 + 4 * 12 + 12);

        let sidecar = dir.path().join("data.json");
        run(
            Command::Storeys {
                polygons,
                storeys,
                out: sidecar.clone(),
            },
            &config,
        )
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sidecar).unwrap()).unwrap();
        assert_eq!(json[0]["storey"], "b");
    }
}
