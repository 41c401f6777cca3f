//! Headless command-line front end.
//!
//! Every command runs a real [`Whiteboard`] session, so documents are
//! validated, sanitized and normalised exactly as a page host would see them.

use crate::shortcuts::ShortcutRegistry;
use clap::{Parser, Subcommand};
use inkboard_core::{BoardConfig, BoardError, Whiteboard};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Parser)]
#[clap(name = "inkboard", version, about = "Inspect and convert whiteboard documents")]
pub struct Cli {
    /// Board configuration file (JSON). Missing fields keep their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Validate an object export and summarise it.
    Check { input: PathBuf },
    /// Re-export an object document with defaults filled in and content sanitized.
    Normalize {
        input: PathBuf,
        /// Write here instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load a bitmap onto the drawing surface and write the surface as PNG.
    Flatten { canvas: PathBuf, output: PathBuf },
    /// Print the effective configuration.
    Config,
    /// List keyboard shortcuts.
    Shortcuts,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Board(#[from] BoardError),
}

pub type CliResult<T> = Result<T, CliError>;

fn read_to_string(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> CliResult<()> {
    fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the configuration named on the command line, or the defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<BoardConfig> {
    let Some(path) = path else {
        return Ok(BoardConfig::default());
    };
    let json = read_to_string(path)?;
    let config = BoardConfig::from_json(&json).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Run a command and return what it prints.
pub fn run(cli: &Cli) -> CliResult<String> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        CliCommand::Check { input } => {
            let mut board = Whiteboard::new(config);
            let count = board.load_objects(&read_to_string(input)?)?;
            let mut summary = format!("{}: {} object(s)", input.display(), count);
            for kind in ["rect", "circle", "text"] {
                let n = board.objects().filter(|o| o.kind.as_str() == kind).count();
                if n > 0 {
                    summary.push_str(&format!(", {} {}", n, kind));
                }
            }
            let images = board.objects().filter(|o| o.is_image()).count();
            if images > 0 {
                summary.push_str(&format!(" ({} image)", images));
            }
            Ok(summary)
        }
        CliCommand::Normalize { input, output } => {
            let mut board = Whiteboard::new(config);
            board.load_objects(&read_to_string(input)?)?;
            let json = board.export_json()?;
            match output {
                Some(path) => {
                    write(path, &json)?;
                    Ok(format!("Wrote {}", path.display()))
                }
                None => Ok(json),
            }
        }
        CliCommand::Flatten { canvas, output } => {
            let bytes = fs::read(canvas).map_err(|source| CliError::Io {
                path: canvas.clone(),
                source,
            })?;
            let mut board = Whiteboard::new(config);
            board.load_canvas_bytes(&bytes)?;
            write(output, board.export_canvas_png()?)?;
            let size = board.world_size();
            Ok(format!("Wrote {}x{} surface to {}", size.width, size.height, output.display()))
        }
        CliCommand::Config => Ok(config.to_json().map_err(BoardError::from)?),
        CliCommand::Shortcuts => Ok(ShortcutRegistry::describe()),
    }
}
