//! relaydrop command-line entry point.

mod app;
mod config;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend endpoint URL, overriding the configuration file
    #[arg(long, global = true, env = "RELAYDROP_ENDPOINT")]
    endpoint: Option<String>,

    /// Destination bucket, overriding the configuration file
    #[arg(long, global = true, env = "RELAYDROP_BUCKET")]
    bucket: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a video and/or an archive for one game
    Upload {
        /// Game name; sanitized into the object name
        #[arg(long)]
        game: String,

        /// Destination folder (defaults to `<date>-<game>`)
        #[arg(long)]
        folder: Option<String>,

        /// Video file to upload
        #[arg(long)]
        video: Option<PathBuf>,

        /// Archive file to upload
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Print how a file of the given size would be split
    Plan {
        /// File size in bytes
        #[arg(long)]
        size: u64,

        /// Chunk size in MiB (defaults to the configured value)
        #[arg(long)]
        chunk_size_mib: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(app::run(cli))
}
