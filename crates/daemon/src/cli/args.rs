pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "santa")]
#[command(about = "Runs Secret Santa draws once a room's deadline passes")]
pub struct Args {
    /// Status server of a running daemon (defaults to the configured status port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the santa config directory (defaults to ~/.santa)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
