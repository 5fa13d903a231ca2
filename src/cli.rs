use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imagehost")]
#[command(author, version, about = "Image upload, resize and listing service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Start {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resize a local image file the way uploads are prepared
    Prepare {
        /// Image file to prepare
        #[arg(required = true)]
        input: PathBuf,

        /// Target width in pixels (0 derives it from the height)
        #[arg(long, default_value_t = 0)]
        width: u32,

        /// Target height in pixels (0 derives it from the width)
        #[arg(long, default_value_t = 0)]
        height: u32,

        /// Output file (defaults to <stem>_<w>x<h>.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
