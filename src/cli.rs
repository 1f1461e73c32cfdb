use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trackforge")]
#[command(author, version, about = "Publish a song and its cover art to video and audio platforms")]
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
    /// Publish one song, confirming on the console
    Run {
        /// Song title
        #[arg(long)]
        title: String,

        /// Song description
        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// URL of the audio file (.mp3 or .wav)
        #[arg(long)]
        audio: String,

        /// URL of the cover image (.png or .jpg)
        #[arg(long)]
        image: String,

        /// Name shown as the requester (defaults to $USER)
        #[arg(long)]
        requester: Option<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,

    /// Generate a random secret for site submission signing
    GenerateSecret,
}
