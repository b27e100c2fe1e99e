//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// recap - Transcript storage and AI summary service
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// User management commands
    #[command(subcommand)]
    User(UserCommand),

    /// File management commands
    #[command(subcommand)]
    File(FileCommand),

    /// Issue a bearer token for an existing user
    Token {
        /// Email of the user
        email: String,
    },

    /// Regenerate the AI summary of a file
    Summarize {
        /// File ID
        id: String,

        /// Send the whole transcript and report failures without erroring
        #[arg(long)]
        fallback: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create a user
    Add {
        /// Login email
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List users
    List,
}

#[derive(Subcommand, Debug)]
pub enum FileCommand {
    /// Create a file from a transcript on disk
    Add {
        /// Email of the owning user
        #[arg(short, long)]
        owner: String,

        /// Path to a plain-text transcript
        #[arg(short, long)]
        transcript: PathBuf,

        /// Title (defaults to the transcript file name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Show a file and its summary
    Show {
        /// File ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
