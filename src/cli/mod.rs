//! CLI module for ragline
//!
//! Provides command-line interface parsing for the `ragline` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragline - retrieval-augmented answers over your documents
#[derive(Parser, Debug)]
#[command(
    name = "ragline",
    version,
    about = "ragline - retrieval-augmented answers over your documents",
    long_about = "Chunks and embeds your documents into a vector collection, then answers\n\
                  questions from the most similar chunks with a chat model.\n\n\
                  Run 'ragline init' to write a default ragline.toml.",
    after_help = "EXAMPLES:\n    \
                  ragline init                          # Write ragline.toml and .env.example\n    \
                  ragline ingest --dir ./docs           # Ingest every .txt/.md file in ./docs\n    \
                  ragline ingest --text \"Rust is fast.\" # Ingest a raw text\n    \
                  ragline search \"ownership\" -k 3       # Show the 3 closest chunks\n    \
                  ragline ask \"What is ML?\" --filter topic=AI\n    \
                  ragline stats                         # Show collection statistics"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ragline.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default ragline.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Chunk, embed and store documents
    ///
    /// Files and texts are ingested in one batch. A directory is ingested
    /// separately and reports a per-type summary.
    Ingest {
        /// File to ingest (repeatable)
        #[arg(long = "file", value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Raw text to ingest (repeatable)
        #[arg(long = "text", value_name = "TEXT")]
        texts: Vec<String>,

        /// Ingest every supported file directly inside this directory
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Show the chunks most similar to a query
    Search {
        query: String,

        /// Number of results (defaults to [retrieval].top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Exact-match metadata filter, key=value (repeatable, AND-ed)
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// Answer a question from the ingested documents
    Ask {
        question: String,

        /// Number of chunks to use as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Exact-match metadata filter, key=value (repeatable, AND-ed)
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// Show statistics for the configured collection
    Stats,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
