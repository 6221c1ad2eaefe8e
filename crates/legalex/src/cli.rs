use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "legalex",
    about = "Citation and definition extraction for statutory text",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract citations and definitions from page text
    Extract(ExtractArgs),
    /// Print the canonical id of each citation text
    Canonicalize {
        /// Citation text(s)
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Input files (.json or form-feed separated .txt) or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Configuration file (JSON)
    #[arg(short, long, env = "LEGALEX_CONFIG")]
    pub config: Option<PathBuf>,
    /// Queue records below this confidence for review
    #[arg(long)]
    pub review_threshold: Option<f64>,
    /// Compare texts without an embedding model
    #[arg(long)]
    pub no_embeddings: bool,
    /// Documents processed at once
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,
}
