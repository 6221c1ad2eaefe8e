mod cli;
mod extract;
mod input;

use anyhow::Result;
use clap::Parser;
use legalex_core::Canonicalizer;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract(args) => extract::run(args).await,
        Commands::Canonicalize { texts } => canonicalize(&texts),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn canonicalize(texts: &[String]) -> Result<()> {
    let canonicalizer = Canonicalizer::new()?;
    for text in texts {
        println!("{}", canonicalizer.canonicalize_citation(text));
    }
    Ok(())
}
