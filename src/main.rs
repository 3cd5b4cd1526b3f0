use anyhow::Result;
use clap::Parser;

use acleanbib::cli::{Cli, Commands};
use acleanbib::commands::{run_clean, run_convert_corpus};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Clean(args) => {
            run_clean(args)?;
        }
        Commands::ConvertCorpus(args) => {
            run_convert_corpus(args)?;
        }
    }

    Ok(())
}
