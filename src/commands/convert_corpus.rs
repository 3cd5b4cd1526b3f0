use anyhow::Result;
use log::info;
use std::time::Instant;

use crate::cli::ConvertCorpusArgs;
use crate::common::{format_elapsed, setup_logging};
use crate::corpus::{corpus_from_frame, read_corpus_frame, save_corpus_to_parquet};

/// Run the convert-corpus command: validate a CSV corpus and store it as Parquet
pub fn run_convert_corpus(args: ConvertCorpusArgs) -> Result<usize> {
    let start_time = Instant::now();

    setup_logging(&args.log_level, false)?;

    info!("Converting corpus to Parquet");
    info!("Input: {}", args.input);
    info!("Output: {}", args.output);

    let mut df = read_corpus_frame(&args.input)?;
    // Reject corpora the cleaner could not use before writing anything
    let corpus = corpus_from_frame(&df)?;

    save_corpus_to_parquet(&mut df, &args.output)?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Rows: {}", corpus.len());
    info!("Columns: {}", corpus.columns().join(", "));
    info!("Output file: {}", args.output);
    info!("========================================================");

    Ok(corpus.len())
}
