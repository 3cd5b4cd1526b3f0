use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Instant;

use super::Corpus;
use crate::common::{format_elapsed, CleanError};

/// Load the reference corpus from `.csv`, `.csv.gz` or `.parquet`
pub fn load_corpus(path: &str) -> Result<Corpus, CleanError> {
    info!("Loading reference corpus from: {}", path);
    let start = Instant::now();

    let df = read_corpus_frame(path)?;
    let corpus = corpus_from_frame(&df).map_err(|e| match e {
        CleanError::CorpusLoad { message, .. } => CleanError::corpus_load(path, message),
        other => other,
    })?;

    info!(
        "Loaded {} reference rows ({} columns) in {}",
        corpus.len(),
        corpus.columns().len(),
        format_elapsed(start.elapsed())
    );

    Ok(corpus)
}

/// Read the corpus file into a DataFrame with every column as strings
pub fn read_corpus_frame(path: &str) -> Result<DataFrame, CleanError> {
    if !Path::new(path).exists() {
        return Err(CleanError::corpus_load(path, "file does not exist"));
    }
    let fail = |e: PolarsError| CleanError::corpus_load(path, e);

    if path.ends_with(".parquet") {
        let df = LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .map_err(fail)?;
        return stringify_columns(df).map_err(fail);
    }

    // infer_schema_length 0 reads every column as String
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0));

    if path.ends_with(".gz") {
        let file = File::open(path).map_err(|e| CleanError::corpus_load(path, e))?;
        let mut bytes = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut bytes)
            .map_err(|e| CleanError::corpus_load(path, e))?;
        return options
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(fail);
    }

    options
        .try_into_reader_with_file_path(Some(path.into()))
        .and_then(|reader| reader.finish())
        .map_err(fail)
}

fn stringify_columns(df: DataFrame) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| col.cast(&DataType::String))
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}

/// Materialise a DataFrame into the in-memory corpus
pub fn corpus_from_frame(df: &DataFrame) -> Result<Corpus, CleanError> {
    let height = df.height();
    let mut names = Vec::with_capacity(df.width());
    let mut rows: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(df.width()); height];

    for col in df.get_columns() {
        let name = col.name().to_string();
        let fail = |e: PolarsError| CleanError::corpus_load("<frame>", format!("column {}: {}", name, e));

        let as_str = col.cast(&DataType::String).map_err(fail)?;
        let values = as_str.str().map_err(fail)?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            row.push(value.map(|s| s.to_string()));
        }
        names.push(name);
    }

    Corpus::from_rows(names, rows)
}

/// Save the corpus file as zstd-compressed Parquet for faster loads
pub fn save_corpus_to_parquet(df: &mut DataFrame, path: &str) -> Result<()> {
    info!("Saving corpus to: {}", path);
    let start = Instant::now();

    let file = File::create(path).with_context(|| format!("Failed to create file: {}", path))?;

    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(df)
        .context("Failed to write corpus to parquet")?;

    info!("Saved {} rows in {}", df.height(), format_elapsed(start.elapsed()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    const CSV: &str = "ID,title,author,year,booktitle\n\
vaswani2017attention,Attention Is All You Need,\"Vaswani, Ashish\",2017,NeurIPS\n\
devlin2019bert,BERT,\"Devlin, Jacob\",2019,\n";

    #[test]
    fn test_load_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anthology.csv");
        std::fs::write(&path, CSV).unwrap();

        let corpus = load_corpus(path.to_str().unwrap()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.id(0), Some("vaswani2017attention"));
        assert_eq!(corpus.author(0), Some("Vaswani, Ashish"));
        assert_eq!(corpus.year(1), Some(2019));
        assert_eq!(corpus.to_entry(1, "misc").text("booktitle").as_deref(), Some(" "));
    }

    #[test]
    fn test_load_gzipped_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anthology.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(CSV.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let corpus = load_corpus(path.to_str().unwrap()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.title(1), Some("BERT"));
    }

    #[test]
    fn test_parquet_round_trip() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("anthology.csv");
        let parquet_path = dir.path().join("anthology.parquet");
        std::fs::write(&csv_path, CSV).unwrap();

        let mut df = read_corpus_frame(csv_path.to_str().unwrap()).unwrap();
        save_corpus_to_parquet(&mut df, parquet_path.to_str().unwrap()).unwrap();

        let corpus = load_corpus(parquet_path.to_str().unwrap()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.id(1), Some("devlin2019bert"));
    }

    #[test]
    fn test_missing_file_is_corpus_error() {
        let err = load_corpus("/nonexistent/anthology.csv").unwrap_err();
        assert!(matches!(err, CleanError::CorpusLoad { .. }));
    }

    #[test]
    fn test_missing_columns_is_corpus_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "ID,title\na,b\n").unwrap();

        let err = load_corpus(path.to_str().unwrap()).unwrap_err();
        match err {
            CleanError::CorpusLoad { path: p, message } => {
                assert!(p.ends_with("bad.csv"));
                assert!(message.contains("author"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
