use thiserror::Error;

/// Failures of the cleaning pipeline.
///
/// `CorpusLoad` and `Parse` abort a run before any record is resolved.
/// `MalformedYear`, `NonStringFieldValue` and `UnbalancedBraces` are scoped
/// to a single record.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Failed to load reference corpus {path}: {message}")]
    CorpusLoad { path: String, message: String },

    #[error("BibTeX parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Entry {id} has a non-integer year: {year:?}")]
    MalformedYear { id: String, year: String },

    #[error("The field {field} in entry {id} must be a string")]
    NonStringFieldValue { field: String, id: String },

    #[error("The field {field} in entry {id} has unbalanced braces")]
    UnbalancedBraces { field: String, id: String },
}

impl CleanError {
    pub fn corpus_load(path: &str, message: impl ToString) -> Self {
        CleanError::CorpusLoad {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}
