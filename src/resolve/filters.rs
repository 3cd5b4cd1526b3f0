//! The three stages of the cascade, each narrowing a candidate set.
//!
//! Candidates are row indices into the corpus and keep corpus order, so the
//! first surviving candidate is always the earliest row.

use crate::corpus::Corpus;

pub type Candidates = Vec<usize>;

/// Rows whose title contains `query` verbatim (case-sensitive)
pub fn filter_title(corpus: &Corpus, candidates: &[usize], query: &str) -> Candidates {
    candidates
        .iter()
        .copied()
        .filter(|&row| corpus.title(row).is_some_and(|title| title.contains(query)))
        .collect()
}

/// Rows whose author field contains `query` verbatim; missing authors never match
pub fn filter_author(corpus: &Corpus, candidates: &[usize], query: &str) -> Candidates {
    candidates
        .iter()
        .copied()
        .filter(|&row| corpus.author(row).is_some_and(|author| author.contains(query)))
        .collect()
}

/// Rows whose year equals `year`
pub fn filter_year(corpus: &Corpus, candidates: &[usize], year: i64) -> Candidates {
    candidates
        .iter()
        .copied()
        .filter(|&row| corpus.year(row) == Some(year))
        .collect()
}
