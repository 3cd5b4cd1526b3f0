pub mod filters;

pub use filters::*;

use log::debug;
use std::fmt;

use crate::bibtex::BibEntry;
use crate::common::{CleanError, MatchReport, MatchStage, Outcome};
use crate::corpus::Corpus;

/// How the input title is shortened before the substring search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleTrim {
    /// Drop the final character unconditionally ("Title." -> "Title", "Title" -> "Titl")
    #[default]
    LastChar,
    /// Drop one trailing ASCII punctuation character, if any
    TrailingPunctuation,
    /// Search with the title as written
    None,
}

impl TitleTrim {
    pub fn apply<'a>(&self, title: &'a str) -> &'a str {
        match self {
            TitleTrim::LastChar => {
                let mut chars = title.chars();
                chars.next_back();
                chars.as_str()
            }
            TitleTrim::TrailingPunctuation => match title.chars().last() {
                Some(c) if c.is_ascii_punctuation() => &title[..title.len() - c.len_utf8()],
                _ => title,
            },
            TitleTrim::None => title,
        }
    }
}

/// Tunable parts of the cascade
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchPolicy {
    pub title_trim: TitleTrim,
}

/// Why an input record kept its original form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// No title match was unique and the record has no author
    MissingAuthor,
    NoAuthorMatch,
    NoYearMatch,
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnmatchedReason::MissingAuthor => "no unique title match and no author to filter on",
            UnmatchedReason::NoAuthorMatch => "no corpus row matches the author",
            UnmatchedReason::NoYearMatch => "no author match has the same year",
        };
        f.write_str(text)
    }
}

/// Outcome of resolving one input record
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Matched {
        /// The corpus row flattened to an entry, carrying the canonical ID
        record: BibEntry,
        source_id: String,
        matched_id: String,
        stage: MatchStage,
    },
    Unmatched {
        original: BibEntry,
        reason: UnmatchedReason,
    },
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }

    pub fn source_id(&self) -> &str {
        match self {
            Resolution::Matched { source_id, .. } => source_id,
            Resolution::Unmatched { original, .. } => &original.id,
        }
    }

    /// The entry to emit; with `keepkey` a match keeps the input's citation key
    pub fn into_entry(self, keepkey: bool) -> BibEntry {
        match self {
            Resolution::Matched {
                mut record,
                source_id,
                ..
            } => {
                if keepkey {
                    record.id = source_id;
                }
                record
            }
            Resolution::Unmatched { original, .. } => original,
        }
    }

    pub fn report(&self) -> MatchReport {
        match self {
            Resolution::Matched {
                source_id,
                matched_id,
                stage,
                ..
            } => MatchReport {
                id: source_id.clone(),
                outcome: Outcome::Matched,
                matched_id: Some(matched_id.clone()),
                stage: Some(*stage),
                reason: None,
            },
            Resolution::Unmatched { original, reason } => MatchReport {
                id: original.id.clone(),
                outcome: Outcome::Unmatched,
                matched_id: None,
                stage: None,
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// Cascading title -> author -> year matcher over a borrowed corpus
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
    corpus: &'c Corpus,
    policy: MatchPolicy,
}

impl<'c> Resolver<'c> {
    pub fn new(corpus: &'c Corpus, policy: MatchPolicy) -> Self {
        Self { corpus, policy }
    }

    pub fn corpus(&self) -> &'c Corpus {
        self.corpus
    }

    /// Resolve one record.
    ///
    /// 1. Title substring over the whole corpus; a single hit is the match.
    /// 2. Author substring over the title hits, or the whole corpus when there were none.
    ///    No hit leaves the record unmatched, a single hit is the match.
    /// 3. Year equality over the author hits; the first surviving row wins.
    ///
    /// Only step 3 reads the year, so a malformed year fails the record only
    /// when the first two stages are ambiguous.
    pub fn resolve(&self, input: &BibEntry) -> Result<Resolution, CleanError> {
        let all_rows = self.corpus.all_rows();

        let title_hits = match input.title() {
            Some(title) => {
                let query = self.policy.title_trim.apply(&title);
                if query.is_empty() {
                    Vec::new()
                } else {
                    filter_title(self.corpus, &all_rows, query)
                }
            }
            None => Vec::new(),
        };
        debug!("{}: {} title candidates", input.id, title_hits.len());

        if title_hits.len() == 1 {
            return Ok(self.matched(input, title_hits[0], MatchStage::Title));
        }

        let pool = if title_hits.is_empty() { all_rows } else { title_hits };

        let tokens = input.author_tokens();
        if tokens.is_empty() {
            return Ok(unmatched(input, UnmatchedReason::MissingAuthor));
        }
        let author_query = tokens.join(" ");
        let author_hits = filter_author(self.corpus, &pool, &author_query);
        debug!("{}: {} author candidates for {:?}", input.id, author_hits.len(), author_query);

        match author_hits.len() {
            0 => return Ok(unmatched(input, UnmatchedReason::NoAuthorMatch)),
            1 => return Ok(self.matched(input, author_hits[0], MatchStage::Author)),
            _ => {}
        }

        let raw_year = input.year().unwrap_or_default();
        let year = raw_year.trim().parse::<i64>().map_err(|_| CleanError::MalformedYear {
            id: input.id.clone(),
            year: raw_year.clone(),
        })?;

        let year_hits = filter_year(self.corpus, &author_hits, year);
        debug!("{}: {} year candidates for {}", input.id, year_hits.len(), year);

        match year_hits.first() {
            Some(&row) => Ok(self.matched(input, row, MatchStage::Year)),
            None => Ok(unmatched(input, UnmatchedReason::NoYearMatch)),
        }
    }

    fn matched(&self, input: &BibEntry, row: usize, stage: MatchStage) -> Resolution {
        let record = self.corpus.to_entry(row, &input.entry_type);
        Resolution::Matched {
            matched_id: record.id.clone(),
            record,
            source_id: input.id.clone(),
            stage,
        }
    }
}

fn unmatched(input: &BibEntry, reason: UnmatchedReason) -> Resolution {
    Resolution::Unmatched {
        original: input.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::FieldValue;

    fn corpus() -> Corpus {
        Corpus::from_table(
            &["ID", "title", "author", "year", "booktitle", "url"],
            &[
                vec![
                    "vaswani2017attention",
                    "Attention Is All You Need",
                    "Vaswani, A.",
                    "2017",
                    "Advances in Neural Information Processing Systems",
                    "",
                ],
                vec!["smith2019a", "Parsing Things", "Smith, John", "2019", "Proc. of ACL", ""],
                vec!["smith2020a", "Parsing Things", "Smith, John", "2020", "Proc. of EMNLP", ""],
                vec!["smith2020b", "Parsing Things Again", "Smith, John", "2020", "Proc. of EMNLP", ""],
                vec!["doe2018", "Generating Text", "Doe, Jane", "2018", "Proc. of NAACL", ""],
            ],
        )
        .unwrap()
    }

    fn input(id: &str, title: &str, author: &str, year: &str) -> BibEntry {
        BibEntry::new("inproceedings", id)
            .with_field("title", title)
            .with_field("author", author)
            .with_field("year", year)
    }

    #[test]
    fn test_unique_title_match() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let mut record = BibEntry::new("inproceedings", "my-key")
            .with_field("title", "Attention Is All You Need.")
            .with_field("year", "2017");
        record.set("author", FieldValue::List(vec!["Vaswani".to_string()]));

        let resolution = resolver.resolve(&record).unwrap();
        match &resolution {
            Resolution::Matched {
                matched_id,
                source_id,
                stage,
                record,
            } => {
                assert_eq!(matched_id, "vaswani2017attention");
                assert_eq!(source_id, "my-key");
                assert_eq!(*stage, MatchStage::Title);
                assert_eq!(record.text("url").as_deref(), Some(" "));
            }
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(resolution.clone().into_entry(true).id, "my-key");
        assert_eq!(resolution.into_entry(false).id, "vaswani2017attention");
    }

    #[test]
    fn test_ambiguous_title_falls_to_author_then_year() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());

        let resolution = resolver.resolve(&input("k", "Parsing Things", "Smith, John", "2020")).unwrap();
        match resolution {
            Resolution::Matched { matched_id, stage, .. } => {
                // rows 1..=3 share the title prefix; year 2020 leaves 2 and 3, first wins
                assert_eq!(matched_id, "smith2020a");
                assert_eq!(stage, MatchStage::Year);
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_year_selects_matching_row_only() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let resolution = resolver.resolve(&input("k", "Parsing Things", "Smith, John", "2019")).unwrap();
        assert_eq!(resolution.report().matched_id.as_deref(), Some("smith2019a"));
    }

    #[test]
    fn test_no_title_match_uses_whole_corpus_for_author() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let resolution = resolver.resolve(&input("k", "Something Else", "Doe, Jane", "1999")).unwrap();
        match resolution {
            Resolution::Matched { matched_id, stage, .. } => {
                assert_eq!(matched_id, "doe2018");
                assert_eq!(stage, MatchStage::Author);
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_no_author_match_returns_original() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let original = input("k", "Unknown Work", "Nobody, N.", "2001");
        let resolution = resolver.resolve(&original).unwrap();
        assert_eq!(
            resolution,
            Resolution::Unmatched {
                original: original.clone(),
                reason: UnmatchedReason::NoAuthorMatch
            }
        );
        assert_eq!(resolution.into_entry(false), original);
    }

    #[test]
    fn test_no_year_match_returns_original() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let resolution = resolver.resolve(&input("k", "Parsing Things", "Smith, John", "1990")).unwrap();
        assert!(matches!(
            resolution,
            Resolution::Unmatched {
                reason: UnmatchedReason::NoYearMatch,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_author_is_unmatched() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let record = BibEntry::new("misc", "k").with_field("title", "Nothing Like It");
        let resolution = resolver.resolve(&record).unwrap();
        assert!(matches!(
            resolution,
            Resolution::Unmatched {
                reason: UnmatchedReason::MissingAuthor,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_year_only_when_year_stage_reached() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());

        let err = resolver
            .resolve(&input("bad", "Parsing Things", "Smith, John", "circa 2020"))
            .unwrap_err();
        assert!(matches!(err, CleanError::MalformedYear { ref id, .. } if id == "bad"));

        // A unique title never looks at the year
        let ok = resolver.resolve(&input("fine", "Generating Text", "Doe, Jane", "n.d.")).unwrap();
        assert!(ok.is_matched());
    }

    #[test]
    fn test_title_trim_policies() {
        assert_eq!(TitleTrim::LastChar.apply("Title."), "Title");
        assert_eq!(TitleTrim::LastChar.apply("Title"), "Titl");
        assert_eq!(TitleTrim::LastChar.apply("Naïveé"), "Naïve");
        assert_eq!(TitleTrim::TrailingPunctuation.apply("Title?"), "Title");
        assert_eq!(TitleTrim::TrailingPunctuation.apply("Title"), "Title");
        assert_eq!(TitleTrim::None.apply("Title."), "Title.");
    }

    #[test]
    fn test_untrimmed_title_with_period_misses() {
        let corpus = corpus();
        let policy = MatchPolicy {
            title_trim: TitleTrim::None,
        };
        let resolver = Resolver::new(&corpus, policy);
        let resolution = resolver
            .resolve(&input("k", "Attention Is All You Need.", "Nobody", "2017"))
            .unwrap();
        assert!(!resolution.is_matched());
    }

    #[test]
    fn test_entry_type_falls_back_to_input() {
        let corpus = corpus();
        let resolver = Resolver::new(&corpus, MatchPolicy::default());
        let record = input("k", "Generating Text", "Doe", "2018");
        let entry = resolver.resolve(&record).unwrap().into_entry(false);
        assert_eq!(entry.entry_type, "inproceedings");
        assert_eq!(entry.text("booktitle").as_deref(), Some("Proc. of NAACL"));
    }
}
