use clap::{Parser, Subcommand, ValueEnum};

use crate::bibtex::{page_double_hyphen, split_keywords, split_name_fields, Customization};
use crate::resolve::TitleTrim;

#[derive(Parser)]
#[command(name = "acleanbib")]
#[command(about = "Clean BibTeX entries against a canonical anthology corpus")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match each entry against the corpus and write canonical BibTeX
    Clean(CleanArgs),

    /// Convert a CSV corpus to Parquet for faster loading
    ConvertCorpus(ConvertCorpusArgs),
}

/// Title shortening applied before the title search
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleTrimArg {
    /// Drop the final character
    LastChar,
    /// Drop one trailing punctuation mark
    Punctuation,
    /// Search the title as written
    None,
}

impl From<TitleTrimArg> for TitleTrim {
    fn from(arg: TitleTrimArg) -> Self {
        match arg {
            TitleTrimArg::LastChar => TitleTrim::LastChar,
            TitleTrimArg::Punctuation => TitleTrim::TrailingPunctuation,
            TitleTrimArg::None => TitleTrim::None,
        }
    }
}

/// Record transforms applied right after parsing
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomizationArg {
    /// Rewrite `1-10` page ranges as `1--10`
    PageDoubleHyphen,
    /// Split author and editor into name lists
    SplitNames,
    /// Split keywords on `,` and `;`
    SplitKeywords,
}

impl CustomizationArg {
    pub fn customization(self) -> Customization {
        match self {
            CustomizationArg::PageDoubleHyphen => page_double_hyphen,
            CustomizationArg::SplitNames => split_name_fields,
            CustomizationArg::SplitKeywords => split_keywords,
        }
    }
}

#[derive(Parser, Clone)]
pub struct CleanArgs {
    /// BibTeX file to clean (reads standard input when omitted)
    pub input: Option<String>,

    /// Output BibTeX file
    #[arg(short, long, default_value = "cleaned_bib.bib")]
    pub output: String,

    /// Reference corpus (.csv, .csv.gz or .parquet)
    #[arg(short, long, default_value = "data/anthology.csv")]
    pub corpus: String,

    /// Keep the original citation keys instead of the corpus keys
    #[arg(long, default_value = "false")]
    pub keepkey: bool,

    /// Set publishers from the venue table and drop verbose fields
    #[arg(long, default_value = "false")]
    pub concise: bool,

    /// Log the outcome of every entry
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Read the bibliography from standard input even if a path is given
    #[arg(long, default_value = "false")]
    pub stream: bool,

    /// Print the cleaned bibliography to standard output instead of writing a file
    #[arg(long, default_value = "false")]
    pub print: bool,

    /// JSON file of venue rules used by --concise
    #[arg(long)]
    pub venues: Option<String>,

    /// Indentation before each field
    #[arg(long, default_value = "  ")]
    pub indent: String,

    /// Do not pad field names to a common width
    #[arg(long, default_value = "false")]
    pub no_align: bool,

    /// Add a comma after the last field of each entry
    #[arg(long, default_value = "false")]
    pub trailing_comma: bool,

    /// Keep fields whose value is a single character
    #[arg(long, default_value = "false")]
    pub keep_single_char: bool,

    /// How to shorten input titles before matching
    #[arg(long, value_enum, default_value = "last-char")]
    pub title_trim: TitleTrimArg,

    /// Transforms to run on each parsed entry, in order. split-names and split-keywords
    /// produce list values that cannot be written: entries left unmatched with such a
    /// field are dropped from the output and reported as errors
    #[arg(long, value_enum, value_delimiter = ',')]
    pub customize: Vec<CustomizationArg>,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Write a JSONL report with one match outcome per entry
    #[arg(long)]
    pub report: Option<String>,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ConvertCorpusArgs {
    /// Corpus CSV file (.csv or .csv.gz)
    #[arg(short, long, required = true)]
    pub input: String,

    /// Output Parquet file
    #[arg(short, long, default_value = "anthology.parquet")]
    pub output: String,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}
