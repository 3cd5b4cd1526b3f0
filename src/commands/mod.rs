pub mod clean;
pub mod convert_corpus;

pub use clean::run_clean;
pub use convert_corpus::run_convert_corpus;
