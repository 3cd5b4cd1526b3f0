use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use time::macros::format_description;

/// Parse a log level string into a LevelFilter
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO.", level);
            LevelFilter::Info
        }
    }
}

/// Level actually used: `--verbose` guarantees per-record lines (INFO) are shown
pub fn effective_level(log_level: &str, verbose: bool) -> LevelFilter {
    let level = parse_log_level(log_level);
    if verbose && level < LevelFilter::Info {
        LevelFilter::Info
    } else {
        level
    }
}

/// Set up logging on stderr so stdout stays free for `--print` output
pub fn setup_logging(log_level: &str, verbose: bool) -> Result<()> {
    SimpleLogger::new()
        .with_level(effective_level(log_level, verbose))
        .with_module_level("polars", LevelFilter::Warn)
        .with_timestamp_format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .init()?;
    Ok(())
}
