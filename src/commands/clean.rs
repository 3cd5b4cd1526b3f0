use anyhow::{Context, Result};
use log::{debug, error, info, log, warn, Level};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::time::Instant;

use crate::bibtex::{
    convert_to_unicode, parse_bibtex, BibEntry, BibWriter, Customization, ParserConfig, WriterConfig,
};
use crate::cli::CleanArgs;
use crate::common::{
    create_record_progress_bar, format_elapsed, setup_logging, CleanStats, MatchReport, Outcome,
};
use crate::concise::{apply_concise, load_venue_table, VenueLookup, VenueTable, VERBOSE_FIELDS};
use crate::corpus::load_corpus;
use crate::resolve::{MatchPolicy, Resolution, Resolver};

/// Per-run switches for turning resolutions into output entries
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    pub keepkey: bool,
    pub concise: bool,
    pub verbose: bool,
}

/// One output entry with the outcome that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedEntry {
    pub entry: BibEntry,
    pub report: MatchReport,
}

/// Resolve one entry; record-level failures keep the original entry
pub fn clean_entry(
    input: &BibEntry,
    resolver: &Resolver<'_>,
    options: &CleanOptions,
    venues: &dyn VenueLookup,
) -> CleanedEntry {
    let level = if options.verbose { Level::Info } else { Level::Debug };

    match resolver.resolve(input) {
        Ok(resolution) => {
            let report = resolution.report();
            match &resolution {
                Resolution::Matched { matched_id, stage, .. } => {
                    log!(level, "MATCH {} -> {} (by {})", input.id, matched_id, stage);
                }
                Resolution::Unmatched { reason, .. } => {
                    log!(level, "NO MATCH FOUND FOR {}: {}", input.id, reason);
                }
            }

            let matched = resolution.is_matched();
            let mut entry = resolution.into_entry(options.keepkey);
            if matched && options.concise {
                entry = apply_concise(entry, venues, &VERBOSE_FIELDS);
            }
            CleanedEntry { entry, report }
        }
        Err(e) => {
            warn!("Keeping original entry {}: {}", input.id, e);
            CleanedEntry {
                entry: input.clone(),
                report: MatchReport {
                    id: input.id.clone(),
                    outcome: Outcome::Error,
                    matched_id: None,
                    stage: None,
                    reason: Some(e.to_string()),
                },
            }
        }
    }
}

/// Resolve every entry in parallel; output order follows input order
pub fn clean_entries(
    entries: &[BibEntry],
    resolver: &Resolver<'_>,
    options: &CleanOptions,
    venues: &dyn VenueLookup,
) -> Vec<CleanedEntry> {
    let progress = create_record_progress_bar(entries.len() as u64, "Resolving entries");
    if options.verbose {
        // per-entry log lines and the bar would interleave
        progress.finish_and_clear();
    }

    let cleaned: Vec<CleanedEntry> = entries
        .par_iter()
        .map(|entry| {
            let result = clean_entry(entry, resolver, options, venues);
            progress.inc(1);
            result
        })
        .collect();

    progress.finish_and_clear();
    cleaned
}

/// Serialize cleaned entries; entries that cannot be written are skipped and reported
pub fn render_entries(cleaned: &mut [CleanedEntry], writer: &BibWriter) -> (String, CleanStats) {
    let mut text = String::new();
    let mut stats = CleanStats {
        total_records: cleaned.len(),
        ..CleanStats::default()
    };

    for item in cleaned.iter_mut() {
        match item.report.outcome {
            Outcome::Matched => stats.matched += 1,
            Outcome::Unmatched => stats.unmatched += 1,
            Outcome::Error => stats.malformed_year += 1,
        }

        match writer.write_entry(&item.entry) {
            Ok(rendered) => text.push_str(&rendered),
            Err(e) => {
                error!("Skipping entry {}: {}", item.entry.id, e);
                stats.write_failures += 1;
                item.report.outcome = Outcome::Error;
                item.report.reason = Some(e.to_string());
            }
        }
    }

    (text, stats)
}

fn configure_threads(threads: usize) {
    let num_threads = if threads == 0 {
        let cores = num_cpus::get();
        debug!("Auto-detected {} CPU cores. Using {} threads.", cores, cores);
        cores
    } else {
        info!("Using specified {} threads.", threads);
        threads
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        error!("Failed to build thread pool: {}. Using default.", e);
    }
}

fn read_input(args: &CleanArgs) -> Result<String> {
    match &args.input {
        Some(path) if !args.stream => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read bibliography: {}", path))
        }
        _ => {
            info!("Reading bibliography from standard input");
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read bibliography from standard input")?;
            Ok(text)
        }
    }
}

/// Input is always decoded to Unicode first, then the requested customizations run
fn parser_config(args: &CleanArgs) -> ParserConfig {
    let mut customizations: Vec<Customization> = Vec::with_capacity(args.customize.len() + 1);
    customizations.push(convert_to_unicode);
    customizations.extend(args.customize.iter().map(|c| c.customization()));
    ParserConfig {
        customizations,
        ..ParserConfig::default()
    }
}

fn writer_config(args: &CleanArgs) -> WriterConfig {
    WriterConfig {
        indent: args.indent.clone(),
        align_values: !args.no_align,
        trailing_comma: args.trailing_comma,
        drop_single_char_values: !args.keep_single_char,
        ..WriterConfig::default()
    }
}

fn write_report(reports: &[&MatchReport], path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create report file: {}", path))?;
    let mut writer = BufWriter::new(file);
    for report in reports {
        writeln!(writer, "{}", serde_json::to_string(report)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Run the clean command with the given arguments
pub fn run_clean(args: CleanArgs) -> Result<CleanStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level, args.verbose)?;

    info!("Starting BibTeX cleaner");
    info!("Input: {}", args.input.as_deref().unwrap_or("<stdin>"));
    info!("Corpus: {}", args.corpus);
    if !args.print {
        info!("Output: {}", args.output);
    }

    configure_threads(args.threads);

    let corpus = load_corpus(&args.corpus)?;

    let text = read_input(&args)?;
    let db = parse_bibtex(&text, &parser_config(&args))?;
    info!("Parsed {} entries", db.entries.len());

    let venues: Box<dyn VenueLookup> = match &args.venues {
        Some(path) => Box::new(load_venue_table(path)?),
        None => Box::new(VenueTable::default()),
    };

    let policy = MatchPolicy {
        title_trim: args.title_trim.into(),
    };
    let resolver = Resolver::new(&corpus, policy);
    let options = CleanOptions {
        keepkey: args.keepkey,
        concise: args.concise,
        verbose: args.verbose,
    };

    let mut cleaned = clean_entries(&db.entries, &resolver, &options, venues.as_ref());

    let writer = BibWriter::new(writer_config(&args));
    let (output, stats) = render_entries(&mut cleaned, &writer);

    if args.print {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(output.as_bytes())?;
        handle.flush()?;
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create output file: {}", args.output))?;
        let mut out = BufWriter::new(file);
        out.write_all(output.as_bytes())?;
        out.flush()?;
    }

    if let Some(report_path) = &args.report {
        let reports: Vec<&MatchReport> = cleaned.iter().map(|c| &c.report).collect();
        write_report(&reports, report_path)?;
    }

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Entries: {}", stats.total_records);
    info!("Matched: {}", stats.matched);
    info!("Unmatched: {}", stats.unmatched);
    if stats.malformed_year > 0 {
        warn!("Malformed years: {}", stats.malformed_year);
    }
    if stats.write_failures > 0 {
        warn!("Entries skipped on write: {}", stats.write_failures);
    }
    if !args.print {
        info!("Output file: {}", args.output);
    }
    if let Some(report_path) = &args.report {
        info!("Report: {}", report_path);
    }
    info!("========================================================");

    Ok(stats)
}
