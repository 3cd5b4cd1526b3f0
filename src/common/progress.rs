use indicatif::{ProgressBar, ProgressStyle};

const RECORD_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%) {msg}";

/// Count bar over bibliography records, labelled with `message`
pub fn create_record_progress_bar(total_records: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(RECORD_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let pb = ProgressBar::new(total_records);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
