//! Console and JSON reporting helpers shared by commands.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use miditape_merge::{ErrorCode, MergeReport};

use super::json_output::{error_codes, JsonError};
use crate::checks::{confirm_overwrite, MissingFile};

/// Prints every missing file and the closing hint.
pub fn print_missing(missing: &[MissingFile]) {
    for file in missing {
        println!("  {} {}", "!!".red(), file);
    }
    println!("Please check before continuing.");
}

/// Converts missing files to JSON errors.
pub fn missing_to_json(missing: &[MissingFile]) -> Vec<JsonError> {
    missing
        .iter()
        .map(|file| {
            let code = match file {
                MissingFile::Input(_) => error_codes::INPUT_NOT_FOUND,
                MissingFile::SoundFont(_) => error_codes::SOUNDFONT_NOT_FOUND,
            };
            JsonError::new(code, file.to_string()).with_file(file.path().display().to_string())
        })
        .collect()
}

/// Converts a library error to a JSON error, keeping its stable code.
pub fn coded_error_to_json<E: ErrorCode>(error: &E) -> JsonError {
    JsonError::new(error.code(), error.to_string())
}

/// Prints a short merge summary.
pub fn print_report(report: &MergeReport) {
    println!(
        "  {} {} input(s) -> {} track(s), {} ticks at {} ticks per beat",
        "->".green(),
        report.files.len(),
        report.track_count,
        report.total_ticks,
        report.resolution
    );
    for file in &report.files {
        println!(
            "     {}",
            format!(
                "#{}: {} track(s), {} ticks incl. {} gap",
                file.index, file.track_count, file.length_ticks, file.gap_ticks
            )
            .dimmed()
        );
    }
}

/// Asks on the terminal whether `path` may be overwritten.
pub fn ask_overwrite(path: &Path) -> Result<bool> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let confirmed = confirm_overwrite(path, &mut input, &mut output)?;
    if !confirmed {
        println!("Please re-run, selecting a new output file name with the --out option.");
    }
    Ok(confirmed)
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
