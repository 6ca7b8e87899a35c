//! Merge command implementation
//!
//! Joins MIDI files and writes the merged MIDI without rendering audio.

use anyhow::{Context, Result};
use colored::Colorize;
use miditape_merge::merge_files;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

use super::json_output::{error_codes, JsonError, RunOutput};
use super::reporting::{
    ask_overwrite, coded_error_to_json, missing_to_json, print_json, print_missing, print_report,
};
use super::MergeOptions;
use crate::checks::missing_files;

/// Run the merge command
///
/// # Arguments
/// * `inputs` - MIDI files, in play order
/// * `output` - Path of the merged MIDI file
/// * `options` - Gap, tail and resolution settings
/// * `yes` - Overwrite an existing output without asking
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success or declined overwrite, 1 on error
pub fn run(
    inputs: &[String],
    output: &str,
    options: &MergeOptions,
    yes: bool,
    json_output: bool,
) -> Result<ExitCode> {
    debug!(inputs = inputs.len(), output, ?options, "merge");
    if json_output {
        run_json(inputs, output, options, yes)
    } else {
        run_human(inputs, output, options, yes)
    }
}

fn run_human(inputs: &[String], output: &str, options: &MergeOptions, yes: bool) -> Result<ExitCode> {
    let config = options.config()?;

    let missing = missing_files(inputs, None);
    if !missing.is_empty() {
        print_missing(&missing);
        return Ok(ExitCode::from(1));
    }

    let out_path = Path::new(output);
    if out_path.is_file() && !yes && !ask_overwrite(out_path)? {
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Merging MIDI files...".cyan().bold());
    let merged = merge_files(inputs, &config).context("Failed to merge MIDI files")?;
    print_report(&merged.report);

    std::fs::write(out_path, &merged.bytes)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    println!(
        "{} MIDI file {} created successfully.",
        "SUCCESS".green().bold(),
        output
    );
    println!("{} {}", "Hash:".dimmed(), &merged.hash[..16]);
    Ok(ExitCode::SUCCESS)
}

fn run_json(inputs: &[String], output: &str, options: &MergeOptions, yes: bool) -> Result<ExitCode> {
    let config = match options.config() {
        Ok(config) => config,
        Err(e) => {
            let error = JsonError::new(error_codes::INVALID_ARGUMENT, e.to_string());
            print_json(&RunOutput::failure("merge", output, vec![error]))?;
            return Ok(ExitCode::from(1));
        }
    };

    let missing = missing_files(inputs, None);
    if !missing.is_empty() {
        print_json(&RunOutput::failure("merge", output, missing_to_json(&missing)))?;
        return Ok(ExitCode::from(1));
    }

    let out_path = Path::new(output);
    if out_path.is_file() && !yes {
        let error = JsonError::new(
            error_codes::OUTPUT_EXISTS,
            format!("Output file {} exists; pass --yes to overwrite", output),
        )
        .with_file(output);
        print_json(&RunOutput::failure("merge", output, vec![error]))?;
        return Ok(ExitCode::from(1));
    }

    let merged = match merge_files(inputs, &config) {
        Ok(merged) => merged,
        Err(e) => {
            print_json(&RunOutput::failure("merge", output, vec![coded_error_to_json(&e)]))?;
            return Ok(ExitCode::from(1));
        }
    };

    if let Err(e) = std::fs::write(out_path, &merged.bytes) {
        let error = JsonError::new(error_codes::WRITE_OUTPUT, e.to_string()).with_file(output);
        print_json(&RunOutput::failure("merge", output, vec![error]))?;
        return Ok(ExitCode::from(1));
    }

    let mut result = RunOutput::success("merge", output);
    result.midi_hash = Some(merged.hash);
    result.report = Some(merged.report);
    print_json(&result)?;
    Ok(ExitCode::SUCCESS)
}
