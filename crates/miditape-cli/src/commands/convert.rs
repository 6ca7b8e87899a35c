//! Convert command implementation
//!
//! Joins MIDI files and renders the result to a single MP3.

use anyhow::{Context, Result};
use colored::Colorize;
use miditape_merge::merge_files;
use miditape_render::{ConversionMode, Pipeline, PipelineConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use super::json_output::{error_codes, JsonError, RunOutput};
use super::reporting::{
    ask_overwrite, coded_error_to_json, missing_to_json, print_json, print_missing, print_report,
};
use super::MergeOptions;
use crate::checks::{default_output_path, missing_files};

/// Settings for one `convert` run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// MIDI files, in play order
    pub inputs: Vec<String>,
    /// Output MP3 path; derived from the first input when `None`
    pub output: Option<String>,
    /// SF2 sound bank
    pub soundfont: String,
    /// MP3 bitrate in kbit/s
    pub bitrate: u32,
    /// Render and encode in parallel
    pub parallel: bool,
    /// Overwrite an existing output without asking
    pub yes: bool,
    pub merge: MergeOptions,
}

impl ConvertOptions {
    /// Output path, falling back to the first input's name with `.mp3`.
    pub fn output_path(&self) -> PathBuf {
        match (&self.output, self.inputs.first()) {
            (Some(output), _) => PathBuf::from(output),
            (None, Some(first)) => default_output_path(Path::new(first)),
            (None, None) => PathBuf::from("out.mp3"),
        }
    }

    fn mode(&self) -> ConversionMode {
        if self.parallel {
            ConversionMode::Streamed
        } else {
            ConversionMode::Sequential
        }
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::with_config(
            PipelineConfig::with_soundfont(&self.soundfont)
                .bitrate_kbps(self.bitrate)
                .mode(self.mode()),
        )
    }
}

/// Run the convert command
///
/// # Returns
/// Exit code: 0 success or declined overwrite, 1 on error
pub fn run(options: &ConvertOptions, json_output: bool) -> Result<ExitCode> {
    debug!(?options, "convert");
    if json_output {
        run_json(options)
    } else {
        run_human(options)
    }
}

fn run_human(options: &ConvertOptions) -> Result<ExitCode> {
    let config = options.merge.config()?;

    let missing = missing_files(&options.inputs, Some(Path::new(&options.soundfont)));
    if !missing.is_empty() {
        print_missing(&missing);
        return Ok(ExitCode::from(1));
    }

    let out_path = options.output_path();
    if out_path.is_file() && !options.yes && !ask_overwrite(&out_path)? {
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Preparing MIDI for conversion...".cyan().bold());
    let merged = merge_files(&options.inputs, &config)
        .context("Failed to generate intermediate MIDI file")?;
    print_report(&merged.report);

    match options.mode() {
        ConversionMode::Sequential => {
            println!("{}", "Converting MIDI to raw audio, then encoding as MP3...".cyan().bold())
        }
        ConversionMode::Streamed => println!("{}", "Converting MIDI to MP3...".cyan().bold()),
    }
    options.pipeline().convert(&merged.bytes, &out_path)?;

    println!(
        "{} MP3 file {} created successfully.",
        "SUCCESS".green().bold(),
        out_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_json(options: &ConvertOptions) -> Result<ExitCode> {
    let out_path = options.output_path();
    let output = out_path.display().to_string();

    let config = match options.merge.config() {
        Ok(config) => config,
        Err(e) => {
            let error = JsonError::new(error_codes::INVALID_ARGUMENT, e.to_string());
            print_json(&RunOutput::failure("convert", output, vec![error]))?;
            return Ok(ExitCode::from(1));
        }
    };

    let missing = missing_files(&options.inputs, Some(Path::new(&options.soundfont)));
    if !missing.is_empty() {
        print_json(&RunOutput::failure("convert", output, missing_to_json(&missing)))?;
        return Ok(ExitCode::from(1));
    }

    if out_path.is_file() && !options.yes {
        let error = JsonError::new(
            error_codes::OUTPUT_EXISTS,
            format!("Output file {} exists; pass --yes to overwrite", output),
        )
        .with_file(output.clone());
        print_json(&RunOutput::failure("convert", output, vec![error]))?;
        return Ok(ExitCode::from(1));
    }

    let merged = match merge_files(&options.inputs, &config) {
        Ok(merged) => merged,
        Err(e) => {
            print_json(&RunOutput::failure("convert", output, vec![coded_error_to_json(&e)]))?;
            return Ok(ExitCode::from(1));
        }
    };

    let mut result = RunOutput::success("convert", output);
    result.mode = Some(options.mode().to_string());
    result.midi_hash = Some(merged.hash);

    if let Err(e) = options.pipeline().convert(&merged.bytes, &out_path) {
        result.success = false;
        result.errors.push(coded_error_to_json(&e));
        print_json(&result)?;
        return Ok(ExitCode::from(1));
    }

    result.report = Some(merged.report);
    print_json(&result)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use miditape_merge::ResolutionPolicy;

    fn options(inputs: &[&str], output: Option<&str>) -> ConvertOptions {
        ConvertOptions {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.map(str::to_string),
            soundfont: "bank.sf2".to_string(),
            bitrate: 256,
            parallel: false,
            yes: false,
            merge: MergeOptions {
                gap_secs: 2.0,
                tail_secs: 1.0,
                resolution: ResolutionPolicy::Passthrough,
            },
        }
    }

    #[test]
    fn test_output_path_defaults_to_first_input() {
        let opts = options(&["scores/part1.midi", "scores/part2.midi"], None);
        assert_eq!(opts.output_path(), PathBuf::from("part1.mp3"));

        let opts = options(&["part1.mid"], Some("album/side_a.mp3"));
        assert_eq!(opts.output_path(), PathBuf::from("album/side_a.mp3"));
    }

    #[test]
    fn test_parallel_selects_streamed_mode() {
        let mut opts = options(&["a.mid"], None);
        assert_eq!(opts.mode(), ConversionMode::Sequential);
        opts.parallel = true;
        assert_eq!(opts.mode(), ConversionMode::Streamed);
        assert_eq!(opts.pipeline().config().mode, ConversionMode::Streamed);
    }

    #[test]
    fn test_missing_soundfont_fails_before_work() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mid");
        std::fs::write(&input, b"MThd").unwrap();
        let output = dir.path().join("a.mp3");

        let mut opts = options(&[input.to_str().unwrap()], output.to_str());
        opts.soundfont = dir.path().join("missing.sf2").to_string_lossy().into_owned();

        let code = run(&opts, true).unwrap();
        assert_eq!(code, ExitCode::from(1));
        assert!(!output.exists());
    }
}
