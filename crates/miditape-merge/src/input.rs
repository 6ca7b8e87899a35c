//! Loading inputs and merging whole files.
//!
//! Every input is read fully into memory before any merging starts; parsed
//! sequences borrow from those buffers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{MergeConfig, ResolutionPolicy};
use crate::error::{MergeError, MergeResult};
use crate::merge::{merge_sequences, MergeReport};
use crate::sequence::Sequence;
use crate::ticks::OUTPUT_RESOLUTION;

/// An input file held in memory.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A merged and encoded output file.
#[derive(Debug, Clone)]
pub struct MergedFile {
    /// Encoded SMF bytes.
    pub bytes: Vec<u8>,
    /// BLAKE3 hash of `bytes` (hex).
    pub hash: String,
    pub report: MergeReport,
}

/// Reads every input into memory, in order.
pub fn load_inputs<P: AsRef<Path>>(paths: &[P]) -> MergeResult<Vec<InputFile>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let bytes = fs::read(path).map_err(|source| MergeError::ReadInput {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), bytes = bytes.len(), "loaded input");
            Ok(InputFile {
                path: path.to_path_buf(),
                bytes,
            })
        })
        .collect()
}

/// Parses every input buffer.
pub fn parse_inputs(inputs: &[InputFile]) -> MergeResult<Vec<Sequence<'_>>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            Sequence::parse(&input.bytes).map_err(|e| MergeError::parse(index, e))
        })
        .collect()
}

/// Applies `policy` to inputs whose time base is not the output resolution.
pub fn prepare_inputs<'a>(
    sequences: Vec<Sequence<'a>>,
    policy: ResolutionPolicy,
) -> MergeResult<Vec<Sequence<'a>>> {
    sequences
        .into_iter()
        .enumerate()
        .map(|(index, sequence)| {
            if sequence.ticks_per_beat() == Some(OUTPUT_RESOLUTION) {
                return Ok(sequence);
            }
            match policy {
                ResolutionPolicy::Passthrough => {
                    warn!(
                        file = index,
                        timing = %sequence.describe_timing(),
                        "input resolution differs from output, ticks are merged unscaled"
                    );
                    Ok(sequence)
                }
                ResolutionPolicy::Strict => Err(resolution_mismatch(index, &sequence)),
                ResolutionPolicy::Rescale => match sequence.ticks_per_beat() {
                    Some(source) => {
                        debug!(file = index, source, "rescaling input");
                        sequence.rescaled(OUTPUT_RESOLUTION)
                    }
                    None => Err(resolution_mismatch(index, &sequence)),
                },
            }
        })
        .collect()
}

fn resolution_mismatch(index: usize, sequence: &Sequence<'_>) -> MergeError {
    MergeError::ResolutionMismatch {
        index,
        found: sequence.describe_timing(),
        expected: OUTPUT_RESOLUTION,
    }
}

/// Merges SMF buffers already held in memory.
pub fn merge_inputs(inputs: &[InputFile], config: &MergeConfig) -> MergeResult<MergedFile> {
    config.validate()?;
    let sequences = prepare_inputs(parse_inputs(inputs)?, config.resolution_policy)?;
    let merged = merge_sequences(&sequences, config)?;
    let bytes = merged.sequence.to_bytes()?;
    let hash = blake3::hash(&bytes).to_hex().to_string();

    Ok(MergedFile {
        bytes,
        hash,
        report: merged.report,
    })
}

/// Loads, merges and encodes the files at `paths`.
pub fn merge_files<P: AsRef<Path>>(paths: &[P], config: &MergeConfig) -> MergeResult<MergedFile> {
    let inputs = load_inputs(paths)?;
    merge_inputs(&inputs, config)
}
