//! JSON output types for machine-readable CLI output.
//!
//! Printed by `convert` and `merge` when `--json` is given.

use miditape_merge::MergeReport;
use serde::{Deserialize, Serialize};

/// Error codes for CLI-level failures.
///
/// Library failures pass through their own codes (`MERGE_xxx`, `RENDER_xxx`).
pub mod error_codes {
    /// An input file does not exist
    pub const INPUT_NOT_FOUND: &str = "CLI_001";
    /// The sound bank does not exist
    pub const SOUNDFONT_NOT_FOUND: &str = "CLI_002";
    /// The output exists and overwriting was not confirmed
    pub const OUTPUT_EXISTS: &str = "CLI_003";
    /// Writing the output file failed
    pub const WRITE_OUTPUT: &str = "CLI_004";
    /// Invalid command-line value
    pub const INVALID_ARGUMENT: &str = "CLI_005";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "MERGE_003")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// File the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Result of a `convert` or `merge` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Whether the command succeeded
    pub success: bool,
    /// Command name ("convert" or "merge")
    pub command: String,
    /// Output file path
    pub output: String,
    /// BLAKE3 hash of the merged MIDI bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_hash: Option<String>,
    /// Merge summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<MergeReport>,
    /// Conversion mode used by `convert`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Errors encountered
    pub errors: Vec<JsonError>,
}

impl RunOutput {
    /// Creates a successful output.
    pub fn success(command: &str, output: impl Into<String>) -> Self {
        Self {
            success: true,
            command: command.to_string(),
            output: output.into(),
            midi_hash: None,
            report: None,
            mode: None,
            errors: Vec::new(),
        }
    }

    /// Creates a failed output.
    pub fn failure(command: &str, output: impl Into<String>, errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            ..Self::success(command, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_error_skips_empty_file() {
        let error = JsonError::new(error_codes::OUTPUT_EXISTS, "exists");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": "CLI_003", "message": "exists" })
        );

        let error = error.with_file("out.mp3");
        assert_eq!(error.file.as_deref(), Some("out.mp3"));
    }

    #[test]
    fn test_failure_output() {
        let output = RunOutput::failure(
            "merge",
            "joined.mid",
            vec![JsonError::new(error_codes::INPUT_NOT_FOUND, "missing")],
        );
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["command"], "merge");
        assert_eq!(json["errors"][0]["code"], "CLI_001");
        assert!(json.get("report").is_none());
    }
}
