//! Error types for the render pipeline.

use miditape_merge::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for render pipeline operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering and encoding.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Renderer executable not found.
    #[error("fluidsynth not found. Install it and ensure it is in PATH, or set MIDITAPE_FLUIDSYNTH")]
    RendererNotFound,

    /// Encoder executable not found.
    #[error("lame not found. Install it and ensure it is in PATH, or set MIDITAPE_LAME")]
    EncoderNotFound,

    /// Sound bank file not found.
    #[error("Cannot find soundfont {path}")]
    SoundFontNotFound { path: PathBuf },

    /// Failed to spawn an external tool.
    #[error("Failed to spawn {tool} process: {source}")]
    SpawnFailed {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Renderer exited with non-zero status.
    #[error("Failed to convert MIDI to raw audio (fluidsynth exit status {exit_code}){}", stderr_suffix(.stderr))]
    RendererFailure { exit_code: i32, stderr: String },

    /// Encoder exited with non-zero status.
    #[error("Failed to convert raw audio to MP3 (lame exit status {exit_code}){}", stderr_suffix(.stderr))]
    EncoderFailure { exit_code: i32, stderr: String },

    /// Failed to write the intermediate MIDI file.
    #[error("Failed to write intermediate MIDI file: {0}")]
    WriteMidiFailed(#[source] std::io::Error),

    /// IO error while talking to a subprocess.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl RenderError {
    /// Creates a new renderer failure.
    pub fn renderer_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::RendererFailure {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new encoder failure.
    pub fn encoder_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::EncoderFailure {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Exit status of the failing tool, if a tool failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RenderError::RendererFailure { exit_code, .. }
            | RenderError::EncoderFailure { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

impl ErrorCode for RenderError {
    fn code(&self) -> &'static str {
        match self {
            RenderError::RendererNotFound => "RENDER_001",
            RenderError::EncoderNotFound => "RENDER_002",
            RenderError::SoundFontNotFound { .. } => "RENDER_003",
            RenderError::SpawnFailed { .. } => "RENDER_004",
            RenderError::RendererFailure { .. } => "RENDER_005",
            RenderError::EncoderFailure { .. } => "RENDER_006",
            RenderError::WriteMidiFailed(_) => "RENDER_007",
            RenderError::Io(_) => "RENDER_008",
        }
    }

    fn category(&self) -> &'static str {
        "render"
    }
}
