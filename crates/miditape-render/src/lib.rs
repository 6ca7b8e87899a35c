//! miditape render pipeline - MIDI to MP3 through external tools
//!
//! This crate turns a Standard MIDI File into an MP3 by driving two
//! subprocesses: fluidsynth renders the MIDI to raw PCM with an SF2 sound
//! bank, and lame encodes that PCM.
//!
//! # Tool Discovery
//!
//! Each executable is searched in the following order:
//! 1. The path set in [`PipelineConfig`]
//! 2. `MIDITAPE_FLUIDSYNTH` / `MIDITAPE_LAME` environment variables
//! 3. System PATH
//! 4. Common installation directories
//!
//! # Modes
//!
//! [`ConversionMode::Sequential`] renders the whole file into memory before
//! encoding. [`ConversionMode::Streamed`] pipes the renderer straight into the
//! encoder. Both report the failing tool and its exit status.
//!
//! # Example
//!
//! ```ignore
//! use miditape_render::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::with_config(PipelineConfig::with_soundfont("GeneralUser.sf2"));
//! pipeline.convert_file("song.mid".as_ref(), "song.mp3".as_ref())?;
//! ```

pub mod error;
pub mod pipeline;
pub mod tools;

pub use error::{RenderError, RenderResult};
pub use pipeline::{
    ConversionMode, Pipeline, PipelineConfig, DEFAULT_BITRATE_KBPS, DEFAULT_SOUNDFONT,
};
pub use tools::{locate, Tool};
