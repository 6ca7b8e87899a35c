//! Pipeline tests against stand-in tools.
//!
//! The renderer stand-in prints its arguments as "PCM" and the encoder
//! stand-in copies stdin into its output argument, so the produced file shows
//! exactly how the renderer was invoked.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use miditape_render::{ConversionMode, Pipeline, PipelineConfig, RenderError};
use pretty_assertions::assert_eq;

// Writing an executable while another test thread forks can leave the file
// busy, so tests in this file run one at a time.
static SERIAL: Mutex<()> = Mutex::new(());

// =============================================================================
// Helper Functions
// =============================================================================

const ECHO_RENDERER: &str = "printf '%s\\n' \"$@\"";
const COPY_ENCODER: &str = "cat > \"$5\"";

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Fixture {
    dir: tempfile::TempDir,
    soundfont: PathBuf,
    midi: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let soundfont = dir.path().join("bank.sf2");
        std::fs::write(&soundfont, b"sfbk").unwrap();
        let midi = dir.path().join("song.mid");
        std::fs::write(&midi, b"MThd").unwrap();
        Self {
            dir,
            soundfont,
            midi,
        }
    }

    fn pipeline(&self, renderer: &str, encoder: &str, mode: ConversionMode) -> Pipeline {
        let renderer = script(self.dir.path(), "fluidsynth", renderer);
        let encoder = script(self.dir.path(), "lame", encoder);
        Pipeline::with_config(
            PipelineConfig::with_soundfont(&self.soundfont)
                .renderer_path(renderer)
                .encoder_path(encoder)
                .mode(mode),
        )
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("song.mp3")
    }

    fn expected_pcm(&self) -> String {
        format!(
            "-l\n-T\nraw\n-F\n-\n{}\n{}\n",
            self.soundfont.display(),
            self.midi.display()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_sequential_conversion() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ECHO_RENDERER, COPY_ENCODER, ConversionMode::Sequential);

    pipeline.convert_file(&fixture.midi, &fixture.output()).unwrap();

    let written = std::fs::read_to_string(fixture.output()).unwrap();
    assert_eq!(written, fixture.expected_pcm());
}

#[test]
fn test_streamed_conversion() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ECHO_RENDERER, COPY_ENCODER, ConversionMode::Streamed);

    pipeline.convert_file(&fixture.midi, &fixture.output()).unwrap();

    let written = std::fs::read_to_string(fixture.output()).unwrap();
    assert_eq!(written, fixture.expected_pcm());
}

#[test]
fn test_convert_bytes_uses_temporary_file() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    // The renderer stand-in emits the MIDI file it was given.
    let pipeline = fixture.pipeline("cat \"$7\"", COPY_ENCODER, ConversionMode::Sequential);

    pipeline.convert(b"MThd-bytes", &fixture.output()).unwrap();

    assert_eq!(std::fs::read(fixture.output()).unwrap(), b"MThd-bytes");
}

#[test]
fn test_renderer_failure_reports_status() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();

    for mode in [ConversionMode::Sequential, ConversionMode::Streamed] {
        let pipeline = fixture.pipeline("echo 'no such preset' >&2; exit 3", COPY_ENCODER, mode);
        let err = pipeline
            .convert_file(&fixture.midi, &fixture.output())
            .unwrap_err();

        match err {
            RenderError::RendererFailure { exit_code, stderr } => {
                assert_eq!(exit_code, 3);
                assert!(stderr.contains("no such preset"));
            }
            other => panic!("expected renderer failure in {} mode, got {:?}", mode, other),
        }
    }
}

#[test]
fn test_encoder_failure_reports_status() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();

    for mode in [ConversionMode::Sequential, ConversionMode::Streamed] {
        let pipeline = fixture.pipeline(
            ECHO_RENDERER,
            "cat > /dev/null; echo 'bad bitrate' >&2; exit 4",
            mode,
        );
        let err = pipeline
            .convert_file(&fixture.midi, &fixture.output())
            .unwrap_err();

        assert_eq!(err.exit_code(), Some(4), "mode {}", mode);
        assert!(err.to_string().contains("bad bitrate"));
        assert!(matches!(err, RenderError::EncoderFailure { .. }));
    }
}

#[test]
fn test_encoder_exiting_early_is_blamed() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();

    // The renderer outlives the encoder's stdin and dies of a broken pipe.
    for mode in [ConversionMode::Sequential, ConversionMode::Streamed] {
        let pipeline = fixture.pipeline(
            "yes pcm | head -c 10000000",
            "echo 'cannot open output' >&2; exit 4",
            mode,
        );
        let err = pipeline
            .convert_file(&fixture.midi, &fixture.output())
            .unwrap_err();

        match err {
            RenderError::EncoderFailure { exit_code, stderr } => {
                assert_eq!(exit_code, 4, "mode {}", mode);
                assert!(stderr.contains("cannot open output"));
            }
            other => panic!("expected encoder failure in {} mode, got {:?}", mode, other),
        }
    }
}

#[test]
fn test_missing_encoder_is_reported() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    let renderer = script(fixture.dir.path(), "fluidsynth", ECHO_RENDERER);
    let missing = fixture.dir.path().join("no-lame-here");

    let pipeline = Pipeline::with_config(
        PipelineConfig::with_soundfont(&fixture.soundfont)
            .renderer_path(renderer)
            .encoder_path(&missing),
    );

    // Discovery falls back to the system when the configured path is absent.
    match pipeline.find_encoder() {
        Ok(found) => assert_ne!(found, missing),
        Err(err) => assert!(matches!(err, RenderError::EncoderNotFound)),
    }
}
