//! MIDI to MP3 conversion through fluidsynth and lame.
//!
//! The renderer is invoked as `fluidsynth -l -T raw -F - <soundfont> <midi>`
//! and writes raw PCM to stdout. The encoder is invoked as
//! `lame -b <bitrate> -r - <output>` and reads that PCM from stdin.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStderr, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::tools::{locate, Tool};

/// Sound bank used when none is given.
pub const DEFAULT_SOUNDFONT: &str = "/usr/share/sounds/sf2/FluidR3_GM.sf2";

/// MP3 bitrate used when none is given, in kbit/s.
pub const DEFAULT_BITRATE_KBPS: u32 = 256;

/// How renderer output reaches the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Render all PCM into memory, then feed it to the encoder.
    #[default]
    Sequential,
    /// Connect the renderer's stdout directly to the encoder's stdin.
    Streamed,
}

impl ConversionMode {
    /// Returns the mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::Sequential => "sequential",
            ConversionMode::Streamed => "streamed",
        }
    }
}

impl std::fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the conversion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Explicit renderer executable. Discovered when `None`.
    pub renderer_path: Option<PathBuf>,
    /// Explicit encoder executable. Discovered when `None`.
    pub encoder_path: Option<PathBuf>,
    /// SF2 sound bank handed to the renderer.
    pub soundfont: PathBuf,
    /// MP3 bitrate in kbit/s.
    pub bitrate_kbps: u32,
    pub mode: ConversionMode,
    /// Capture tool stderr for error reports instead of inheriting it.
    pub capture_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            renderer_path: None,
            encoder_path: None,
            soundfont: PathBuf::from(DEFAULT_SOUNDFONT),
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            mode: ConversionMode::default(),
            capture_output: true,
        }
    }
}

impl PipelineConfig {
    /// Creates a new config with the given sound bank.
    pub fn with_soundfont(soundfont: impl Into<PathBuf>) -> Self {
        Self {
            soundfont: soundfont.into(),
            ..Default::default()
        }
    }

    /// Sets the renderer executable.
    pub fn renderer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.renderer_path = Some(path.into());
        self
    }

    /// Sets the encoder executable.
    pub fn encoder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.encoder_path = Some(path.into());
        self
    }

    /// Sets the sound bank.
    pub fn soundfont(mut self, soundfont: impl Into<PathBuf>) -> Self {
        self.soundfont = soundfont.into();
        self
    }

    /// Sets the MP3 bitrate.
    pub fn bitrate_kbps(mut self, bitrate: u32) -> Self {
        self.bitrate_kbps = bitrate;
        self
    }

    /// Sets the conversion mode.
    pub fn mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets whether tool stderr is captured.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }
}

/// Converts MIDI data to MP3 with external tools.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline with default configuration.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Creates a pipeline with the given configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Locates the renderer executable.
    pub fn find_renderer(&self) -> RenderResult<PathBuf> {
        locate(Tool::Renderer, self.config.renderer_path.as_deref())
            .ok_or(RenderError::RendererNotFound)
    }

    /// Locates the encoder executable.
    pub fn find_encoder(&self) -> RenderResult<PathBuf> {
        locate(Tool::Encoder, self.config.encoder_path.as_deref())
            .ok_or(RenderError::EncoderNotFound)
    }

    /// Converts encoded SMF bytes to an MP3 file at `out_path`.
    ///
    /// The bytes are written to a temporary `.mid` file that lives until the
    /// conversion finishes.
    pub fn convert(&self, midi: &[u8], out_path: &Path) -> RenderResult<()> {
        let mut file = tempfile::Builder::new()
            .prefix("miditape_")
            .suffix(".mid")
            .tempfile()
            .map_err(RenderError::WriteMidiFailed)?;
        file.write_all(midi).map_err(RenderError::WriteMidiFailed)?;
        file.flush().map_err(RenderError::WriteMidiFailed)?;
        debug!(path = %file.path().display(), bytes = midi.len(), "wrote intermediate MIDI");

        self.convert_file(file.path(), out_path)
    }

    /// Converts the MIDI file at `midi_path` to an MP3 file at `out_path`.
    pub fn convert_file(&self, midi_path: &Path, out_path: &Path) -> RenderResult<()> {
        if !self.config.soundfont.exists() {
            return Err(RenderError::SoundFontNotFound {
                path: self.config.soundfont.clone(),
            });
        }
        let renderer = self.renderer_command(&self.find_renderer()?, midi_path);
        let encoder = self.encoder_command(&self.find_encoder()?, out_path);

        info!(
            midi = %midi_path.display(),
            output = %out_path.display(),
            mode = %self.config.mode,
            "converting MIDI to MP3"
        );
        match self.config.mode {
            ConversionMode::Sequential => self.run_sequential(renderer, encoder),
            ConversionMode::Streamed => self.run_streamed(renderer, encoder),
        }
    }

    fn renderer_command(&self, renderer: &Path, midi_path: &Path) -> Command {
        // fluidsynth -l -T raw -F - <soundfont> <midi>
        let mut cmd = Command::new(renderer);
        cmd.arg("-l")
            .arg("-T")
            .arg("raw")
            .arg("-F")
            .arg("-")
            .arg(&self.config.soundfont)
            .arg(midi_path);
        cmd
    }

    fn encoder_command(&self, encoder: &Path, out_path: &Path) -> Command {
        // lame -b <bitrate> -r - <output>
        let mut cmd = Command::new(encoder);
        cmd.arg("-b")
            .arg(self.config.bitrate_kbps.to_string())
            .arg("-r")
            .arg("-")
            .arg(out_path);
        cmd
    }

    fn stderr_stdio(&self) -> Stdio {
        if self.config.capture_output {
            Stdio::piped()
        } else {
            Stdio::inherit()
        }
    }

    fn run_sequential(&self, mut renderer: Command, mut encoder: Command) -> RenderResult<()> {
        renderer
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(self.stderr_stdio());
        let rendered = renderer.output().map_err(|source| RenderError::SpawnFailed {
            tool: Tool::Renderer.program(),
            source,
        })?;
        if !rendered.status.success() {
            return Err(RenderError::renderer_failed(
                exit_code(rendered.status),
                String::from_utf8_lossy(&rendered.stderr),
            ));
        }
        debug!(bytes = rendered.stdout.len(), "rendered raw audio");

        encoder
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(self.stderr_stdio());
        let mut child = encoder.spawn().map_err(|source| RenderError::SpawnFailed {
            tool: Tool::Encoder.program(),
            source,
        })?;

        // Feed stdin from a separate thread so a full stderr pipe cannot stall us.
        let stdin = child.stdin.take();
        let pcm = rendered.stdout;
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&pcm)?;
            }
            Ok(())
        });

        let encoded = child.wait_with_output()?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("encoder stdin writer panicked")));

        if !encoded.status.success() {
            return Err(RenderError::encoder_failed(
                exit_code(encoded.status),
                String::from_utf8_lossy(&encoded.stderr),
            ));
        }
        written?;
        Ok(())
    }

    fn run_streamed(&self, mut renderer: Command, mut encoder: Command) -> RenderResult<()> {
        renderer
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(self.stderr_stdio());
        let mut render_child = renderer.spawn().map_err(|source| RenderError::SpawnFailed {
            tool: Tool::Renderer.program(),
            source,
        })?;

        let pcm = render_child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("renderer stdout was not captured"))?;
        encoder
            .stdin(Stdio::from(pcm))
            .stdout(Stdio::null())
            .stderr(self.stderr_stdio());
        let spawned = encoder.spawn();
        // The command still owns the read end of the pipe; close it here so the
        // renderer sees a broken pipe if the encoder goes away.
        drop(encoder);
        let mut encode_child = match spawned {
            Ok(child) => child,
            Err(source) => {
                let _ = render_child.kill();
                let _ = render_child.wait();
                return Err(RenderError::SpawnFailed {
                    tool: Tool::Encoder.program(),
                    source,
                });
            }
        };

        let render_stderr = drain(render_child.stderr.take());
        let encode_stderr = drain(encode_child.stderr.take());

        let render_status = render_child.wait();
        let encode_status = encode_child.wait();
        let render_stderr = join_drain(render_stderr);
        let encode_stderr = join_drain(encode_stderr);

        let render_status: ExitStatus = render_status?;
        let encode_status: ExitStatus = encode_status?;
        // A renderer killed by a broken pipe only failed because the encoder
        // stopped reading; report the encoder then.
        let encoder_failed = !encode_status.success();
        if !render_status.success() && !(encoder_failed && broken_pipe(render_status)) {
            return Err(RenderError::renderer_failed(
                exit_code(render_status),
                render_stderr,
            ));
        }
        if encoder_failed {
            return Err(RenderError::encoder_failed(
                exit_code(encode_status),
                encode_stderr,
            ));
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

const SIGPIPE: i32 = 13;

/// Whether `status` is a death by SIGPIPE, directly or as reported by a shell.
fn broken_pipe(status: ExitStatus) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(SIGPIPE) {
            return true;
        }
    }
    status.code() == Some(128 + SIGPIPE)
}

fn drain(stream: Option<ChildStderr>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.soundfont, PathBuf::from(DEFAULT_SOUNDFONT));
        assert_eq!(config.bitrate_kbps, 256);
        assert_eq!(config.mode, ConversionMode::Sequential);
        assert!(config.renderer_path.is_none());
        assert!(config.encoder_path.is_none());
        assert!(config.capture_output);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::with_soundfont("piano.sf2")
            .renderer_path("/opt/fluidsynth")
            .encoder_path("/opt/lame")
            .bitrate_kbps(128)
            .mode(ConversionMode::Streamed)
            .capture_output(false);

        assert_eq!(config.soundfont, PathBuf::from("piano.sf2"));
        assert_eq!(config.renderer_path, Some(PathBuf::from("/opt/fluidsynth")));
        assert_eq!(config.encoder_path, Some(PathBuf::from("/opt/lame")));
        assert_eq!(config.bitrate_kbps, 128);
        assert_eq!(config.mode, ConversionMode::Streamed);
        assert!(!config.capture_output);
    }

    #[test]
    fn test_command_lines() {
        let pipeline = Pipeline::with_config(PipelineConfig::with_soundfont("bank.sf2"));

        let renderer = pipeline.renderer_command(Path::new("fluidsynth"), Path::new("in.mid"));
        let args: Vec<_> = renderer.get_args().map(|a| a.to_string_lossy()).collect();
        assert_eq!(args, vec!["-l", "-T", "raw", "-F", "-", "bank.sf2", "in.mid"]);

        let encoder = pipeline.encoder_command(Path::new("lame"), Path::new("out.mp3"));
        let args: Vec<_> = encoder.get_args().map(|a| a.to_string_lossy()).collect();
        assert_eq!(args, vec!["-b", "256", "-r", "-", "out.mp3"]);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ConversionMode::Sequential.as_str(), "sequential");
        assert_eq!(ConversionMode::Streamed.to_string(), "streamed");
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_pipe_status() {
        use std::os::unix::process::ExitStatusExt;

        assert!(broken_pipe(ExitStatus::from_raw(SIGPIPE)));
        assert!(broken_pipe(ExitStatus::from_raw(141 << 8)));
        assert!(!broken_pipe(ExitStatus::from_raw(3 << 8)));
        assert!(!broken_pipe(ExitStatus::from_raw(0)));
    }

    #[test]
    fn test_missing_soundfont() {
        let pipeline = Pipeline::with_config(PipelineConfig::with_soundfont(
            "this/does/not/exist.sf2",
        ));
        let err = pipeline
            .convert_file(Path::new("in.mid"), Path::new("out.mp3"))
            .unwrap_err();
        assert!(matches!(err, RenderError::SoundFontNotFound { .. }));
    }
}
