//! Discovery of the external synthesizer and encoder executables.

use std::path::{Path, PathBuf};

use tracing::debug;

/// An external tool the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Software synthesizer producing raw PCM (fluidsynth).
    Renderer,
    /// MP3 encoder reading raw PCM (lame).
    Encoder,
}

impl Tool {
    /// Both tools, in pipeline order.
    pub const ALL: [Tool; 2] = [Tool::Renderer, Tool::Encoder];

    /// Name of the executable.
    pub fn program(&self) -> &'static str {
        match self {
            Tool::Renderer => "fluidsynth",
            Tool::Encoder => "lame",
        }
    }

    /// Environment variable that overrides discovery.
    pub fn env_var(&self) -> &'static str {
        match self {
            Tool::Renderer => "MIDITAPE_FLUIDSYNTH",
            Tool::Encoder => "MIDITAPE_LAME",
        }
    }

    fn candidate_names(&self) -> Vec<String> {
        if cfg!(windows) {
            vec![format!("{}.exe", self.program()), self.program().to_string()]
        } else {
            vec![self.program().to_string()]
        }
    }

    fn common_paths(&self) -> Vec<PathBuf> {
        let dirs: &[&str] = if cfg!(windows) {
            match self {
                Tool::Renderer => &["C:\\Program Files\\FluidSynth\\bin"],
                Tool::Encoder => &["C:\\Program Files\\LAME", "C:\\Program Files (x86)\\LAME"],
            }
        } else if cfg!(target_os = "macos") {
            &["/opt/homebrew/bin", "/usr/local/bin"]
        } else {
            &["/usr/bin", "/usr/local/bin", "/snap/bin"]
        };

        let names = self.candidate_names();
        dirs.iter()
            .flat_map(|dir| names.iter().map(move |name| Path::new(dir).join(name)))
            .collect()
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// Locates `tool`.
///
/// Order: the configured path, the tool's environment variable, `PATH`, then
/// common installation directories.
pub fn locate(tool: Tool, configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        debug!(tool = %tool, path = %path.display(), "configured path does not exist");
    }

    if let Some(path) = std::env::var_os(tool.env_var()) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    for name in tool.candidate_names() {
        if let Ok(path) = which::which(&name) {
            return Some(path);
        }
    }

    tool.common_paths().into_iter().find(|path| path.exists())
}
