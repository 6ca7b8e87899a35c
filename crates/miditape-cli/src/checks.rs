//! Pre-flight checks on command inputs and outputs.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// A file the command needs that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingFile {
    Input(PathBuf),
    SoundFont(PathBuf),
}

impl MissingFile {
    pub fn path(&self) -> &Path {
        match self {
            MissingFile::Input(path) | MissingFile::SoundFont(path) => path,
        }
    }
}

impl std::fmt::Display for MissingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingFile::Input(path) => write!(f, "Cannot find file {}.", path.display()),
            MissingFile::SoundFont(path) => write!(f, "Cannot find soundfont {}.", path.display()),
        }
    }
}

/// Lists every input, and the sound bank if given, that is not a regular file.
pub fn missing_files<P: AsRef<Path>>(inputs: &[P], soundfont: Option<&Path>) -> Vec<MissingFile> {
    let mut missing: Vec<MissingFile> = inputs
        .iter()
        .map(AsRef::as_ref)
        .filter(|path| !path.is_file())
        .map(|path| MissingFile::Input(path.to_path_buf()))
        .collect();

    if let Some(soundfont) = soundfont {
        if !soundfont.is_file() {
            missing.push(MissingFile::SoundFont(soundfont.to_path_buf()));
        }
    }
    missing
}

/// Output path used when none is given: the first input's file name with an
/// `.mp3` extension, in the current directory.
pub fn default_output_path(first_input: &Path) -> PathBuf {
    // Only the last extension is replaced: `take.2.mid` becomes `take.2.mp3`.
    let mut name = first_input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".mp3");
    PathBuf::from(name)
}

/// Asks whether `path` may be overwritten. Anything not starting with `y` or
/// `Y` is a no, including end of input.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    path: &Path,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<bool> {
    writeln!(output, "Action would overwrite existing file {}.", path.display())?;
    write!(output, "Continue? (y/N) > ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_start().to_lowercase().starts_with('y'))
}
