//! End-to-end tests driving the `miditape` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use miditape_merge::{Event, Sequence, Track};
use pretty_assertions::assert_eq;

// =============================================================================
// Helper Functions
// =============================================================================

fn miditape_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_miditape"))
}

fn run(args: &[&str], dir: &Path, stdin: &str) -> Output {
    let mut child = Command::new(miditape_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn write_score(dir: &Path, name: &str, length: u32) {
    let sequence = Sequence::new(
        384,
        vec![
            Track::from_events(vec![Event::tempo_change(0, 500_000), Event::terminator(length)]),
            Track::from_events(vec![
                Event::note_on(0, 0, 67, 100),
                Event::note_on(length, 0, 67, 0),
                Event::terminator(0),
            ]),
        ],
    );
    std::fs::write(dir.join(name), sequence.to_bytes().unwrap()).unwrap();
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_merge_json_reports_totals() {
    let dir = tempfile::tempdir().unwrap();
    write_score(dir.path(), "one.mid", 1536);
    write_score(dir.path(), "two.mid", 3840);

    let output = run(
        &["merge", "--json", "-o", "joined.mid", "one.mid", "two.mid"],
        dir.path(),
        "",
    );
    assert!(output.status.success(), "{:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["report"]["track_count"], 2);
    assert_eq!(json["report"]["total_ticks"], 1536 + 1536 + 3840 + 768);
    assert!(dir.path().join("joined.mid").is_file());
}

#[test]
fn test_convert_lists_every_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    write_score(dir.path(), "present.mid", 384);

    let output = run(
        &[
            "convert",
            "present.mid",
            "absent.mid",
            "gone.mid",
            "-s",
            "nowhere.sf2",
        ],
        dir.path(),
        "",
    );
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cannot find file absent.mid."));
    assert!(stdout.contains("Cannot find file gone.mid."));
    assert!(stdout.contains("Cannot find soundfont nowhere.sf2."));
    assert!(!stdout.contains("present.mid"));
}

#[test]
fn test_declined_overwrite_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    write_score(dir.path(), "one.mid", 384);
    std::fs::write(dir.path().join("joined.mid"), b"keep").unwrap();

    let output = run(&["merge", "-o", "joined.mid", "one.mid"], dir.path(), "n\n");
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Continue? (y/N) > "));
    assert_eq!(std::fs::read(dir.path().join("joined.mid")).unwrap(), b"keep");
}

#[test]
fn test_accepted_overwrite_replaces_output() {
    let dir = tempfile::tempdir().unwrap();
    write_score(dir.path(), "one.mid", 384);
    std::fs::write(dir.path().join("joined.mid"), b"keep").unwrap();

    let output = run(&["merge", "-o", "joined.mid", "one.mid"], dir.path(), "y\n");
    assert!(output.status.success(), "{:?}", output);
    assert_ne!(std::fs::read(dir.path().join("joined.mid")).unwrap(), b"keep");
}

#[cfg(unix)]
#[test]
fn test_convert_with_stand_in_tools() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    write_score(dir.path(), "song.mid", 768);
    std::fs::write(dir.path().join("bank.sf2"), b"sfbk").unwrap();

    let tools = tempfile::tempdir().unwrap();
    let renderer = tools.path().join("fluidsynth");
    std::fs::write(&renderer, "#!/bin/sh\nprintf 'PCM'\n").unwrap();
    let encoder = tools.path().join("lame");
    std::fs::write(&encoder, "#!/bin/sh\ncat > \"$5\"\n").unwrap();
    for tool in [&renderer, &encoder] {
        std::fs::set_permissions(tool, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    for parallel in [false, true] {
        let mut args = vec!["convert", "-y", "-s", "bank.sf2", "song.mid"];
        if parallel {
            args.push("-p");
        }
        let output = Command::new(miditape_binary())
            .args(&args)
            .current_dir(dir.path())
            .env("NO_COLOR", "1")
            .env("MIDITAPE_FLUIDSYNTH", &renderer)
            .env("MIDITAPE_LAME", &encoder)
            .output()
            .unwrap();

        assert!(output.status.success(), "{:?}", output);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("MP3 file song.mp3 created successfully."));
        assert_eq!(std::fs::read(dir.path().join("song.mp3")).unwrap(), b"PCM");
    }
}
