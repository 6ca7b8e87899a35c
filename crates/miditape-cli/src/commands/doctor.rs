//! Doctor command implementation
//!
//! Checks that the external tools and the default sound bank are available.

use anyhow::Result;
use colored::Colorize;
use miditape_render::{locate, Tool, DEFAULT_SOUNDFONT};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

/// Run the doctor command
///
/// Checks:
/// - fluidsynth installation
/// - lame installation
/// - Default sound bank
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run() -> Result<ExitCode> {
    println!("{}", "miditape Doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} miditape-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "  {} miditape-merge v{}",
        "->".green(),
        miditape_merge::VERSION
    );
    println!();

    println!("{}", "Dependencies:".bold());
    for tool in Tool::ALL {
        match check_tool(tool) {
            ToolStatus::Found { path, version } => {
                println!(
                    "  {} {} {} ({})",
                    "ok".green(),
                    tool,
                    version.as_deref().unwrap_or("(version unknown)"),
                    path.display()
                );
            }
            ToolStatus::NotFound => {
                println!("  {} {} not found", "!!".red(), tool);
                println!(
                    "     {}",
                    format!(
                        "Install {} or point {} at the executable.",
                        tool,
                        tool.env_var()
                    )
                    .dimmed()
                );
                all_ok = false;
            }
        }
    }
    println!();

    println!("{}", "Sound bank:".bold());
    if Path::new(DEFAULT_SOUNDFONT).is_file() {
        println!("  {} {}", "ok".green(), DEFAULT_SOUNDFONT);
    } else {
        println!("  {} {} not found", "!!".yellow(), DEFAULT_SOUNDFONT);
        println!(
            "     {}",
            "Pass another SF2 file to convert with --soundfont.".dimmed()
        );
        // Not a hard failure - any sound bank can be given per run
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Status of an external tool check
enum ToolStatus {
    Found {
        path: PathBuf,
        version: Option<String>,
    },
    NotFound,
}

fn check_tool(tool: Tool) -> ToolStatus {
    let Some(path) = locate(tool, None) else {
        return ToolStatus::NotFound;
    };
    let version = Command::new(&path)
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| parse_tool_version(&String::from_utf8_lossy(&output.stdout)));
    ToolStatus::Found { path, version }
}

/// Parses the word after "version" on the first line, as printed by both
/// `fluidsynth --version` and `lame --version`.
fn parse_tool_version(output: &str) -> Option<String> {
    let line = output.lines().find(|line| !line.trim().is_empty())?;
    let mut words = line.split_whitespace();
    words.find(|word| word.eq_ignore_ascii_case("version"))?;
    words.next().map(|v| v.to_string())
}
