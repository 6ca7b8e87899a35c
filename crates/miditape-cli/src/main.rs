//! miditape CLI - Join MIDI files and render them to a single MP3
//!
//! This binary merges LilyPond-style multi-track MIDI files in order, with
//! silence between them, and renders the result through fluidsynth and lame.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use miditape_cli::commands;
use miditape_cli::commands::convert::ConvertOptions;
use miditape_cli::commands::MergeOptions;
use miditape_cli::logging;
use miditape_merge::{ResolutionPolicy, DEFAULT_GAP_SECS, DEFAULT_TAIL_SECS};
use miditape_render::{DEFAULT_BITRATE_KBPS, DEFAULT_SOUNDFONT};

/// miditape - Converts one or more MIDI files to a single MP3
#[derive(Parser)]
#[command(name = "miditape")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge MIDI files and encode them as one MP3
    Convert {
        /// MIDI files, in play order
        #[arg(value_name = "MID", required = true)]
        midifiles: Vec<String>,

        /// Seconds to insert between input files
        #[arg(short, long, default_value_t = DEFAULT_GAP_SECS)]
        gap: f64,

        /// Seconds of silence to append
        #[arg(short, long, default_value_t = DEFAULT_TAIL_SECS)]
        tail: f64,

        /// Output filename (default: first input's name with .mp3)
        #[arg(short, long)]
        out: Option<String>,

        /// Render audio and encode to MP3 in parallel instead of sequentially
        #[arg(short, long)]
        parallel: bool,

        /// Path to the SF2 sound bank
        #[arg(short, long, value_name = "SF2", default_value = DEFAULT_SOUNDFONT)]
        soundfont: String,

        /// MP3 bitrate in kbit/s
        #[arg(long, default_value_t = DEFAULT_BITRATE_KBPS)]
        bitrate: u32,

        /// Handling of inputs not at 384 ticks per beat
        #[arg(long, value_name = "POLICY", default_value_t = ResolutionPolicy::Passthrough)]
        resolution: ResolutionPolicy,

        /// Overwrite an existing output file without asking
        #[arg(short, long)]
        yes: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Merge MIDI files into one MIDI file without rendering audio
    Merge {
        /// MIDI files, in play order
        #[arg(value_name = "MID", required = true)]
        midifiles: Vec<String>,

        /// Output MIDI filename
        #[arg(short, long)]
        out: String,

        /// Seconds to insert between input files
        #[arg(short, long, default_value_t = DEFAULT_GAP_SECS)]
        gap: f64,

        /// Seconds of silence to append
        #[arg(short, long, default_value_t = DEFAULT_TAIL_SECS)]
        tail: f64,

        /// Handling of inputs not at 384 ticks per beat
        #[arg(long, value_name = "POLICY", default_value_t = ResolutionPolicy::Passthrough)]
        resolution: ResolutionPolicy,

        /// Overwrite an existing output file without asking
        #[arg(short, long)]
        yes: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check that fluidsynth, lame and the default sound bank are available
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            midifiles,
            gap,
            tail,
            out,
            parallel,
            soundfont,
            bitrate,
            resolution,
            yes,
            json,
        } => {
            let options = ConvertOptions {
                inputs: midifiles,
                output: out,
                soundfont,
                bitrate,
                parallel,
                yes,
                merge: MergeOptions {
                    gap_secs: gap,
                    tail_secs: tail,
                    resolution,
                },
            };
            commands::convert::run(&options, json)
        }
        Commands::Merge {
            midifiles,
            out,
            gap,
            tail,
            resolution,
            yes,
            json,
        } => {
            let options = MergeOptions {
                gap_secs: gap,
                tail_secs: tail,
                resolution,
            };
            commands::merge::run(&midifiles, &out, &options, yes, json)
        }
        Commands::Doctor => commands::doctor::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
