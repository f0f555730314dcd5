use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use caption_align::Handle;

#[derive(Debug, Parser)]
#[command(name = "capalign")]
#[command(about = "Edit word and sentence timing in caption files.")]
pub struct Args {
    /// Path to config TOML (defaults to ./config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the timeline and report broken timing invariants
    Check(CheckCmd),
    /// Close gaps between adjacent words inside each sentence
    FillWordGaps(FillWordGapsCmd),
    /// Close gaps between adjacent sentences
    FillSentenceGaps(FillSentenceGapsCmd),
    /// Split one word into two at a point in time
    Split(SplitCmd),
    /// Move the left or right edge of a word
    Drag(DragCmd),
    /// Simulate playback and print the scroll commands the viewport issues
    Follow(FollowCmd),
    /// Print ruler ticks for a zoom level
    Ruler(RulerCmd),
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct Io {
    /// Input caption JSON, or '-' for stdin
    pub input: String,

    /// Output file path (defaults to <input stem>.aligned.json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Allow overwriting output file
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, ClapArgs)]
pub struct CheckCmd {
    /// Input caption JSON, or '-' for stdin
    pub input: String,
}

#[derive(Debug, ClapArgs)]
pub struct FillWordGapsCmd {
    #[command(flatten)]
    pub io: Io,
}

#[derive(Debug, ClapArgs)]
pub struct FillSentenceGapsCmd {
    #[command(flatten)]
    pub io: Io,

    /// Largest gap to fill per sentence pair (config `gaps.max_gap_seconds` if unset)
    #[arg(long)]
    pub max_gap: Option<String>,

    /// Close every gap fully regardless of --max-gap
    #[arg(long)]
    pub forced: bool,
}

#[derive(Debug, ClapArgs)]
pub struct SplitCmd {
    #[command(flatten)]
    pub io: Io,

    #[arg(long)]
    pub sentence: String,

    #[arg(long)]
    pub word: String,

    /// Absolute split time (seconds or hh:mm:ss.mmm)
    #[arg(long)]
    pub at: String,

    /// Number new words sequentially instead of using UUIDs
    #[arg(long)]
    pub sequential_ids: bool,
}

#[derive(Debug, ClapArgs)]
pub struct DragCmd {
    #[command(flatten)]
    pub io: Io,

    #[arg(long)]
    pub sentence: String,

    #[arg(long)]
    pub word: String,

    #[arg(long, value_enum)]
    pub handle: HandleArg,

    /// Drag distance in seconds
    #[arg(
        long,
        allow_hyphen_values = true,
        required_unless_present = "delta_px",
        conflicts_with = "delta_px"
    )]
    pub delta: Option<String>,

    /// Drag distance in pixels, converted through the zoom level
    #[arg(long, allow_hyphen_values = true)]
    pub delta_px: Option<f64>,

    /// Pixels per second for --delta-px (config `zoom.initial_pixels_per_second` if unset)
    #[arg(long)]
    pub zoom: Option<f64>,
}

#[derive(Debug, ClapArgs)]
pub struct FollowCmd {
    /// Input caption JSON, or '-' for stdin
    pub input: String,

    #[arg(long, default_value = "0")]
    pub from: String,

    #[arg(long)]
    pub to: String,

    /// Seconds between ticks
    #[arg(long, default_value_t = 0.1)]
    pub step: f64,

    /// Ticks arrive with playback paused (no auto-scroll)
    #[arg(long)]
    pub paused: bool,

    #[arg(long)]
    pub zoom: Option<f64>,
}

#[derive(Debug, ClapArgs)]
pub struct RulerCmd {
    /// Timeline length (seconds or hh:mm:ss.mmm)
    #[arg(long)]
    pub duration: String,

    #[arg(long)]
    pub zoom: Option<f64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum HandleArg {
    Left,
    Right,
}

impl From<HandleArg> for Handle {
    fn from(h: HandleArg) -> Self {
        match h {
            HandleArg::Left => Handle::Left,
            HandleArg::Right => Handle::Right,
        }
    }
}
