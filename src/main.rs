use anyhow::Result;
use clap::Parser;

use caption_align::config;

mod cli;
mod pipeline;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg = config::Config::load(args.config.as_deref())?;
    config::init_tracing(&cfg.logging, args.log_level.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "capalign starting");

    match args.command {
        cli::Command::Check(cmd) => pipeline::run_check(cmd, &cfg),
        cli::Command::FillWordGaps(cmd) => pipeline::run_fill_word_gaps(cmd, &cfg),
        cli::Command::FillSentenceGaps(cmd) => pipeline::run_fill_sentence_gaps(cmd, &cfg),
        cli::Command::Split(cmd) => pipeline::run_split(cmd, &cfg),
        cli::Command::Drag(cmd) => pipeline::run_drag(cmd, &cfg),
        cli::Command::Follow(cmd) => pipeline::run_follow(cmd, &cfg),
        cli::Command::Ruler(cmd) => pipeline::run_ruler(cmd, &cfg),
        cli::Command::PrintDefaultConfig => {
            let s = cfg.to_toml_pretty()?;
            print!("{s}");
            Ok(())
        }
    }
}
