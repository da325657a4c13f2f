//! Command-line flags.

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maze_crawl_core::GameConfig;

/// Chat source feeding the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum TransportKind {
    /// Anonymous read-only Twitch chat.
    Twitch,
    /// `sender: text` lines from standard input.
    Stdin,
}

/// Presentation used for the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum RendererKind {
    /// Macroquad window.
    Window,
    /// Text frames on standard output.
    Terminal,
    /// No presentation; progress is only logged.
    Headless,
}

/// Crowd-controlled maze crawler driven by chat commands.
#[derive(Debug, Parser)]
#[command(name = "maze-crawl", version, about)]
pub(crate) struct Cli {
    /// Chat channel to join.
    #[arg(long, default_value = "the_aia")]
    pub(crate) channel: String,

    /// Where chat messages come from.
    #[arg(long, value_enum, default_value_t = TransportKind::Twitch)]
    pub(crate) transport: TransportKind,

    /// How the game is presented.
    #[arg(long, value_enum, default_value_t = RendererKind::Window)]
    pub(crate) renderer: RendererKind,

    /// TOML file overriding the default tuning values.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Seed for maze generation; a time-based seed is used when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

impl Cli {
    /// Resolves the game configuration from the optional file and flags.
    pub(crate) fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if config.seed.is_none() {
            config.seed = Some(time_seed());
        }

        config.validate().context("invalid game configuration")?;
        Ok(config)
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
        })
}
