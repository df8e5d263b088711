use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rainbow_engine::{GameConfig, GameSession, SpawnSeed};

use crate::util;

use self::{config::ConfigArg, play::PlayArg, simulate::SimulateArg};

mod config;
mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Play many games with an automatic input policy and report the outcomes
    Simulate(#[clap(flatten)] SimulateArg),
    /// Validate and print the effective game configuration
    Config(#[clap(flatten)] ConfigArg),
}

/// Options of commands that start games.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Game configuration file (JSON); missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Spawn seed as 32 hex digits; random if omitted
    #[arg(long)]
    seed: Option<SpawnSeed>,
}

impl GameArg {
    pub(crate) fn load_config(&self) -> anyhow::Result<GameConfig> {
        load_config(self.config.as_deref())
    }

    pub(crate) fn start_session(&self) -> anyhow::Result<GameSession> {
        let config = self.load_config()?;
        let session = match self.seed {
            Some(seed) => GameSession::with_seed(config, seed)?,
            None => GameSession::new(config)?,
        };
        Ok(session)
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => util::read_config_file(path),
        None => Ok(GameConfig::default()),
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Config(arg) => config::run(&arg)?,
    }
    Ok(())
}
