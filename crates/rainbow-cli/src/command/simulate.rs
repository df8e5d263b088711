use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rainbow_engine::{Direction, GameConfig, GameSession, GameState, GameStats, SpawnSeed};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::debug;

use crate::{command::GameArg, logging, util::Output};

/// How the simulated player picks directions.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::FromStr)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Uniformly random direction each move
    #[default]
    Random,
    /// Down, left, up, right, repeated
    Cycle,
}

impl Policy {
    const CYCLE: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Right,
    ];

    fn choose(self, move_index: usize, rng: &mut Pcg32) -> Direction {
        match self {
            Policy::Random => Direction::ALL[rng.random_range(0..Direction::ALL.len())],
            Policy::Cycle => Self::CYCLE[move_index % Self::CYCLE.len()],
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    game: GameArg,
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,
    /// Input policy: random or cycle
    #[arg(long, default_value = "random")]
    policy: Policy,
    /// Moves after which a game is counted as unfinished
    #[arg(long, default_value_t = 10_000)]
    max_moves: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Win,
    Lose,
    Unfinished,
}

#[derive(Debug, Clone, Serialize)]
struct GameRecord {
    index: usize,
    seed: SpawnSeed,
    outcome: Outcome,
    rounds: usize,
    stats: GameStats,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
struct Totals {
    wins: usize,
    losses: usize,
    unfinished: usize,
}

impl Totals {
    fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::Unfinished => self.unfinished += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SimulationReport {
    generated_at: DateTime<Utc>,
    seed: SpawnSeed,
    policy: Policy,
    max_moves: usize,
    config: GameConfig,
    totals: Totals,
    games: Vec<GameRecord>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        game,
        games,
        policy,
        max_moves,
        output,
    } = arg;
    logging::init_stderr()?;

    let config = game.load_config()?;
    let seed = game.seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Simulating {games} games ({policy:?} policy, seed {seed})...");

    let report = simulate(&config, seed, *policy, *games, *max_moves)?;
    Output::save_json(&report, output.clone())?;

    let Totals {
        wins,
        losses,
        unfinished,
    } = report.totals;
    eprintln!();
    eprintln!("Simulation completed");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Wins: {wins}");
    eprintln!("  Losses: {losses}");
    eprintln!("  Unfinished: {unfinished}");
    Ok(())
}

/// Plays `games` games; game seeds and policy randomness are derived from `seed`.
fn simulate(
    config: &GameConfig,
    seed: SpawnSeed,
    policy: Policy,
    games: usize,
    max_moves: usize,
) -> anyhow::Result<SimulationReport> {
    let mut rng = Pcg32::from_seed(seed.to_bytes());
    let mut totals = Totals::default();
    let mut records = Vec::with_capacity(games);

    for index in 0..games {
        let game_seed: SpawnSeed = rng.random();
        let mut policy_rng = Pcg32::from_rng(&mut rng);
        let record = play_game(config, index, game_seed, policy, max_moves, &mut policy_rng)?;
        debug!(
            game = index,
            seed = %record.seed,
            outcome = ?record.outcome,
            moves = record.stats.moves(),
            "game finished"
        );
        totals.count(record.outcome);
        records.push(record);
    }

    Ok(SimulationReport {
        generated_at: Utc::now(),
        seed,
        policy,
        max_moves,
        config: config.clone(),
        totals,
        games: records,
    })
}

fn play_game(
    config: &GameConfig,
    index: usize,
    seed: SpawnSeed,
    policy: Policy,
    max_moves: usize,
    rng: &mut Pcg32,
) -> anyhow::Result<GameRecord> {
    let mut session = GameSession::with_seed(config.clone(), seed)?;
    while !session.state().is_terminal() && session.stats().moves() < max_moves {
        let direction = policy.choose(session.stats().moves(), rng);
        session.play_turn(direction)?;
    }

    let outcome = match session.state() {
        GameState::Win => Outcome::Win,
        GameState::Lose => Outcome::Lose,
        _ => Outcome::Unfinished,
    };
    Ok(GameRecord {
        index,
        seed,
        outcome,
        rounds: session.round(),
        stats: session.stats().clone(),
    })
}
