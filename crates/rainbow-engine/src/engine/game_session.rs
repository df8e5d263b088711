use arrayvec::ArrayVec;
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    InvalidStateError, SessionError, TurnError,
    core::{BlockId, Board, Cell, Direction, Position, Rank},
};

use super::{
    GameStats, MAX_INPUT_BUFFER,
    config::GameConfig,
    resolver::{ResolutionPlan, resolve_move},
    spawner::{SpawnSeed, Spawner},
};

/// Phase of the turn state machine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum GameState {
    GenerateLevel,
    SpawningBlocks,
    WaitingInput,
    Moving,
    Win,
    Lose,
}

impl GameState {
    /// Whether the game is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// Outcome of a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    pub direction: Direction,
    pub merges: usize,
    pub moved_blocks: usize,
    /// Blocks created by merges, in merge order.
    pub successors: Vec<BlockId>,
    /// Blocks created by the spawning phase that followed the move.
    pub spawned: Vec<BlockId>,
    /// State the session rests in after the turn.
    pub state: GameState,
}

/// One game, from level generation to win or loss.
///
/// The session advances through the automatic phases (`GenerateLevel`,
/// `SpawningBlocks`) on its own and rests in `WaitingInput`, `Moving`, `Win` or
/// `Lose`. A move is played in two steps: [`GameSession::try_move`] resolves it and
/// hands the plan to the presentation layer, [`GameSession::animation_complete`]
/// commits the merges once the presentation has caught up.
///
/// # Example
///
/// ```
/// use rainbow_engine::{Direction, GameConfig, GameSession, GameState, SpawnSeed};
///
/// let seed: SpawnSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let mut session = GameSession::with_seed(GameConfig::default(), seed).unwrap();
/// assert_eq!(session.board().len(), 2);
///
/// let summary = session.play_turn(Direction::Down).unwrap();
/// assert_eq!(summary.state, GameState::WaitingInput);
/// assert_eq!(session.round(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    seed: SpawnSeed,
    spawner: Spawner,
    board: Board,
    state: GameState,
    round: usize,
    stats: GameStats,
    pending: Option<ResolutionPlan>,
    inputs: ArrayVec<Direction, MAX_INPUT_BUFFER>,
    last_spawned: Vec<BlockId>,
}

impl GameSession {
    /// Starts a game with a random seed.
    pub fn new(config: GameConfig) -> Result<Self, SessionError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Starts a game whose spawn placement is fully determined by `seed`.
    pub fn with_seed(config: GameConfig, seed: SpawnSeed) -> Result<Self, SessionError> {
        config.validate()?;
        let mut session = Self {
            board: Board::new(config.grid()),
            config,
            seed,
            spawner: Spawner::with_seed(seed),
            state: GameState::GenerateLevel,
            round: 0,
            stats: GameStats::new(),
            pending: None,
            inputs: ArrayVec::new(),
            last_spawned: Vec::new(),
        };
        debug!(%seed, "session created");
        session.advance()?;
        Ok(session)
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Number of spawning phases run since the level was generated.
    #[must_use]
    pub fn round(&self) -> usize {
        self.round
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn seed(&self) -> SpawnSeed {
        self.seed
    }

    /// Plan of the move being animated, while in `Moving`.
    #[must_use]
    pub fn pending_plan(&self) -> Option<&ResolutionPlan> {
        self.pending.as_ref()
    }

    /// Blocks created by the most recent spawning phase.
    #[must_use]
    pub fn last_spawned(&self) -> &[BlockId] {
        &self.last_spawned
    }

    /// Directions queued by [`GameSession::push_input`], oldest first.
    #[must_use]
    pub fn pending_inputs(&self) -> &[Direction] {
        &self.inputs
    }

    /// Queues a direction to be played once the session waits for input.
    ///
    /// Returns `false` if the input was dropped because the queue is full or the
    /// game is over.
    pub fn push_input(&mut self, direction: Direction) -> bool {
        if self.state.is_terminal() || self.inputs.len() >= self.config.input_buffer {
            debug!(%direction, state = %self.state, "input dropped");
            return false;
        }
        self.inputs.try_push(direction).is_ok()
    }

    /// Starts the oldest queued move, if the session is waiting for input.
    ///
    /// The direction stays queued if the move cannot be resolved. Such an error
    /// aborts the turn; slides applied before it was detected are not undone.
    pub fn process_input(&mut self) -> Result<Option<&ResolutionPlan>, TurnError> {
        if self.state != GameState::WaitingInput {
            return Ok(None);
        }
        let Some(&direction) = self.inputs.first() else {
            return Ok(None);
        };
        self.try_move(direction)?;
        self.inputs.remove(0);
        Ok(self.pending.as_ref())
    }

    /// Resolves a move and enters `Moving`.
    ///
    /// The board already reflects the slides when this returns; merged pairs are
    /// replaced by their successors in [`GameSession::animation_complete`].
    #[instrument(level = "debug", skip(self), fields(round = self.round))]
    pub fn try_move(&mut self, direction: Direction) -> Result<&ResolutionPlan, TurnError> {
        if self.state != GameState::WaitingInput {
            return Err(TurnError::NotAwaitingInput { state: self.state });
        }
        let plan = resolve_move(&mut self.board, direction)?;
        self.change_state(GameState::Moving);
        Ok(&*self.pending.insert(plan))
    }

    /// Signals that the presentation finished animating the pending move.
    ///
    /// Commits the merges and runs the following spawning phase.
    pub fn animation_complete(&mut self) -> Result<TurnSummary, InvalidStateError> {
        if self.state != GameState::Moving {
            return Err(InvalidStateError::NoPendingMove);
        }
        let plan = self.pending.take().ok_or(InvalidStateError::NoPendingMove)?;
        let direction = plan.direction();
        let merges = plan.merges().len();
        let moved_blocks = plan.moved_blocks();

        let successors = plan.commit(&mut self.board)?;
        debug_assert!(
            self.board.check_consistency().is_ok(),
            "board is not settled after commit"
        );
        self.stats
            .complete_move(merges, moved_blocks, self.board.max_rank());

        self.change_state(GameState::SpawningBlocks);
        self.advance()?;
        Ok(TurnSummary {
            direction,
            merges,
            moved_blocks,
            successors,
            spawned: self.last_spawned.clone(),
            state: self.state,
        })
    }

    /// Plays a whole turn without waiting for any presentation.
    pub fn play_turn(&mut self, direction: Direction) -> Result<TurnSummary, TurnError> {
        self.try_move(direction)?;
        Ok(self.animation_complete()?)
    }

    /// Discards the current game and generates a new level.
    ///
    /// The configuration is kept and the random stream continues, so a restarted
    /// game differs from the first one but stays reproducible from the seed.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.inputs.clear();
        self.pending = None;
        self.change_state(GameState::GenerateLevel);
        self.advance()?;
        Ok(())
    }

    /// Runs the automatic phases until the session needs input or is over.
    fn advance(&mut self) -> Result<(), InvalidStateError> {
        loop {
            let next = match self.state {
                GameState::GenerateLevel => self.generate_level(),
                GameState::SpawningBlocks => self.spawn_round()?,
                GameState::WaitingInput | GameState::Moving | GameState::Win | GameState::Lose => {
                    return Ok(());
                }
            };
            self.change_state(next);
        }
    }

    fn change_state(&mut self, next: GameState) {
        debug!(from = %self.state, to = %next, round = self.round, "state changed");
        self.state = next;
        if next.is_terminal() {
            self.inputs.clear();
            info!(
                outcome = %next,
                round = self.round,
                moves = self.stats.moves(),
                best_rank = ?self.stats.best_rank(),
                "game over"
            );
        }
    }

    fn generate_level(&mut self) -> GameState {
        self.round = 0;
        self.board = Board::new(self.config.grid());
        self.stats = GameStats::new();
        self.pending = None;
        self.last_spawned.clear();
        GameState::SpawningBlocks
    }

    /// Spawns this round's blocks and evaluates win and loss.
    fn spawn_round(&mut self) -> Result<GameState, InvalidStateError> {
        self.last_spawned.clear();
        if self.has_won() {
            return Ok(GameState::Win);
        }

        let amount = self.config.spawn.amount_for_round(self.round);
        self.round += 1;
        let free: Vec<Position> = self.board.free_cells().map(Cell::position).collect();
        if free.len() < amount {
            debug!(free = free.len(), amount, "not enough free cells to spawn");
            return Ok(GameState::Lose);
        }

        for position in self.spawner.choose_cells(free, amount) {
            let id = self.board.spawn(position, Rank::MIN)?;
            self.stats.record_spawn(Rank::MIN);
            debug!(
                block = %id,
                %position,
                color = %self.config.block_types.color_of(Rank::MIN),
                "spawned block"
            );
            self.last_spawned.push(id);
        }

        if self.has_won() {
            Ok(GameState::Win)
        } else {
            Ok(GameState::WaitingInput)
        }
    }

    fn has_won(&self) -> bool {
        self.board
            .max_rank()
            .is_some_and(|rank| rank >= self.config.win_condition)
    }
}
