//! Grid-resolution engine for a rank-merging sliding puzzle.
//!
//! Blocks of equal [`Rank`] that collide while sliding merge into a single block of
//! the next rank. A [`GameSession`] drives level generation, spawning, move
//! resolution and win/loss evaluation; presentation is left to the caller, which
//! receives a [`ResolutionPlan`] per move and signals back when it has finished
//! animating it.
//!
//! ```
//! use rainbow_engine::{Direction, GameConfig, GameSession, GameState};
//!
//! let mut session = GameSession::new(GameConfig::default()).unwrap();
//! assert_eq!(session.state(), GameState::WaitingInput);
//!
//! let plan = session.try_move(Direction::Left).unwrap();
//! for block_move in plan.moves() {
//!     // animate block_move.from -> block_move.to
//!     let _ = (block_move.from, block_move.to);
//! }
//! session.animation_complete().unwrap();
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Internal consistency violation of the board or the turn sequence.
///
/// These never happen during normal play; they indicate a programming error and
/// abort the turn in which they are detected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidStateError {
    #[display("cell {position} is already occupied")]
    CellOccupied { position: Position },
    #[display("cell {position} is outside the grid")]
    OutOfGrid { position: Position },
    #[display("block {id} is not on the board")]
    UnknownBlock { id: BlockId },
    #[display("block {id} does not occupy a cell")]
    BlockNotPlaced { id: BlockId },
    #[display("block {id} is already part of a merge")]
    AlreadyMerging { id: BlockId },
    #[display("cell {position} and its occupant disagree")]
    Inconsistent { position: Position },
    #[display("no move is waiting for its animation to complete")]
    NoPendingMove,
}

/// Rejected game configuration.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u8, height: u8 },
    #[display("grid side must not exceed {max}, got {width}x{height}")]
    GridTooLarge { width: u8, height: u8, max: u8 },
    #[display("no block type defined for rank {rank}")]
    MissingBlockType { rank: Rank },
    #[display("block type for rank {rank} is defined more than once")]
    DuplicateBlockType { rank: Rank },
    #[display("spawn amount must be at least 1")]
    ZeroSpawnAmount,
    #[display("input buffer must hold between 1 and {max} directions, got {size}")]
    InputBufferSize { size: usize, max: usize },
}

/// Error returned when a turn cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TurnError {
    #[display("session is not waiting for input (state: {state})")]
    #[from(ignore)]
    NotAwaitingInput { state: GameState },
    #[display("{_0}")]
    InvalidState(InvalidStateError),
}

/// Error returned when a session cannot be created or restarted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("{_0}")]
    InvalidState(InvalidStateError),
}
