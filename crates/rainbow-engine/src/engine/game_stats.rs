use serde::Serialize;

use crate::core::Rank;

/// Per-session counters.
///
/// - **Moves**: accepted directional inputs, including ones that changed nothing
/// - **Merges**: merged pairs across all moves
/// - **Spawned blocks**: blocks created by the spawning phase
/// - **Best rank**: highest rank seen on the board
///
/// # Example
///
/// ```
/// use rainbow_engine::{GameStats, Rank};
///
/// let mut stats = GameStats::new();
/// stats.record_spawn(Rank::MIN);
/// stats.record_spawn(Rank::MIN);
/// stats.complete_move(1, 2, Rank::new(2));
///
/// assert_eq!(stats.moves(), 1);
/// assert_eq!(stats.merges(), 1);
/// assert_eq!(stats.best_rank(), Rank::new(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    moves: usize,
    noop_moves: usize,
    merges: usize,
    spawned_blocks: usize,
    best_rank: Option<Rank>,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            moves: 0,
            noop_moves: 0,
            merges: 0,
            spawned_blocks: 0,
            best_rank: None,
        }
    }

    #[must_use]
    pub const fn moves(&self) -> usize {
        self.moves
    }

    /// Moves in which no block changed cell.
    #[must_use]
    pub const fn noop_moves(&self) -> usize {
        self.noop_moves
    }

    #[must_use]
    pub const fn merges(&self) -> usize {
        self.merges
    }

    #[must_use]
    pub const fn spawned_blocks(&self) -> usize {
        self.spawned_blocks
    }

    #[must_use]
    pub const fn best_rank(&self) -> Option<Rank> {
        self.best_rank
    }

    pub fn record_spawn(&mut self, rank: Rank) {
        self.spawned_blocks += 1;
        self.observe_rank(rank);
    }

    /// Updates statistics after a committed move.
    ///
    /// * `merges` - merged pairs in the move
    /// * `moved_blocks` - blocks that changed cell
    /// * `max_rank` - highest rank on the board afterwards
    pub fn complete_move(&mut self, merges: usize, moved_blocks: usize, max_rank: Option<Rank>) {
        self.moves += 1;
        self.merges += merges;
        if moved_blocks == 0 {
            self.noop_moves += 1;
        }
        if let Some(rank) = max_rank {
            self.observe_rank(rank);
        }
    }

    fn observe_rank(&mut self, rank: Rank) {
        self.best_rank = Some(self.best_rank.map_or(rank, |best| best.max(rank)));
    }
}
