use std::time::{Duration, Instant};

use rainbow_engine::{BlockMove, ResolutionPlan};

use crate::view::widgets::{TilePlacement, cell_coordinates};

/// Linear slide of every block of one move, from its old cell to its new one.
#[derive(Debug, Clone)]
pub struct MoveAnimation {
    moves: Vec<BlockMove>,
    started_at: Instant,
    duration: Duration,
}

impl MoveAnimation {
    pub fn new(plan: &ResolutionPlan, started_at: Instant, duration: Duration) -> Self {
        let mut moves = plan.moves().to_vec();
        // merged-away blocks go under the blocks they merge into
        moves.sort_by_key(|block_move| !block_move.is_merged_away());
        Self {
            moves,
            started_at,
            duration,
        }
    }

    /// Elapsed fraction of the animation, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Where each tile is drawn at `now`.
    pub fn placements(&self, now: Instant) -> Vec<TilePlacement> {
        let t = self.progress(now);
        self.moves
            .iter()
            .map(|block_move| {
                let (from_x, from_y) = cell_coordinates(block_move.from);
                let (to_x, to_y) = cell_coordinates(block_move.to);
                TilePlacement {
                    rank: block_move.rank,
                    x: from_x + (to_x - from_x) * t,
                    y: from_y + (to_y - from_y) * t,
                }
            })
            .collect()
    }
}
