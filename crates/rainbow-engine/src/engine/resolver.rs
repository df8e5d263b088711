use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::{
    InvalidStateError,
    core::{BlockId, Board, Direction, Position, Rank},
};

/// Where one block ends up after a move.
///
/// `to` is the block's resting cell, or the cell of the block it merges into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockMove {
    pub block: BlockId,
    pub rank: Rank,
    pub from: Position,
    pub to: Position,
    pub merged_into: Option<BlockId>,
}

impl BlockMove {
    /// Whether the block disappears into another one when the move is committed.
    #[must_use]
    pub fn is_merged_away(&self) -> bool {
        self.merged_into.is_some()
    }

    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.from == self.to && self.merged_into.is_none()
    }
}

/// Two blocks combining into one of the next rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Merge {
    /// Block that slid into the target.
    pub source: BlockId,
    /// Block that was already there and gets replaced.
    pub target: BlockId,
    /// Cell of the target, where the successor appears.
    pub position: Position,
    /// Rank of the successor.
    pub rank: Rank,
}

/// Logical outcome of one move, before the merge cleanup.
///
/// Produced by [`resolve_move`]. While a plan is pending, merged-away blocks have
/// left their cells and their targets are flagged; [`ResolutionPlan::commit`]
/// replaces every merged pair with its successor and brings the board back to a
/// settled state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPlan {
    direction: Direction,
    moves: Vec<BlockMove>,
    merges: Vec<Merge>,
}

impl ResolutionPlan {
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// One entry per block that was on the board, in processing order.
    #[must_use]
    pub fn moves(&self) -> &[BlockMove] {
        &self.moves
    }

    #[must_use]
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Whether the move changed nothing on the board.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.moves.iter().all(BlockMove::is_stationary)
    }

    /// Number of blocks that changed cell, merged-away blocks included.
    #[must_use]
    pub fn moved_blocks(&self) -> usize {
        self.moves.iter().filter(|m| !m.is_stationary()).count()
    }

    /// Replaces each merged pair with a block of the next rank.
    ///
    /// Both blocks are removed before the successor is spawned on the target's
    /// cell. Returns the successors in merge order.
    #[instrument(level = "debug", skip_all, fields(direction = %self.direction))]
    pub fn commit(self, board: &mut Board) -> Result<Vec<BlockId>, InvalidStateError> {
        let mut successors = Vec::with_capacity(self.merges.len());
        for merge in &self.merges {
            let target = board
                .block(merge.target)
                .ok_or(InvalidStateError::UnknownBlock { id: merge.target })?;
            if !target.is_merging() || target.cell() != Some(merge.position) {
                return Err(InvalidStateError::Inconsistent {
                    position: merge.position,
                });
            }

            board.remove(merge.source);
            board.remove(merge.target);
            let successor = board.spawn(merge.position, merge.rank)?;
            debug!(
                source = %merge.source,
                target = %merge.target,
                successor = %successor,
                position = %merge.position,
                rank = %merge.rank,
                "merged blocks"
            );
            successors.push(successor);
        }
        Ok(successors)
    }
}

/// Sort key placing blocks nearest the destination edge first.
///
/// A block can then only be blocked by blocks that already reached their final
/// cell, which makes chained slides and merges resolvable in a single pass.
fn processing_key(direction: Direction, position: Position) -> (i16, usize, usize) {
    (-direction.progress(position), position.y(), position.x())
}

/// Slides every block of `board` as far as it goes in `direction`.
///
/// Equal-rank neighbors merge; each block is the target of at most one merge
/// per move. The board's occupancy is updated in place. Merged-away blocks stay
/// alive until the returned plan is committed.
///
/// Blocks are processed leading edge first for every direction, so horizontal
/// moves do not follow a plain `(y, x)` sort of the board.
#[instrument(level = "debug", skip(board), fields(blocks = board.len()))]
pub fn resolve_move(
    board: &mut Board,
    direction: Direction,
) -> Result<ResolutionPlan, InvalidStateError> {
    let mut order = Vec::with_capacity(board.len());
    for block in board.blocks() {
        if block.is_merging() || block.merge_target().is_some() {
            return Err(InvalidStateError::AlreadyMerging { id: block.id() });
        }
        let cell = block
            .cell()
            .ok_or(InvalidStateError::BlockNotPlaced { id: block.id() })?;
        order.push((block.id(), block.rank(), cell));
    }
    order.sort_by_key(|&(_, _, cell)| processing_key(direction, cell));

    let mut moves = Vec::with_capacity(order.len());
    let mut merges = Vec::new();

    // A merge target is always ahead of its source, so it has already settled
    // when the source claims it.
    for (id, rank, from) in order {
        let grid = board.grid();
        let mut current = from;
        let mut merge_with = None;
        while let Some(next) = grid.neighbor(current, direction) {
            match board.occupant(next) {
                None => current = next,
                Some(other) if other.can_merge(rank) => {
                    merge_with = Some((other.id(), next));
                    break;
                }
                Some(_) => break,
            }
        }

        if current != from {
            board.move_block(id, current)?;
        }

        let block_move = match merge_with {
            Some((target, position)) => {
                board.claim_merge(id, target)?;
                let successor_rank = rank
                    .next()
                    .ok_or(InvalidStateError::AlreadyMerging { id: target })?;
                merges.push(Merge {
                    source: id,
                    target,
                    position,
                    rank: successor_rank,
                });
                trace!(block = %id, %from, to = %position, %target, "slides into merge");
                BlockMove {
                    block: id,
                    rank,
                    from,
                    to: position,
                    merged_into: Some(target),
                }
            }
            None => {
                trace!(block = %id, %from, to = %current, "slides");
                BlockMove {
                    block: id,
                    rank,
                    from,
                    to: current,
                    merged_into: None,
                }
            }
        };
        moves.push(block_move);
    }

    debug!(
        moved = moves.iter().filter(|m| !m.is_stationary()).count(),
        merges = merges.len(),
        "move resolved"
    );
    Ok(ResolutionPlan {
        direction,
        moves,
        merges,
    })
}

#[cfg(test)]
mod tests {
    use crate::core::Grid;

    use super::*;

    fn rank(value: u8) -> Rank {
        Rank::new(value).unwrap()
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y)
    }

    /// Builds a board from rows written top row first; `.` is an empty cell,
    /// digits are ranks.
    fn board_from_rows(rows: &[&str]) -> Board {
        let height = u8::try_from(rows.len()).unwrap();
        let width = u8::try_from(rows[0].len()).unwrap();
        let mut board = Board::new(Grid::new(width, height));
        for (row_index, row) in rows.iter().enumerate() {
            let y = height - 1 - u8::try_from(row_index).unwrap();
            for (x, c) in row.chars().enumerate() {
                if let Some(value) = c.to_digit(10) {
                    let value = u8::try_from(value).unwrap();
                    board
                        .spawn(pos(u8::try_from(x).unwrap(), y), rank(value))
                        .unwrap();
                }
            }
        }
        board
    }

    fn board_to_rows(board: &Board) -> Vec<String> {
        let grid = board.grid();
        (0..grid.height())
            .rev()
            .map(|y| {
                (0..grid.width())
                    .map(|x| {
                        let position = pos(u8::try_from(x).unwrap(), u8::try_from(y).unwrap());
                        board
                            .occupant(position)
                            .map_or('.', |block| char::from(b'0' + block.rank().get()))
                    })
                    .collect()
            })
            .collect()
    }

    fn play(rows: &[&str], direction: Direction) -> Vec<String> {
        let mut board = board_from_rows(rows);
        let plan = resolve_move(&mut board, direction).unwrap();
        plan.commit(&mut board).unwrap();
        board.check_consistency().unwrap();
        board_to_rows(&board)
    }

    mod sliding {
        use super::*;

        #[test]
        fn test_single_block_reaches_each_edge() {
            let rows = ["....", ".1..", "....", "...."];
            assert_eq!(play(&rows, Direction::Right), ["....", "...1", "....", "...."]);
            assert_eq!(play(&rows, Direction::Left), ["....", "1...", "....", "...."]);
            assert_eq!(play(&rows, Direction::Up), [".1..", "....", "....", "...."]);
            assert_eq!(play(&rows, Direction::Down), ["....", "....", "....", ".1.."]);
        }

        #[test]
        fn test_chain_packs_against_edge() {
            assert_eq!(play(&["1.2.3"], Direction::Right), ["..123"]);
            assert_eq!(play(&["1.2.3"], Direction::Left), ["123.."]);
        }

        #[test]
        fn test_blocked_by_different_rank() {
            assert_eq!(play(&["2..1"], Direction::Right), ["..21"]);
        }

        #[test]
        fn test_columns_move_independently() {
            let rows = ["1.", "..", ".2", "3."];
            assert_eq!(play(&rows, Direction::Down), ["..", "..", "1.", "32"]);
        }
    }

    mod merging {
        use super::*;

        #[test]
        fn test_pair_merges_at_far_edge() {
            let mut board = board_from_rows(&["....", "....", "....", "11.."]);
            let plan = resolve_move(&mut board, Direction::Right).unwrap();

            assert_eq!(plan.merges().len(), 1);
            let merge = plan.merges()[0];
            assert_eq!(merge.position, pos(3, 0));
            assert_eq!(merge.rank, rank(2));

            let successors = plan.commit(&mut board).unwrap();
            assert_eq!(successors.len(), 1);
            assert_eq!(board.len(), 1);
            let block = board.block(successors[0]).unwrap();
            assert_eq!(block.cell(), Some(pos(3, 0)));
            assert_eq!(block.rank(), rank(2));
        }

        #[test]
        fn test_three_in_a_row_merges_leading_pair() {
            assert_eq!(play(&["111."], Direction::Right), ["..12"]);
            assert_eq!(play(&["111."], Direction::Left), ["21.."]);
        }

        #[test]
        fn test_four_in_a_row_makes_two_pairs() {
            assert_eq!(play(&["1111"], Direction::Right), ["..22"]);
            assert_eq!(play(&["1111"], Direction::Left), ["22.."]);
        }

        #[test]
        fn test_successor_does_not_merge_again_in_same_move() {
            assert_eq!(play(&["2.11"], Direction::Right), ["..22"]);
        }

        #[test]
        fn test_merge_vertical() {
            let rows = ["1", "1", "2", "2"];
            assert_eq!(play(&rows, Direction::Up), ["2", "3", ".", "."]);
            assert_eq!(play(&rows, Direction::Down), [".", ".", "2", "3"]);
        }

        #[test]
        fn test_merge_across_gap() {
            assert_eq!(play(&["3..3"], Direction::Left), ["4..."]);
        }

        #[test]
        fn test_no_block_is_target_twice() {
            let mut board = board_from_rows(&["1111", "2.22", "1.1.", "3333"]);
            for direction in Direction::ALL {
                let mut board = board.clone();
                let plan = resolve_move(&mut board, direction).unwrap();
                let mut targets: Vec<_> = plan.merges().iter().map(|m| m.target).collect();
                let count = targets.len();
                targets.sort();
                targets.dedup();
                assert_eq!(targets.len(), count, "{direction}");
                for merge in plan.merges() {
                    assert!(!plan.merges().iter().any(|m| m.source == merge.target));
                }
            }
            let plan = resolve_move(&mut board, Direction::Left).unwrap();
            plan.commit(&mut board).unwrap();
            assert_eq!(board_to_rows(&board), ["22..", "32..", "2...", "44.."]);
        }

        #[test]
        fn test_merge_conserves_blocks() {
            let mut board = board_from_rows(&["1111", "2.22", "1.1.", "3333"]);
            let before = board.len();
            let plan = resolve_move(&mut board, Direction::Right).unwrap();
            let merges = plan.merges().len();
            let sources: Vec<Rank> = plan
                .moves()
                .iter()
                .filter(|m| m.is_merged_away())
                .map(|m| m.rank)
                .collect();
            let successors = plan.commit(&mut board).unwrap();

            assert_eq!(board.len(), before - merges);
            for (successor, source_rank) in successors.iter().zip(sources) {
                let successor_rank = board.block(*successor).unwrap().rank();
                assert_eq!(successor_rank.get(), source_rank.get() + 1);
            }
        }
    }

    mod plan {
        use super::*;

        #[test]
        fn test_reports_every_block() {
            let mut board = board_from_rows(&["1.2.", "...1"]);
            let plan = resolve_move(&mut board, Direction::Left).unwrap();
            assert_eq!(plan.moves().len(), 3);
            assert_eq!(plan.direction(), Direction::Left);
        }

        #[test]
        fn test_merged_block_moves_to_target_cell() {
            let mut board = board_from_rows(&["1..1"]);
            let plan = resolve_move(&mut board, Direction::Left).unwrap();

            let merged: Vec<_> = plan.moves().iter().filter(|m| m.is_merged_away()).collect();
            assert_eq!(merged.len(), 1);
            assert_eq!(merged[0].from, pos(3, 0));
            assert_eq!(merged[0].to, pos(0, 0));
            assert_eq!(plan.moved_blocks(), 1);
        }

        #[test]
        fn test_pending_plan_leaves_source_detached() {
            let mut board = board_from_rows(&["1..1"]);
            let plan = resolve_move(&mut board, Direction::Left).unwrap();

            let merge = plan.merges()[0];
            assert_eq!(board.block(merge.source).unwrap().cell(), None);
            assert!(board.block(merge.target).unwrap().is_merging());
            assert_eq!(board.len(), 2);
            assert!(resolve_move(&mut board, Direction::Right).is_err());
        }

        #[test]
        fn test_targets_settle_before_their_sources() {
            for rows in [["1111"], ["11.1"], ["2211"]] {
                for direction in [Direction::Left, Direction::Right] {
                    let mut board = board_from_rows(&rows);
                    let plan = resolve_move(&mut board, direction).unwrap();
                    let index_of =
                        |id: BlockId| plan.moves().iter().position(|m| m.block == id).unwrap();
                    assert!(!plan.merges().is_empty());
                    for merge in plan.merges() {
                        assert!(index_of(merge.target) < index_of(merge.source));
                        let target_move = plan.moves()[index_of(merge.target)];
                        assert!(!target_move.is_merged_away());
                        assert_eq!(target_move.to, merge.position);
                    }
                }
            }
        }

        #[test]
        fn test_no_legal_move_is_noop() {
            let rows = ["12", "21"];
            let mut board = board_from_rows(&rows);
            let plan = resolve_move(&mut board, Direction::Down).unwrap();
            assert!(plan.is_noop());
            assert!(plan.merges().is_empty());
            assert_eq!(plan.moved_blocks(), 0);
            plan.commit(&mut board).unwrap();
            assert_eq!(board_to_rows(&board), rows);
        }

        #[test]
        fn test_empty_board() {
            let mut board = Board::new(Grid::new(4, 4));
            let plan = resolve_move(&mut board, Direction::Up).unwrap();
            assert!(plan.is_noop());
            assert!(plan.moves().is_empty());
        }
    }

    #[test]
    fn test_settled_state_after_every_direction() {
        let rows = ["12.1", "1.21", "3311", ".2.2"];
        for direction in Direction::ALL {
            let mut board = board_from_rows(&rows);
            let plan = resolve_move(&mut board, direction).unwrap();
            plan.commit(&mut board).unwrap();
            assert!(board.check_consistency().is_ok(), "{direction}");
            for cell in board.cells() {
                if let Some(id) = cell.occupant() {
                    assert_eq!(board.block(id).unwrap().cell(), Some(cell.position()));
                }
            }
        }
    }
}
