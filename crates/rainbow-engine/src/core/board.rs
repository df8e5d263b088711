use crate::InvalidStateError;

use super::{
    block::{Block, BlockId, Rank},
    grid::{Cell, Grid, Position},
};

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    block: Option<Block>,
}

/// Owner of every cell and every live block.
///
/// Cells and blocks live in dense arrays: a cell refers to its occupant by
/// [`BlockId`], a block to its cell by [`Position`]. All mutation goes through the
/// board so both sides of the reference stay in sync.
///
/// # Example
///
/// ```
/// use rainbow_engine::{Board, Grid, Position, Rank};
///
/// let mut board = Board::new(Grid::new(4, 4));
/// let id = board.spawn(Position::new(1, 2), Rank::MIN).unwrap();
///
/// assert_eq!(board.occupant(Position::new(1, 2)).map(|b| b.id()), Some(id));
/// assert_eq!(board.free_cells().count(), 15);
/// assert!(board.spawn(Position::new(1, 2), Rank::MIN).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    cells: Vec<Cell>,
    slots: Vec<Slot>,
    vacant_slots: Vec<u32>,
    live: usize,
}

impl Board {
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            cells: grid.positions().map(Cell::new).collect(),
            slots: Vec::with_capacity(grid.len()),
            vacant_slots: Vec::new(),
            live: 0,
        }
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Cell at `position`, or `None` outside the grid.
    #[must_use]
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.grid.index_of(position).map(|index| &self.cells[index])
    }

    fn cell_mut(&mut self, position: Position) -> Result<&mut Cell, InvalidStateError> {
        let index = self
            .grid
            .index_of(position)
            .ok_or(InvalidStateError::OutOfGrid { position })?;
        Ok(&mut self.cells[index])
    }

    /// All cells in index order (bottom row first).
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn free_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_free())
    }

    /// Block occupying `position`, if any.
    #[must_use]
    pub fn occupant(&self, position: Position) -> Option<&Block> {
        let id = self.cell_at(position)?.occupant()?;
        self.block(id)
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        let slot = self.slots.get(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.block.as_ref()
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block, InvalidStateError> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.block.as_mut())
            .ok_or(InvalidStateError::UnknownBlock { id })
    }

    /// Live blocks in arena order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.slots.iter().filter_map(|slot| slot.block.as_ref())
    }

    /// Number of live blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[must_use]
    pub fn max_rank(&self) -> Option<Rank> {
        self.blocks().map(Block::rank).max()
    }

    /// Creates a block of `rank` on the free cell at `position`.
    pub fn spawn(&mut self, position: Position, rank: Rank) -> Result<BlockId, InvalidStateError> {
        let cell = self.cell_mut(position)?;
        if !cell.is_free() {
            return Err(InvalidStateError::CellOccupied { position });
        }

        let id = match self.vacant_slots.pop() {
            Some(slot) => {
                let slot_index = slot as usize;
                BlockId::new(slot, self.slots[slot_index].generation)
            }
            None => {
                let slot = u32::try_from(self.slots.len()).expect("block arena overflow");
                self.slots.push(Slot::default());
                BlockId::new(slot, 0)
            }
        };

        self.slots[id.slot()].block = Some(Block::new(id, rank, position));
        self.cell_mut(position)?.set_occupant(Some(id));
        self.live += 1;
        Ok(id)
    }

    /// Detaches the block from its cell and drops it.
    ///
    /// Returns `false` if the block was already removed.
    pub fn remove(&mut self, id: BlockId) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
        else {
            return false;
        };
        let Some(block) = slot.block.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant_slots.push(u32::try_from(id.slot()).unwrap_or(u32::MAX));
        self.live -= 1;

        if let Some(position) = block.cell()
            && let Some(index) = self.grid.index_of(position)
            && self.cells[index].occupant() == Some(id)
        {
            self.cells[index].set_occupant(None);
        }
        true
    }

    /// Moves a block onto the free cell at `to`, releasing its previous cell first.
    pub(crate) fn move_block(&mut self, id: BlockId, to: Position) -> Result<(), InvalidStateError> {
        let target = self.cell_mut(to)?;
        if !target.is_free() {
            return Err(InvalidStateError::CellOccupied { position: to });
        }
        self.detach(id)?;
        self.cell_mut(to)?.set_occupant(Some(id));
        self.block_mut(id)?.set_cell(Some(to));
        Ok(())
    }

    /// Releases the cell held by a block, leaving the block without a cell.
    fn detach(&mut self, id: BlockId) -> Result<(), InvalidStateError> {
        let previous = self.block_mut(id)?.cell();
        if let Some(position) = previous {
            let cell = self.cell_mut(position)?;
            if cell.occupant() != Some(id) {
                return Err(InvalidStateError::Inconsistent { position });
            }
            cell.set_occupant(None);
        }
        self.block_mut(id)?.set_cell(None);
        Ok(())
    }

    /// Records that `source` merges into `target` this move.
    ///
    /// The target is marked as claimed and the source leaves its cell.
    pub(crate) fn claim_merge(
        &mut self,
        source: BlockId,
        target: BlockId,
    ) -> Result<(), InvalidStateError> {
        let source_rank = self
            .block(source)
            .ok_or(InvalidStateError::UnknownBlock { id: source })?
            .rank();
        let target_block = self
            .block(target)
            .ok_or(InvalidStateError::UnknownBlock { id: target })?;
        if !target_block.can_merge(source_rank) {
            return Err(InvalidStateError::AlreadyMerging { id: target });
        }

        self.block_mut(target)?.mark_merging();
        self.detach(source)?;
        self.block_mut(source)?.set_merge_target(target);
        Ok(())
    }

    /// Drops every block, keeping the grid.
    pub fn clear(&mut self) {
        *self = Self::new(self.grid);
    }

    /// Verifies the settled-state occupancy invariants.
    ///
    /// Every placed block is the occupant of its cell, every occupant points back
    /// at the cell, and no block is left halfway through a merge.
    pub fn check_consistency(&self) -> Result<(), InvalidStateError> {
        for cell in &self.cells {
            if let Some(id) = cell.occupant() {
                let block = self.block(id).ok_or(InvalidStateError::UnknownBlock { id })?;
                if block.cell() != Some(cell.position()) {
                    return Err(InvalidStateError::Inconsistent {
                        position: cell.position(),
                    });
                }
            }
        }
        for block in self.blocks() {
            let position = block
                .cell()
                .ok_or(InvalidStateError::BlockNotPlaced { id: block.id() })?;
            if block.is_merging() || block.merge_target().is_some() {
                return Err(InvalidStateError::AlreadyMerging { id: block.id() });
            }
            if self.cell_at(position).and_then(Cell::occupant) != Some(block.id()) {
                return Err(InvalidStateError::Inconsistent { position });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(value: u8) -> Rank {
        Rank::new(value).unwrap()
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(Grid::new(3, 2));
        assert!(board.is_empty());
        assert_eq!(board.cells().count(), 6);
        assert_eq!(board.free_cells().count(), 6);
        assert!(board.check_consistency().is_ok());
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let board = Board::new(Grid::new(4, 4));
        assert!(board.cell_at(pos(3, 3)).is_some());
        assert!(board.cell_at(pos(4, 0)).is_none());
        assert!(board.cell_at(pos(0, 4)).is_none());
    }

    mod spawn {
        use super::*;

        #[test]
        fn test_binds_block_and_cell() {
            let mut board = Board::new(Grid::new(4, 4));
            let id = board.spawn(pos(2, 1), rank(3)).unwrap();

            let block = board.block(id).unwrap();
            assert_eq!(block.rank(), rank(3));
            assert_eq!(block.cell(), Some(pos(2, 1)));
            assert_eq!(board.cell_at(pos(2, 1)).unwrap().occupant(), Some(id));
            assert_eq!(board.len(), 1);
            assert_eq!(board.free_cells().count(), 15);
            assert!(board.check_consistency().is_ok());
        }

        #[test]
        fn test_occupied_cell_is_invalid_state() {
            let mut board = Board::new(Grid::new(4, 4));
            board.spawn(pos(0, 0), rank(1)).unwrap();
            assert_eq!(
                board.spawn(pos(0, 0), rank(1)),
                Err(InvalidStateError::CellOccupied { position: pos(0, 0) })
            );
            assert_eq!(board.len(), 1);
        }

        #[test]
        fn test_outside_grid_is_invalid_state() {
            let mut board = Board::new(Grid::new(2, 2));
            assert_eq!(
                board.spawn(pos(2, 0), rank(1)),
                Err(InvalidStateError::OutOfGrid { position: pos(2, 0) })
            );
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn test_frees_cell() {
            let mut board = Board::new(Grid::new(4, 4));
            let id = board.spawn(pos(1, 1), rank(1)).unwrap();

            assert!(board.remove(id));
            assert!(board.block(id).is_none());
            assert!(board.cell_at(pos(1, 1)).unwrap().is_free());
            assert!(board.is_empty());
        }

        #[test]
        fn test_is_idempotent() {
            let mut board = Board::new(Grid::new(4, 4));
            let id = board.spawn(pos(1, 1), rank(1)).unwrap();

            assert!(board.remove(id));
            assert!(!board.remove(id));
            assert!(board.is_empty());
        }

        #[test]
        fn test_stale_id_does_not_touch_reused_slot() {
            let mut board = Board::new(Grid::new(4, 4));
            let old = board.spawn(pos(0, 0), rank(1)).unwrap();
            board.remove(old);
            let new = board.spawn(pos(3, 3), rank(2)).unwrap();

            assert_ne!(old, new);
            assert!(!board.remove(old));
            assert_eq!(board.block(new).unwrap().rank(), rank(2));
            assert!(board.block(old).is_none());
        }
    }

    mod move_block {
        use super::*;

        #[test]
        fn test_releases_previous_cell() {
            let mut board = Board::new(Grid::new(4, 4));
            let id = board.spawn(pos(0, 0), rank(1)).unwrap();

            board.move_block(id, pos(3, 0)).unwrap();

            assert!(board.cell_at(pos(0, 0)).unwrap().is_free());
            assert_eq!(board.cell_at(pos(3, 0)).unwrap().occupant(), Some(id));
            assert_eq!(board.block(id).unwrap().cell(), Some(pos(3, 0)));
            assert!(board.check_consistency().is_ok());
        }

        #[test]
        fn test_onto_occupied_cell_fails() {
            let mut board = Board::new(Grid::new(4, 4));
            let a = board.spawn(pos(0, 0), rank(1)).unwrap();
            board.spawn(pos(1, 0), rank(2)).unwrap();

            assert_eq!(
                board.move_block(a, pos(1, 0)),
                Err(InvalidStateError::CellOccupied { position: pos(1, 0) })
            );
            assert_eq!(board.block(a).unwrap().cell(), Some(pos(0, 0)));
        }
    }

    mod claim_merge {
        use super::*;

        #[test]
        fn test_marks_target_and_detaches_source() {
            let mut board = Board::new(Grid::new(4, 4));
            let source = board.spawn(pos(0, 0), rank(2)).unwrap();
            let target = board.spawn(pos(1, 0), rank(2)).unwrap();

            board.claim_merge(source, target).unwrap();

            assert!(board.block(target).unwrap().is_merging());
            assert_eq!(board.block(source).unwrap().merge_target(), Some(target));
            assert_eq!(board.block(source).unwrap().cell(), None);
            assert!(board.cell_at(pos(0, 0)).unwrap().is_free());
            assert!(board.check_consistency().is_err());
        }

        #[test]
        fn test_second_claim_is_rejected() {
            let mut board = Board::new(Grid::new(4, 4));
            let first = board.spawn(pos(0, 0), rank(1)).unwrap();
            let second = board.spawn(pos(2, 0), rank(1)).unwrap();
            let target = board.spawn(pos(1, 0), rank(1)).unwrap();

            board.claim_merge(first, target).unwrap();
            assert_eq!(
                board.claim_merge(second, target),
                Err(InvalidStateError::AlreadyMerging { id: target })
            );
        }
    }

    #[test]
    fn test_max_rank() {
        let mut board = Board::new(Grid::new(4, 4));
        assert_eq!(board.max_rank(), None);
        board.spawn(pos(0, 0), rank(2)).unwrap();
        board.spawn(pos(1, 0), rank(5)).unwrap();
        assert_eq!(board.max_rank(), Some(rank(5)));
    }

    #[test]
    fn test_clear_keeps_grid() {
        let mut board = Board::new(Grid::new(5, 3));
        board.spawn(pos(4, 2), rank(1)).unwrap();
        board.clear();
        assert!(board.is_empty());
        assert_eq!(board.grid(), Grid::new(5, 3));
        assert_eq!(board.free_cells().count(), 15);
    }
}
