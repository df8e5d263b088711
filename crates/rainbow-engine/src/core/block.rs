use std::num::NonZeroU8;

use serde::{Deserialize, Serialize};

use super::grid::Position;

/// Handle of a block in the board's arena.
///
/// Slots are reused after a block is removed; the generation tells a stale handle
/// apart from the block that currently lives in the slot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{slot}.{generation}")]
pub struct BlockId {
    slot: u32,
    generation: u32,
}

impl BlockId {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    pub(crate) const fn slot(self) -> usize {
        self.slot as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

/// Merge tier of a block. Always at least 1.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(NonZeroU8);

impl Rank {
    /// Rank of every freshly spawned block.
    pub const MIN: Self = Self(NonZeroU8::MIN);
    pub const MAX: Self = Self(NonZeroU8::MAX);

    #[must_use]
    pub const fn new(rank: u8) -> Option<Self> {
        match NonZeroU8::new(rank) {
            Some(rank) => Some(Self(rank)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Rank produced by merging two blocks of this rank.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(rank) => Some(Self(rank)),
            None => None,
        }
    }

    /// Iterates `1..=self`.
    pub fn up_to(self) -> impl Iterator<Item = Self> {
        (1..=self.get()).filter_map(Self::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("rank must be at least 1")]
pub struct ZeroRankError;

impl TryFrom<u8> for Rank {
    type Error = ZeroRankError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ZeroRankError)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.get()
    }
}

/// A ranked tile living on the board.
///
/// `cell` is the cell the block currently occupies. It is `None` only while the
/// block is sliding into a merge partner during an unfinished move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    rank: Rank,
    cell: Option<Position>,
    merge_target: Option<BlockId>,
    merging: bool,
}

impl Block {
    pub(crate) const fn new(id: BlockId, rank: Rank, cell: Position) -> Self {
        Self {
            id,
            rank,
            cell: Some(cell),
            merge_target: None,
            merging: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    #[must_use]
    pub const fn cell(&self) -> Option<Position> {
        self.cell
    }

    /// Block this one disappears into at the end of the current move.
    #[must_use]
    pub const fn merge_target(&self) -> Option<BlockId> {
        self.merge_target
    }

    /// Whether another block already claimed this one as its merge target.
    #[must_use]
    pub const fn is_merging(&self) -> bool {
        self.merging
    }

    /// Whether a block of `rank` may merge into this one during the current move.
    ///
    /// A block takes part in at most one merge per move, either as source or as
    /// target, and the top rank cannot merge any further.
    #[must_use]
    pub fn can_merge(&self, rank: Rank) -> bool {
        self.rank == rank && !self.merging && self.merge_target.is_none() && rank.next().is_some()
    }

    pub(crate) fn set_cell(&mut self, cell: Option<Position>) {
        self.cell = cell;
    }

    pub(crate) fn set_merge_target(&mut self, target: BlockId) {
        self.merge_target = Some(target);
    }

    pub(crate) fn mark_merging(&mut self) {
        self.merging = true;
    }
}
