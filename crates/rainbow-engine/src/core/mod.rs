pub use self::{block::*, board::*, grid::*, tile_registry::*};

pub(crate) mod block;
pub(crate) mod board;
pub(crate) mod grid;
pub(crate) mod tile_registry;
