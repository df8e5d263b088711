use rainbow_engine::{Grid, Position, Rank, TileRegistry};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::TileDisplay;

/// A tile drawn at a possibly fractional cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub rank: Rank,
    pub x: f64,
    pub y: f64,
}

impl TilePlacement {
    pub fn at(position: Position, rank: Rank) -> Self {
        let (x, y) = cell_coordinates(position);
        Self { rank, x, y }
    }
}

#[expect(clippy::cast_precision_loss)]
pub fn cell_coordinates(position: Position) -> (f64, f64) {
    (position.x() as f64, position.y() as f64)
}

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    grid: Grid,
    registry: &'a TileRegistry,
    tiles: Vec<TilePlacement>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(grid: Grid, registry: &'a TileRegistry, tiles: Vec<TilePlacement>) -> Self {
        Self {
            grid,
            registry,
            tiles,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        cells_to_u16(self.grid.width()).saturating_mul(TileDisplay::WIDTH)
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        cells_to_u16(self.grid.height()).saturating_mul(TileDisplay::HEIGHT)
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Screen rectangle of a tile at cell coordinate `(x, y)`; row 0 is drawn at
    /// the bottom.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn tile_area(&self, area: Rect, x: f64, y: f64) -> Rect {
        let top_row = self.grid.height() as f64 - 1.0;
        let column = (x * f64::from(TileDisplay::WIDTH)).round().max(0.0) as u16;
        let row = ((top_row - y) * f64::from(TileDisplay::HEIGHT))
            .round()
            .max(0.0) as u16;
        Rect::new(
            area.x.saturating_add(column),
            area.y.saturating_add(row),
            TileDisplay::WIDTH,
            TileDisplay::HEIGHT,
        )
        .intersection(area)
    }
}

fn cells_to_u16(cells: usize) -> u16 {
    u16::try_from(cells).unwrap_or(u16::MAX)
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let empty = TileDisplay::empty();
        for position in self.grid.positions() {
            let (x, y) = cell_coordinates(position);
            Widget::render(&empty, self.tile_area(area, x, y), buf);
        }
        for tile in &self.tiles {
            TileDisplay::for_rank(self.registry, tile.rank)
                .render(self.tile_area(area, tile.x, tile.y), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_left_cell_is_drawn_last_row() {
        let registry = TileRegistry::default();
        let display = BoardDisplay::new(Grid::new(4, 4), &registry, Vec::new());
        let area = Rect::new(0, 0, display.width(), display.height());

        let tile = display.tile_area(area, 0.0, 0.0);
        assert_eq!(tile, Rect::new(0, 9, TileDisplay::WIDTH, TileDisplay::HEIGHT));
        let tile = display.tile_area(area, 3.0, 3.0);
        assert_eq!(tile, Rect::new(18, 0, TileDisplay::WIDTH, TileDisplay::HEIGHT));
    }

    #[test]
    fn test_fractional_position_is_rounded() {
        let registry = TileRegistry::default();
        let display = BoardDisplay::new(Grid::new(4, 1), &registry, Vec::new());
        let area = Rect::new(2, 1, display.width(), display.height());

        assert_eq!(display.tile_area(area, 1.5, 0.0).x, 2 + 9);
    }

    #[test]
    fn test_renders_tile_label() {
        let registry = TileRegistry::default();
        let tiles = vec![TilePlacement::at(Position::new(0, 0), Rank::MIN)];
        let display = BoardDisplay::new(Grid::new(2, 1), &registry, tiles);
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);

        display.render(area, &mut buf);

        let middle_row: String = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_owned())
            .collect();
        assert!(middle_row.contains('1'));
        assert!(middle_row.contains('·'));
    }
}
