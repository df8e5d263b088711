use rainbow_engine::{Rank, TileRegistry};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::Widget,
};

use crate::view::widgets::style;

/// One cell of the board, empty or holding a tile.
#[derive(Debug)]
pub struct TileDisplay {
    style: Style,
    label: String,
}

impl TileDisplay {
    pub const WIDTH: u16 = 6;
    pub const HEIGHT: u16 = 3;

    pub fn empty() -> Self {
        Self {
            style: style::EMPTY_CELL,
            label: "·".to_owned(),
        }
    }

    pub fn for_rank(registry: &TileRegistry, rank: Rank) -> Self {
        Self {
            style: style::tile(registry.color_of(rank)),
            label: registry.label_of(rank),
        }
    }
}

impl Widget for TileDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &TileDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.style);
        Line::styled(self.label.as_str(), self.style)
            .centered()
            .render(area.centered_vertically(Constraint::Length(1)), buf);
    }
}
