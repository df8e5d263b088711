use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{
    board_display::*, key_binding_display::*, session_display::*, stats_display::*,
    tile_display::*,
};

mod board_display;
mod key_binding_display;
mod session_display;
mod stats_display;
mod tile_display;

mod color {
    use ratatui::style::Color;

    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const GREEN: Color = Color::Rgb(0, 255, 0);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const DARK_GRAY: Color = Color::Rgb(64, 64, 64);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
}

pub mod style {
    use rainbow_engine::TileColor;
    use ratatui::style::{Color, Modifier, Style};

    use crate::view::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const EMPTY_CELL: Style = fg_bg(color::DARK_GRAY, color::BLACK);
    pub const WIN_BANNER: Style = fg_bg(color::BLACK, color::GREEN);
    pub const LOSE_BANNER: Style = fg_bg(color::WHITE, color::RED);

    /// Tile filled with its registry color, labelled in black or white for contrast.
    pub fn tile(tile_color: TileColor) -> Style {
        let TileColor { r, g, b } = tile_color;
        let fg = if tile_color.luminance() > 0.5 {
            color::BLACK
        } else {
            color::WHITE
        };
        fg_bg(fg, Color::Rgb(r, g, b)).add_modifier(Modifier::BOLD)
    }
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
