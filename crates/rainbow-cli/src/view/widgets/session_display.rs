use rainbow_engine::{GameSession, GameState};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::Color,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::widgets::{BoardDisplay, StatsDisplay, TilePlacement, color, style};

/// Board, statistics panel and end-of-game banner.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    tiles: Vec<TilePlacement>,
}

impl<'a> SessionDisplay<'a> {
    /// `tiles` are the tiles to draw, already placed for the current animation frame.
    pub fn new(session: &'a GameSession, tiles: Vec<TilePlacement>) -> Self {
        Self { session, tiles }
    }
}

fn border_color(state: GameState) -> Color {
    match state {
        GameState::Moving => color::CYAN,
        GameState::Win => color::GREEN,
        GameState::Lose => color::RED,
        GameState::GenerateLevel | GameState::SpawningBlocks | GameState::WaitingInput => {
            color::WHITE
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.session.state();
        let border_style = border_color(state);
        let config = self.session.config();

        let board = BoardDisplay::new(config.grid(), &config.block_types, self.tiles).block(
            Block::bordered()
                .title(Line::from("RAINBOW").centered())
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let stats = StatsDisplay::new(self.session).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(Padding::horizontal(1))
                .border_style(border_style)
                .style(style::DEFAULT),
        );

        let [stats_column, board_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(board.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())])
            .flex(Flex::Center)
            .areas(stats_column);
        let [board_area] = Layout::vertical([Constraint::Length(board.height())])
            .flex(Flex::Center)
            .areas(board_column);

        let board_width = board.width();
        stats.render(stats_area, buf);
        board.render(board_area, buf);

        let banner = match state {
            GameState::Win => Some(("YOU WIN!", style::WIN_BANNER)),
            GameState::Lose => Some(("GAME OVER", style::LOSE_BANNER)),
            _ => None,
        };
        if let Some((text, style)) = banner {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
