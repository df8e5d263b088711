use std::time::Instant;

use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// Application driven by [`Tui::run`].
pub trait App {
    /// Called once before the first event. Configure the tick rate here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    /// Handles a terminal event (key press, resize, ...).
    fn handle_event(&mut self, tui: &mut Tui, event: &Event);

    /// Draws the current state. Called only after something changed.
    fn draw(&self, frame: &mut Frame, now: Instant);

    /// Advances time-based state. Called on every tick while ticks are enabled.
    fn update(&mut self, tui: &mut Tui, now: Instant);
}
