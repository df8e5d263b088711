use std::time::Instant;

use crossterm::event::Event;
use rainbow_engine::GameSession;
use ratatui::Frame;

use crate::{
    command::play::screen::PlayScreen,
    tui::{App, Tui},
};

const ANIMATION_FPS: f64 = 60.0;

#[derive(Debug)]
pub struct PlayApp {
    screen: PlayScreen,
}

impl PlayApp {
    pub fn new(session: GameSession) -> Self {
        Self {
            screen: PlayScreen::new(session),
        }
    }

    /// Error that aborted the game, if any.
    pub fn into_result(self) -> anyhow::Result<()> {
        self.screen.into_result()
    }

    /// Ticks run only while a move is being animated.
    fn sync_tick_rate(&self, tui: &mut Tui) {
        tui.set_tick_rate(self.screen.is_animating().then_some(ANIMATION_FPS));
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        self.sync_tick_rate(tui);
    }

    fn should_exit(&self) -> bool {
        self.screen.should_exit()
    }

    fn handle_event(&mut self, tui: &mut Tui, event: &Event) {
        self.screen.handle_event(event, Instant::now());
        self.sync_tick_rate(tui);
    }

    fn draw(&self, frame: &mut Frame, now: Instant) {
        self.screen.draw(frame, now);
    }

    fn update(&mut self, tui: &mut Tui, now: Instant) {
        self.screen.update(now);
        self.sync_tick_rate(tui);
    }
}
