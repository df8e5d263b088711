use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use rainbow_engine::{Direction, GameSession, GameState};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    widgets::Block,
};
use tracing::{debug, error};

use crate::{
    command::play::animation::MoveAnimation,
    view::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay, TilePlacement, style},
};

const PLAYING_BINDINGS: &[KeyBinding] = &[
    KeyBinding::new(&["←↓↑→", "hjkl", "wasd"], "Move"),
    KeyBinding::new(&["R"], "Restart"),
    KeyBinding::new(&["Q", "Esc"], "Quit"),
];

const GAME_OVER_BINDINGS: &[KeyBinding] = &[
    KeyBinding::new(&["R"], "New game"),
    KeyBinding::new(&["Q", "Esc"], "Quit"),
];

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k' | 'w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j' | 's') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h' | 'a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l' | 'd') => Some(Direction::Right),
        _ => None,
    }
}

/// Terminal front-end of one session.
///
/// Moves are animated before they are committed; directions pressed meanwhile
/// are queued in the session and played in order once the animation is over.
#[derive(Debug)]
pub struct PlayScreen {
    session: GameSession,
    animation: Option<MoveAnimation>,
    failure: Option<anyhow::Error>,
    is_exiting: bool,
}

impl PlayScreen {
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            animation: None,
            failure: None,
            is_exiting: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.is_exiting
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn into_result(self) -> anyhow::Result<()> {
        match self.failure {
            Some(err) => Err(err.context("Game aborted")),
            None => Ok(()),
        }
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            KeyCode::Char('r') => self.restart(),
            code => {
                if let Some(direction) = direction_for(code)
                    && self.session.push_input(direction)
                {
                    self.start_queued_move(now);
                }
            }
        }
    }

    /// Completes the running animation once its time is up.
    pub fn update(&mut self, now: Instant) {
        if !self
            .animation
            .as_ref()
            .is_some_and(|animation| animation.is_finished(now))
        {
            return;
        }
        self.animation = None;
        match self.session.animation_complete() {
            Ok(summary) => {
                debug!(
                    direction = %summary.direction,
                    merges = summary.merges,
                    state = %summary.state,
                    "turn complete"
                );
            }
            Err(err) => {
                self.fail(err);
                return;
            }
        }
        self.start_queued_move(now);
    }

    fn start_queued_move(&mut self, now: Instant) {
        if self.animation.is_some() {
            return;
        }
        let duration = self.session.config().animation_time;
        match self.session.process_input() {
            Ok(Some(plan)) => self.animation = Some(MoveAnimation::new(plan, now, duration)),
            Ok(None) => {}
            Err(err) => self.fail(err),
        }
    }

    fn restart(&mut self) {
        self.animation = None;
        if let Err(err) = self.session.restart() {
            self.fail(err);
        }
    }

    fn fail(&mut self, err: impl Into<anyhow::Error>) {
        let err = err.into();
        error!(error = %err, "game aborted");
        self.failure = Some(err);
        self.is_exiting = true;
    }

    fn tiles(&self, now: Instant) -> Vec<TilePlacement> {
        match &self.animation {
            Some(animation) => animation.placements(now),
            None => self
                .session
                .board()
                .blocks()
                .filter_map(|block| Some(TilePlacement::at(block.cell()?, block.rank())))
                .collect(),
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>, now: Instant) {
        let bindings = match self.session.state() {
            GameState::Win | GameState::Lose => GAME_OVER_BINDINGS,
            _ => PLAYING_BINDINGS,
        };
        let session_display = SessionDisplay::new(&self.session, self.tiles(now));
        let help = KeyBindingDisplay::new(bindings);

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(Block::new().style(style::DEFAULT), frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help, help_area);
    }
}
