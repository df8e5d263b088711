use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone)]
pub(super) enum TuiEvent {
    /// Tick interval elapsed.
    Tick,
    /// State changed since the last frame.
    Render,
    Crossterm(CrosstermEvent),
}
