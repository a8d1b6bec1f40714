use crossterm::event::Event;
use ratatui::Frame;

use super::Tui;

/// An application driven by [`Tui::run`].
pub trait App {
    /// Called once before the first event; configure rates here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    fn handle_event(&mut self, tui: &mut Tui, event: &Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by one tick.
    fn update(&mut self, tui: &mut Tui);
}
