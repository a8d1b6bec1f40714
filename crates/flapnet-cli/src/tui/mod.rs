//! Minimal fixed-rate terminal runtime for the `watch` viewer.
//!
//! [`Tui::run`] owns the terminal for the lifetime of an [`App`] and feeds it
//! three kinds of events: simulation ticks, redraws, and crossterm input.

use std::{io, time::Duration};

pub use self::app::App;
use self::event_loop::{EventLoop, TuiEvent};

mod app;
mod event_loop;

#[derive(Debug, Default)]
pub struct Tui {
    events: EventLoop,
}

impl Tui {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often [`App::update`] is called, in ticks per second.
    ///
    /// `None` stops ticking until a rate is set again.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.events
            .set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    /// Sets how often the screen is redrawn, in frames per second.
    pub fn set_frame_rate(&mut self, rate: f64) {
        self.events
            .set_frame_interval(Duration::from_secs_f64(1.0 / rate));
    }

    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|frame| app.draw(frame))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, &event),
                }
            }
            Ok(())
        })
    }
}
