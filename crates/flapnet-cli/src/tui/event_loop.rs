use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event};

const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(1000 / 30);

#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    Tick,
    Render,
    Crossterm(Event),
}

/// Interleaves tick and render deadlines with terminal input.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    frame_interval: Duration,
    last_tick: Instant,
    last_render: Option<Instant>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self {
            tick_interval: None,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            last_tick: Instant::now(),
            last_render: None,
        }
    }
}

impl EventLoop {
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    /// Blocks until the next tick or render is due, or input arrives.
    ///
    /// Ticks take priority, so a tick rate above the frame rate still
    /// advances the simulation at the requested pace.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= interval
            {
                self.last_tick = now;
                return Ok(TuiEvent::Tick);
            }

            let render_due = self
                .last_render
                .is_none_or(|last| now.duration_since(last) >= self.frame_interval);
            if render_due {
                self.last_render = Some(now);
                return Ok(TuiEvent::Render);
            }

            if event::poll(self.timeout(now))? {
                return Ok(event::read()?.into());
            }
        }
    }

    fn timeout(&self, now: Instant) -> Duration {
        let next_render = self
            .last_render
            .map_or(now, |last| last + self.frame_interval);
        let next_tick = self
            .tick_interval
            .map(|interval| self.last_tick + interval);
        next_tick
            .map_or(next_render, |tick| tick.min(next_render))
            .saturating_duration_since(now)
    }
}
