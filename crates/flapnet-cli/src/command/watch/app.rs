use crossterm::event::{Event, KeyCode};
use flapnet_sim::World;
use ratatui::Frame;

use super::view::WorldView;
use crate::tui::{App, Tui};

/// World ticks per update while turbo is on.
const TURBO_STEPS: u64 = 32;
const FRAME_RATE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub(super) enum RunState {
    Running,
    Paused,
    Exiting,
}

#[derive(Debug)]
pub(super) struct WatchApp {
    world: World,
    tick_rate: f64,
    turbo: bool,
    state: RunState,
    failure: Option<anyhow::Error>,
}

impl WatchApp {
    pub(super) fn new(world: World, tick_rate: f64, turbo: bool) -> Self {
        Self {
            world,
            tick_rate,
            turbo,
            state: RunState::Running,
            failure: None,
        }
    }

    pub(super) fn into_result(self) -> anyhow::Result<()> {
        self.failure.map_or(Ok(()), Err)
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Exiting => RunState::Exiting,
        };
    }

    fn step(&mut self) {
        let steps = if self.turbo { TURBO_STEPS } else { 1 };
        for _ in 0..steps {
            if let Err(err) = self.world.tick() {
                self.failure = Some(err.into());
                self.state = RunState::Exiting;
                return;
            }
        }
    }
}

impl App for WatchApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_frame_rate(FRAME_RATE);
        tui.set_tick_rate(Some(self.tick_rate));
    }

    fn should_exit(&self) -> bool {
        self.state.is_exiting()
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: &Event) {
        if let Some(key) = event.as_key_press_event() {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.state = RunState::Exiting,
                KeyCode::Char('p') => self.toggle_pause(),
                KeyCode::Char('t') => self.turbo = !self.turbo,
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        WorldView::new(&self.world, self.state, self.turbo).draw(frame);
    }

    fn update(&mut self, _tui: &mut Tui) {
        if self.state.is_running() {
            self.step();
        }
    }
}
