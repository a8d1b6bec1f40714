use flapnet_sim::{Rect as WorldRect, World};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Text},
    widgets::{
        Block, Paragraph,
        canvas::{Canvas, Context, Points, Rectangle},
    },
};

use super::app::RunState;

const PIPE_COLOR: Color = Color::Green;
const BIRD_COLOR: Color = Color::Yellow;
const LEADER_COLOR: Color = Color::LightRed;

pub(super) struct WorldView<'a> {
    world: &'a World,
    state: RunState,
    turbo: bool,
}

impl<'a> WorldView<'a> {
    pub(super) fn new(world: &'a World, state: RunState, turbo: bool) -> Self {
        Self {
            world,
            state,
            turbo,
        }
    }

    pub(super) fn draw(&self, frame: &mut Frame) {
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        let [field_area, hud_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(24)]).areas(main_area);

        frame.render_widget(self.field(), field_area);
        frame.render_widget(self.hud(), hud_area);
        frame.render_widget(self.help(), help_area);
    }

    fn field(&self) -> Canvas<'_, impl Fn(&mut Context<'_>) + '_> {
        let config = self.world.config();
        let height = config.height;
        Canvas::default()
            .block(Block::bordered().title("flapnet"))
            .marker(Marker::Braille)
            .x_bounds([0.0, config.width])
            .y_bounds([0.0, height])
            .paint(move |ctx| {
                for pipe in self.world.course().pipes() {
                    ctx.draw(&to_canvas(pipe.top(), height, PIPE_COLOR));
                    ctx.draw(&to_canvas(pipe.bottom(), height, PIPE_COLOR));
                }
                ctx.layer();

                let leader = self.world.hud().leader;
                let agents = self.world.population().agents();
                let mut live = vec![];
                for (i, (agent, bird)) in agents.iter().zip(self.world.birds()).enumerate() {
                    if !agent.is_alive() {
                        continue;
                    }
                    let rect = bird.rect();
                    let point = (rect.center_x(), height - rect.center_y());
                    if Some(i) == leader {
                        ctx.draw(&to_canvas(rect, height, LEADER_COLOR));
                    } else {
                        live.push(point);
                    }
                }
                ctx.draw(&Points {
                    coords: &live,
                    color: BIRD_COLOR,
                });
            })
    }

    fn hud(&self) -> Paragraph<'_> {
        let hud = self.world.hud();
        let leader = hud
            .leader
            .map_or_else(|| "-".to_owned(), |i| format!("#{i}"));
        let lines = vec![
            Line::raw(format!("Generation: {:>8}", hud.generation)),
            Line::raw(format!("Alive:      {:>8}", hud.alive)),
            Line::raw(format!("Time:      {:>8.1}s", hud.elapsed_secs)),
            Line::raw(format!("Best:       {:>8}", hud.best_fitness)),
            Line::raw(format!("Leader:     {leader:>8}")),
        ];
        Paragraph::new(lines).block(Block::bordered().title("Stats"))
    }

    fn help(&self) -> Text<'static> {
        let turbo = if self.turbo {
            "t (Turbo: ON)"
        } else {
            "t (Turbo: OFF)"
        };
        let text = match self.state {
            RunState::Running => format!("Controls: {turbo} | p (Pause) | q (Quit)"),
            RunState::Paused | RunState::Exiting => "Controls: p (Resume) | q (Quit)".to_owned(),
        };
        Text::from(text)
            .style(Style::default().fg(Color::DarkGray))
            .centered()
    }
}

/// Canvas rectangles are anchored at the bottom-left with `y` growing upward.
fn to_canvas(rect: &WorldRect, screen_height: f64, color: Color) -> Rectangle {
    Rectangle {
        x: rect.x,
        y: screen_height - rect.bottom(),
        width: rect.width,
        height: rect.height,
        color,
    }
}
