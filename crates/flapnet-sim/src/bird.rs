use flapnet_engine::{Decision, Observation};

use crate::{geometry::Rect, pipe::Pipe};

pub const BIRD_WIDTH: f64 = 25.0;
pub const BIRD_HEIGHT: f64 = 20.0;
/// Downward acceleration per tick.
pub const GRAVITY: f64 = 0.4;
/// Vertical velocity set by a flap.
pub const FLAP_VELOCITY: f64 = -6.0;
/// The bird's center never rises above this line.
pub const CEILING_CENTER_Y: f64 = -25.0;

/// Physical body an agent steers.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    rect: Rect,
    velocity_y: f64,
}

impl Bird {
    /// Spawns a resting bird centered on `(x, y)`.
    #[must_use]
    pub fn spawn(x: f64, y: f64) -> Self {
        Self {
            rect: Rect::centered(x, y, BIRD_WIDTH, BIRD_HEIGHT),
            velocity_y: 0.0,
        }
    }

    #[must_use]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    #[must_use]
    pub fn velocity_y(&self) -> f64 {
        self.velocity_y
    }

    pub fn flap(&mut self) {
        self.velocity_y = FLAP_VELOCITY;
    }

    /// Builds what the brain sees: the offset to `pipe`'s gap center and the
    /// current vertical velocity.
    #[must_use]
    pub fn observe(&self, pipe: &Pipe) -> Observation {
        let (gx, gy) = pipe.gap_center();
        Observation::new(
            gx - self.rect.center_x(),
            gy - self.rect.center_y(),
            self.velocity_y,
        )
    }

    /// One tick of physics for a live bird.
    ///
    /// Gravity is applied before `decide` is consulted, so the brain sees the
    /// velocity the bird would fall with if it coasts.
    pub fn step<F>(&mut self, decide: F)
    where
        F: FnOnce(&Self) -> Decision,
    {
        self.velocity_y += GRAVITY;
        if decide(self).is_flap() {
            self.flap();
        }
        self.rect.y += self.velocity_y;
        if self.rect.center_y() <= CEILING_CENTER_Y {
            self.rect.set_center_y(CEILING_CENTER_Y);
        }
    }

    /// Whether the bird's top edge has left the bottom of the screen.
    #[must_use]
    pub fn is_below(&self, screen_height: f64) -> bool {
        self.rect.y >= screen_height
    }
}
