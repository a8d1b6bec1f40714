use std::{collections::VecDeque, ops::RangeInclusive};

use rand::Rng;

use crate::geometry::Rect;

pub const PIPE_WIDTH: f64 = 50.0;
/// Horizontal scroll per tick.
pub const PIPE_SPEED: f64 = 2.0;
pub const GAP_MIN: u32 = 150;
pub const GAP_MAX: u32 = 200;
/// How far pipe rects extend past the top and bottom screen edges.
pub const PIPE_OVERHANG: f64 = 50.0;
/// Pipes initially on the course.
pub const PIPE_COUNT: usize = 5;

/// Whole-pixel positions the top edge of a `gap` opening may take.
///
/// The upper end is clamped to the lower one on screens too short for the
/// full margin.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gap_start_range(gap: u32, screen_height: f64) -> RangeInclusive<u32> {
    let low = (f64::from(gap / 2) * 1.2).floor();
    let high = (screen_height - f64::from(gap) * 1.2).floor().max(low);
    (low as u32)..=(high as u32)
}

/// Obstacle pair: a top and a bottom column with a vertical gap between.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    top: Rect,
    bottom: Rect,
    gap: f64,
}

impl Pipe {
    /// Pipe at horizontal position `x` whose gap spans
    /// `gap_start..gap_start + gap`.
    #[must_use]
    pub fn new(x: f64, gap_start: f64, gap: f64, screen_height: f64) -> Self {
        let top = Rect::new(x, -PIPE_OVERHANG, PIPE_WIDTH, gap_start + PIPE_OVERHANG);
        let bottom_y = gap_start + gap;
        let bottom = Rect::new(
            x,
            bottom_y,
            PIPE_WIDTH,
            screen_height - bottom_y + PIPE_OVERHANG,
        );
        Self { top, bottom, gap }
    }

    /// Pipe with a random gap size in `[GAP_MIN, GAP_MAX]` and a random gap
    /// position that keeps some margin to both screen edges.
    pub fn random<R>(x: f64, screen_height: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let gap = rng.random_range(GAP_MIN..=GAP_MAX);
        Self::with_gap(x, gap, screen_height, rng)
    }

    /// Pipe with a `gap` pixel opening whose top edge is drawn uniformly from
    /// [`gap_start_range`].
    pub fn with_gap<R>(x: f64, gap: u32, screen_height: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let gap_start = rng.random_range(gap_start_range(gap, screen_height));
        Self::new(x, f64::from(gap_start), f64::from(gap), screen_height)
    }

    #[must_use]
    pub fn top(&self) -> &Rect {
        &self.top
    }

    #[must_use]
    pub fn bottom(&self) -> &Rect {
        &self.bottom
    }

    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.bottom.x
    }

    /// Target point the birds are steered toward.
    #[must_use]
    pub fn gap_center(&self) -> (f64, f64) {
        (self.bottom.center_x(), self.bottom.y - self.gap / 2.0)
    }

    pub fn scroll(&mut self, dx: f64) {
        self.top.x -= dx;
        self.bottom.x -= dx;
    }

    #[must_use]
    pub fn collides(&self, rect: &Rect) -> bool {
        self.top.intersects(rect) || self.bottom.intersects(rect)
    }
}

/// The scrolling sequence of pipes.
#[derive(Debug, Clone)]
pub struct Course {
    pipes: VecDeque<Pipe>,
    width: f64,
    height: f64,
}

impl Course {
    /// Lays out [`PIPE_COUNT`] pipes starting just off the right edge, a fifth
    /// of the screen width apart.
    pub fn new<R>(width: f64, height: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let spacing = (width / 5.0).floor();
        let pipes = (0..PIPE_COUNT)
            .scan(width, |x, _| {
                let pipe = Pipe::random(*x, height, &mut *rng);
                *x += spacing;
                Some(pipe)
            })
            .collect();
        Self {
            pipes,
            width,
            height,
        }
    }

    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> + '_ {
        self.pipes.iter()
    }

    /// Moves every pipe left by [`PIPE_SPEED`] and swaps the front pipe for a
    /// fresh one at the right edge once it reaches the left edge.
    pub fn scroll<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for pipe in &mut self.pipes {
            pipe.scroll(PIPE_SPEED);
        }
        if self.pipes.front().is_some_and(|p| p.x() <= 0.0) {
            self.pipes.pop_front();
            self.pipes
                .push_back(Pipe::random(self.width, self.height, rng));
        }
    }

    /// The pipe whose gap center is nearest ahead of `x`.
    ///
    /// Falls back to the front pipe when every gap center is behind `x`.
    #[must_use]
    pub fn nearest_ahead(&self, x: f64) -> Option<&Pipe> {
        self.pipes
            .iter()
            .filter(|p| p.gap_center().0 > x)
            .min_by(|a, b| a.gap_center().0.total_cmp(&b.gap_center().0))
            .or_else(|| self.pipes.front())
    }

    #[must_use]
    pub fn collides(&self, rect: &Rect) -> bool {
        self.pipes.iter().any(|p| p.collides(rect))
    }
}

#[cfg(test)]
mod tests {
    use flapnet_engine::EngineRng;
    use rand::SeedableRng as _;

    use super::*;

    #[test]
    fn pipe_geometry() {
        let pipe = Pipe::new(300.0, 200.0, 160.0, 600.0);
        assert_eq!(*pipe.top(), Rect::new(300.0, -50.0, 50.0, 250.0));
        assert_eq!(*pipe.bottom(), Rect::new(300.0, 360.0, 50.0, 290.0));
        assert_eq!(pipe.gap_center(), (325.0, 280.0));
    }

    #[test]
    fn random_gaps_stay_in_range() {
        let mut rng = EngineRng::seed_from_u64(12);
        for _ in 0..200 {
            let pipe = Pipe::random(0.0, 600.0, &mut rng);
            assert!((150.0..=200.0).contains(&pipe.gap()));
            let gap_start = pipe.top().bottom();
            assert!(gap_start >= 90.0);
            assert!(gap_start + pipe.gap() <= 600.0);
        }
    }

    #[test]
    fn gap_start_range_is_inclusive() {
        assert_eq!(gap_start_range(150, 600.0), 90..=420);
        assert_eq!(gap_start_range(200, 360.0), 120..=120);

        let mut rng = EngineRng::seed_from_u64(5);
        let starts: Vec<_> = (0..2000)
            .map(|_| Pipe::with_gap(0.0, 150, 361.0, &mut rng).top().bottom())
            .collect();
        assert!(starts.iter().all(|s| s.fract() == 0.0));
        assert!(starts.contains(&90.0));
        assert!(starts.contains(&181.0));
    }

    #[test]
    fn bird_inside_gap_does_not_collide() {
        let pipe = Pipe::new(100.0, 200.0, 150.0, 600.0);
        assert!(!pipe.collides(&Rect::centered(125.0, 275.0, 25.0, 20.0)));
        assert!(pipe.collides(&Rect::centered(125.0, 195.0, 25.0, 20.0)));
        assert!(pipe.collides(&Rect::centered(125.0, 360.0, 25.0, 20.0)));
    }

    mod course {
        use super::*;

        #[test]
        fn initial_layout() {
            let mut rng = EngineRng::seed_from_u64(1);
            let course = Course::new(800.0, 600.0, &mut rng);
            let xs: Vec<_> = course.pipes().map(Pipe::x).collect();
            assert_eq!(xs, vec![800.0, 960.0, 1120.0, 1280.0, 1440.0]);
        }

        #[test]
        fn recycles_front_pipe() {
            let mut rng = EngineRng::seed_from_u64(2);
            let mut course = Course::new(800.0, 600.0, &mut rng);
            // 400 ticks bring the first pipe to x = 0.
            for _ in 0..400 {
                course.scroll(&mut rng);
            }
            let xs: Vec<_> = course.pipes().map(Pipe::x).collect();
            assert_eq!(xs, vec![160.0, 320.0, 480.0, 640.0, 800.0]);
        }

        #[test]
        fn nearest_skips_passed_pipes() {
            let mut rng = EngineRng::seed_from_u64(3);
            let course = Course::new(800.0, 600.0, &mut rng);
            assert_eq!(course.nearest_ahead(400.0).unwrap().x(), 800.0);
            assert_eq!(course.nearest_ahead(900.0).unwrap().x(), 960.0);
            // Everything behind: front pipe.
            assert_eq!(course.nearest_ahead(5000.0).unwrap().x(), 800.0);
        }
    }
}
