//! Side-scrolling obstacle world that drives a [`Population`].
//!
//! The world owns everything the engine treats as external: bird bodies,
//! pipes, collision and bounds checks, and the tick loop. Per tick it
//!
//! 1. starts a new generation if the previous one is extinct,
//! 2. lets every live bird fall, consult its agent, and move,
//! 3. scrolls the course,
//! 4. marks agents dead on collision or when they fall off the screen,
//! 5. credits one tick of fitness to every survivor.
//!
//! # Example
//!
//! ```
//! use flapnet_engine::PopulationConfig;
//! use flapnet_sim::{World, WorldConfig};
//!
//! let world_config = WorldConfig { max_generation_ticks: Some(500), ..WorldConfig::default() };
//! let population_config = PopulationConfig { size: 20, ..PopulationConfig::default() };
//! let mut world = World::new(world_config, population_config, 7).unwrap();
//!
//! let report = world.run_generation().unwrap();
//! assert_eq!(report.generation, 1);
//! assert!(report.ticks <= 500);
//! ```

use flapnet_engine::{Agent, ConfigError, EngineRng, Population, PopulationConfig};
use rand::{Rng as _, SeedableRng as _};
use serde::Serialize;

use crate::{FitnessStats, bird::Bird, pipe::Course};

/// Rejected world configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WorldError {
    #[display("screen must be at least {MIN_WIDTH}x{MIN_HEIGHT}, got {width}x{height}")]
    ScreenSize { width: f64, height: f64 },
    #[display("ticks per second must be positive, got {rate}")]
    TickRate { rate: f64 },
    #[display("{_0}")]
    Engine(ConfigError),
}

impl From<ConfigError> for WorldError {
    fn from(err: ConfigError) -> Self {
        Self::Engine(err)
    }
}

pub const MIN_WIDTH: f64 = 100.0;
/// Smallest screen on which the largest gap keeps its margin to both edges:
/// `(GAP_MAX / 2) * 1.2` above it and `GAP_MAX * 1.2` below its top edge.
pub const MIN_HEIGHT: f64 = 360.0;

/// Static parameters of a [`World`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Ends a generation after this many ticks by killing the survivors.
    pub max_generation_ticks: Option<u64>,
    /// Used only to convert ticks to elapsed seconds.
    pub ticks_per_second: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            max_generation_ticks: None,
            ticks_per_second: 60.0,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.width >= MIN_WIDTH && self.height >= MIN_HEIGHT) {
            return Err(WorldError::ScreenSize {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.ticks_per_second > 0.0) {
            return Err(WorldError::TickRate {
                rate: self.ticks_per_second,
            });
        }
        Ok(())
    }

    /// Where every bird of a generation starts.
    #[must_use]
    pub fn spawn_point(&self) -> (f64, f64) {
        ((self.width / 2.0).floor(), (self.height / 2.0).floor())
    }
}

/// Heads-up display values for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub generation: u64,
    pub alive: usize,
    pub elapsed_secs: f64,
    pub best_fitness: u64,
    /// Index of the fittest bird still flying.
    pub leader: Option<usize>,
}

/// Outcome of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: u64,
    pub ticks: u64,
    pub fitness: FitnessStats,
    /// Fitness of the elite clone, absent in the first generation.
    pub elite_fitness: Option<u64>,
    /// Whether the tick limit ended the generation.
    pub timed_out: bool,
}

/// The obstacle course, the birds, and the population steering them.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    population: Population,
    birds: Vec<Bird>,
    course: Course,
    engine_rng: EngineRng,
    course_rng: EngineRng,
    generation_ticks: u64,
    timed_out: bool,
}

impl World {
    /// Creates a world whose engine and course randomness both derive from
    /// `seed`. The first generation starts immediately.
    pub fn new(
        config: WorldConfig,
        population_config: PopulationConfig,
        seed: u64,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let population = Population::new(population_config)?;
        let mut master = EngineRng::seed_from_u64(seed);
        let engine_rng = EngineRng::seed_from_u64(master.random());
        let mut course_rng = EngineRng::seed_from_u64(master.random());
        let course = Course::new(config.width, config.height, &mut course_rng);
        let mut world = Self {
            config,
            population,
            birds: vec![],
            course,
            engine_rng,
            course_rng,
            generation_ticks: 0,
            timed_out: false,
        };
        world.start_generation()?;
        Ok(world)
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Bird bodies, index-aligned with [`Population::agents`].
    #[must_use]
    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// Ticks elapsed in the current generation.
    #[must_use]
    pub fn generation_ticks(&self) -> u64 {
        self.generation_ticks
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn hud(&self) -> Hud {
        Hud {
            generation: self.population.generation(),
            alive: self.population.live_count(),
            elapsed_secs: self.generation_ticks as f64 / self.config.ticks_per_second,
            best_fitness: self.population.best().map_or(0, Agent::fitness),
            leader: self.population.live_leader_index(),
        }
    }

    /// Summary of the current cohort.
    #[must_use]
    pub fn report(&self) -> GenerationReport {
        let agents = self.population.agents();
        GenerationReport {
            generation: self.population.generation(),
            ticks: self.generation_ticks,
            fitness: FitnessStats::new(agents.iter().map(Agent::fitness)).unwrap_or_default(),
            elite_fitness: agents.iter().find(|a| a.is_elite()).map(Agent::fitness),
            timed_out: self.timed_out,
        }
    }

    fn start_generation(&mut self) -> Result<(), ConfigError> {
        self.population.regenerate(&mut self.engine_rng)?;
        let (x, y) = self.config.spawn_point();
        self.birds = vec![Bird::spawn(x, y); self.population.agents().len()];
        self.course = Course::new(self.config.width, self.config.height, &mut self.course_rng);
        self.generation_ticks = 0;
        self.timed_out = false;
        Ok(())
    }

    /// Advances the world by one tick, starting the next generation first
    /// if the current one is extinct.
    pub fn tick(&mut self) -> Result<(), ConfigError> {
        if self.population.is_extinct() {
            self.start_generation()?;
        }
        self.step();
        Ok(())
    }

    /// Ticks until every agent of the current generation is dead.
    ///
    /// Without `max_generation_ticks` this only returns once the cohort
    /// fails, which a strong enough brain may never do.
    pub fn run_generation(&mut self) -> Result<GenerationReport, ConfigError> {
        if self.population.is_extinct() {
            self.start_generation()?;
        }
        while !self.population.is_extinct() {
            self.step();
        }
        let report = self.report();
        tracing::debug!(
            generation = report.generation,
            ticks = report.ticks,
            best = report.fitness.max,
            "generation finished"
        );
        Ok(report)
    }

    fn step(&mut self) {
        let screen_height = self.config.height;
        let agents = self.population.agents_mut();

        for (agent, bird) in agents.iter_mut().zip(&mut self.birds) {
            if agent.is_dead() {
                continue;
            }
            let Some(pipe) = self.course.nearest_ahead(bird.rect().x) else {
                continue;
            };
            bird.step(|b| agent.decide(&b.observe(pipe)));
        }

        self.course.scroll(&mut self.course_rng);

        for (agent, bird) in agents.iter_mut().zip(&self.birds) {
            if agent.is_alive()
                && (self.course.collides(bird.rect()) || bird.is_below(screen_height))
            {
                agent.mark_dead();
            }
        }
        for agent in agents.iter_mut() {
            agent.record_tick();
        }
        self.generation_ticks += 1;

        let limit_reached = self
            .config
            .max_generation_ticks
            .is_some_and(|limit| self.generation_ticks >= limit);
        if limit_reached && agents.iter().any(Agent::is_alive) {
            for agent in agents.iter_mut() {
                agent.mark_dead();
            }
            self.timed_out = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use flapnet_engine::{Dense, Network, Topology};

    use super::*;
    use crate::{GAP_MAX, Pipe, gap_start_range};

    fn limited(ticks: u64) -> WorldConfig {
        WorldConfig {
            max_generation_ticks: Some(ticks),
            ..WorldConfig::default()
        }
    }

    fn small(size: usize) -> PopulationConfig {
        PopulationConfig {
            size,
            ..PopulationConfig::default()
        }
    }

    #[test]
    fn rejects_bad_config() {
        let config = WorldConfig {
            height: 100.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(config, small(3), 0),
            Err(WorldError::ScreenSize { .. })
        ));
        let config = WorldConfig {
            ticks_per_second: 0.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(config, small(3), 0),
            Err(WorldError::TickRate { .. })
        ));
        let config = WorldConfig {
            height: MIN_HEIGHT - 1.0,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(
            World::new(WorldConfig::default(), small(0), 0),
            Err(WorldError::Engine(ConfigError::EmptyPopulation))
        ));
    }

    #[test]
    fn smallest_screen_fits_every_pipe() {
        assert_eq!(*gap_start_range(GAP_MAX, MIN_HEIGHT).end(), 120);
        let config = WorldConfig {
            height: MIN_HEIGHT,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_ok());

        let mut rng = EngineRng::seed_from_u64(10);
        for _ in 0..500 {
            let pipe = Pipe::random(0.0, MIN_HEIGHT, &mut rng);
            assert!(pipe.top().height > 0.0);
            assert!(pipe.bottom().height > 0.0);
            assert!(pipe.bottom().y <= MIN_HEIGHT);
        }
    }

    #[test]
    fn first_generation_spawns_at_center() {
        let world = World::new(WorldConfig::default(), small(4), 1).unwrap();
        assert_eq!(world.population().generation(), 1);
        assert_eq!(world.birds().len(), 4);
        for bird in world.birds() {
            assert_eq!(bird.rect().center_x(), 400.0);
            assert_eq!(bird.rect().center_y(), 300.0);
        }
        let hud = world.hud();
        assert_eq!(hud.alive, 4);
        assert_eq!(hud.elapsed_secs, 0.0);
    }

    #[test]
    fn generation_ends_with_everyone_dead() {
        let mut world = World::new(limited(5000), small(10), 2).unwrap();
        let report = world.run_generation().unwrap();
        assert!(world.population().is_extinct());
        assert_eq!(report.generation, 1);
        assert!(report.ticks > 0);
        assert_eq!(report.elite_fitness, None);
        assert!(report.fitness.max <= report.ticks);
    }

    #[test]
    fn hud_leader_is_a_live_bird() {
        let mut world = World::new(limited(5000), small(10), 9).unwrap();
        let leader = world.hud().leader.unwrap();
        assert!(world.population().agents()[leader].is_alive());

        world.run_generation().unwrap();
        let hud = world.hud();
        assert_eq!(hud.alive, 0);
        assert!(hud.best_fitness > 0);
        assert_eq!(hud.leader, None);
    }

    #[test]
    fn next_tick_breeds_a_new_generation() {
        let mut world = World::new(limited(5000), small(10), 3).unwrap();
        world.run_generation().unwrap();
        world.tick().unwrap();
        assert_eq!(world.population().generation(), 2);
        assert_eq!(world.birds().len(), 10);
        assert_eq!(
            world
                .population()
                .agents()
                .iter()
                .filter(|a| a.is_elite())
                .count(),
            1
        );
        assert_eq!(world.generation_ticks(), 1);
    }

    #[test]
    fn tick_limit_ends_generation() {
        // Nobody can fall off the screen or reach a pipe within 3 ticks.
        let mut world = World::new(limited(3), small(5), 4).unwrap();
        let report = world.run_generation().unwrap();
        assert_eq!(report.ticks, 3);
        assert!(report.timed_out);
        assert_eq!(report.fitness.min, 3);
        assert!(world.population().is_extinct());
    }

    #[test]
    fn coasting_bird_falls_off_the_screen() {
        // Zero weights and a bias favoring the second output: never flap.
        let dense = Dense::new(3, 2, vec![0.0; 6], vec![0.0, 1.0]).unwrap();
        let agent = Agent::new(Network::new(vec![dense.into()]).unwrap());
        let pipe = Pipe::new(1000.0, 100.0, 150.0, 600.0);

        let mut bird = Bird::spawn(400.0, 300.0);
        let mut ticks = 0;
        while !bird.is_below(600.0) {
            bird.step(|b| agent.decide(&b.observe(&pipe)));
            ticks += 1;
        }
        // y0 = 290 and y(n) = 290 + 0.2 * n * (n + 1), first >= 600 at n = 39
        assert_eq!(ticks, 39);
    }

    #[test]
    fn best_fitness_tracks_the_last_survivor() {
        let mut world = World::new(limited(5000), small(10), 8).unwrap();
        let report = world.run_generation().unwrap();
        if report.timed_out {
            assert_eq!(report.fitness.max, report.ticks);
        } else {
            // The last survivor is not credited for the tick it dies on.
            assert_eq!(report.fitness.max + 1, report.ticks);
        }
    }

    #[test]
    fn same_seed_same_history() {
        let run = |seed| {
            let mut world = World::new(limited(400), small(15), seed).unwrap();
            (0..3)
                .map(|_| {
                    let report = world.run_generation().unwrap();
                    world.tick().unwrap();
                    report
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn report_serializes() {
        let world = World::new(WorldConfig::default(), small(3), 5).unwrap();
        let json = serde_json::to_value(world.report()).unwrap();
        assert_eq!(json["generation"], 1);
        assert_eq!(json["elite_fitness"], serde_json::Value::Null);
    }

    #[test]
    fn custom_topology_is_accepted() {
        let config = PopulationConfig {
            topology: Topology::new(3).dense(8).dense(2),
            ..small(4)
        };
        let mut world = World::new(WorldConfig::default(), config, 6).unwrap();
        world.tick().unwrap();
        assert_eq!(world.generation_ticks(), 1);
    }
}
