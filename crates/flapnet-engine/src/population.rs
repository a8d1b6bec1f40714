//! Generational selection and reproduction.
//!
//! A [`Population`] holds one cohort of agents at a time. The simulation
//! shell drives it: it asks each live agent for decisions, marks agents dead,
//! and calls [`Population::regenerate`] once nobody is left alive.
//!
//! # Generation Turnover
//!
//! 1. The best agent of the retiring cohort is selected by fitness
//!    ([`select_best`]); ties go to the earliest agent in cohort order.
//! 2. `size - 1` offspring are produced by passing the best agent's brain
//!    through the mutation operator, each independently.
//! 3. One unmutated copy of the best agent is appended, flagged elite, with a
//!    head start of [`ELITE_HEAD_START`] fitness.
//!
//! The very first call builds `size` randomly initialized agents instead.
//!
//! # Example
//!
//! ```
//! use flapnet_engine::{Population, PopulationConfig};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(0);
//! let config = PopulationConfig { size: 10, ..PopulationConfig::default() };
//! let mut population = Population::new(config).unwrap();
//!
//! population.regenerate(&mut rng).unwrap();
//! assert_eq!(population.generation(), 1);
//! assert_eq!(population.agents().len(), 10);
//!
//! // ... the shell runs the cohort until every agent is dead ...
//! for agent in population.agents_mut() {
//!     agent.mark_dead();
//! }
//!
//! population.regenerate(&mut rng).unwrap();
//! assert_eq!(population.generation(), 2);
//! assert_eq!(population.agents().iter().filter(|a| a.is_elite()).count(), 1);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Agent, ConfigError, DECISION_SIZE, EmptyPopulationError, OBSERVATION_SIZE, Topology,
    WeightInit, mutation,
};

/// Fitness the elite clone starts with.
///
/// The elite is created one tick "ahead" of its siblings, which makes it win
/// fitness ties against offspring that die on the same tick.
pub const ELITE_HEAD_START: u64 = 1;

/// Default probability that an offspring is mutated at all.
pub const DEFAULT_MUTATION_RATE: f64 = 0.2;

/// Parameters controlling a [`Population`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Agents per generation.
    pub size: usize,
    /// Probability that an offspring receives any mutation.
    pub mutation_rate: f64,
    /// Brain shape shared by every agent.
    pub topology: Topology,
    /// Distribution for first-generation parameters.
    pub weight_init: WeightInit,
    /// Starting fitness of the elite clone.
    pub elite_head_start: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            mutation_rate: DEFAULT_MUTATION_RATE,
            topology: Topology::default(),
            weight_init: WeightInit::default(),
            elite_head_start: ELITE_HEAD_START,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate {
                rate: self.mutation_rate,
            });
        }
        self.weight_init.validate()?;
        self.topology.validate(OBSERVATION_SIZE, DECISION_SIZE)
    }
}

/// Returns the agent with the highest fitness.
///
/// Ties resolve to the first such agent in slice order.
pub fn select_best(agents: &[Agent]) -> Result<&Agent, EmptyPopulationError> {
    agents
        .iter()
        .reduce(|best, agent| {
            if agent.fitness() > best.fitness() {
                agent
            } else {
                best
            }
        })
        .ok_or(EmptyPopulationError)
}

/// Builds the next cohort from `elite`.
///
/// Produces `population_size - 1` mutated offspring followed by one unmutated
/// elite clone starting at `elite_head_start` fitness, so the result always
/// has exactly `population_size` agents and exactly one elite.
///
/// # Panics
///
/// Panics if `population_size` is zero or `mutation_rate` is outside `[0, 1]`.
#[must_use]
pub fn reproduce<R>(
    elite: &Agent,
    population_size: usize,
    mutation_rate: f64,
    elite_head_start: u64,
    rng: &mut R,
) -> Vec<Agent>
where
    R: Rng + ?Sized,
{
    assert!(population_size > 0, "population size must be positive");
    let mut agents: Vec<Agent> = (1..population_size)
        .map(|_| Agent::new(mutation::mutate(elite.brain(), mutation_rate, &mut *rng)))
        .collect();
    agents.push(Agent::elite(elite.brain().clone(), elite_head_start));
    agents
}

/// The current cohort of agents plus the generation counter.
#[derive(Debug, Clone)]
pub struct Population {
    config: PopulationConfig,
    agents: Vec<Agent>,
    generation: u64,
}

impl Population {
    /// Creates an empty population; call [`Self::regenerate`] to populate it.
    pub fn new(config: PopulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            agents: vec![],
            generation: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Generation number of the current cohort; `0` before the first one.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Every agent of the current cohort, dead ones included, in creation order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn live_agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter().filter(|a| a.is_alive())
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_agents().count()
    }

    /// Whether no agent of the current cohort is alive.
    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.agents.iter().all(Agent::is_dead)
    }

    /// Current leader of the cohort, dead agents included.
    #[must_use]
    pub fn best(&self) -> Option<&Agent> {
        select_best(&self.agents).ok()
    }

    /// Index of [`Self::best`] within [`Self::agents`].
    #[must_use]
    pub fn best_index(&self) -> Option<usize> {
        let best = self.best()?;
        self.agents.iter().position(|a| std::ptr::eq(a, best))
    }

    /// Index of the fittest agent still alive; ties go to the earliest.
    #[must_use]
    pub fn live_leader_index(&self) -> Option<usize> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_alive())
            .reduce(|best, candidate| {
                if candidate.1.fitness() > best.1.fitness() {
                    candidate
                } else {
                    best
                }
            })
            .map(|(i, _)| i)
    }

    /// Replaces the cohort with the next generation.
    ///
    /// The first call creates randomly initialized agents. Later calls breed
    /// from the best agent of the current cohort, which is expected to be
    /// fully dead by now.
    pub fn regenerate<R>(&mut self, rng: &mut R) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        let next = if self.generation == 0 {
            self.initial_agents(rng)?
        } else {
            let best = select_best(&self.agents).map_err(|_| ConfigError::EmptyPopulation)?;
            tracing::debug!(
                generation = self.generation,
                best_fitness = best.fitness(),
                "selected elite"
            );
            reproduce(
                best,
                self.config.size,
                self.config.mutation_rate,
                self.config.elite_head_start,
                rng,
            )
        };
        self.agents = next;
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            size = self.agents.len(),
            "started generation"
        );
        Ok(())
    }

    fn initial_agents<R>(&self, rng: &mut R) -> Result<Vec<Agent>, ConfigError>
    where
        R: Rng + ?Sized,
    {
        (0..self.config.size)
            .map(|_| {
                self.config
                    .topology
                    .build(&self.config.weight_init, &mut *rng)
                    .map(Agent::new)
            })
            .collect()
    }
}
