use crate::{Network, ShapeError};

/// Number of components in an [`Observation`].
pub const OBSERVATION_SIZE: usize = 3;
/// Number of network outputs consumed by [`Decision::from_output`].
pub const DECISION_SIZE: usize = 2;

/// What an agent sees on one tick.
///
/// `dx`/`dy` are the signed offset from the agent to the center of the
/// nearest upcoming obstacle gap; `vertical_velocity` is its current vertical
/// speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub dx: f64,
    pub dy: f64,
    pub vertical_velocity: f64,
}

impl Observation {
    #[must_use]
    pub const fn new(dx: f64, dy: f64, vertical_velocity: f64) -> Self {
        Self {
            dx,
            dy,
            vertical_velocity,
        }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; OBSERVATION_SIZE] {
        [self.dx, self.dy, self.vertical_velocity]
    }
}

impl TryFrom<&[f64]> for Observation {
    type Error = ShapeError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match *values {
            [dx, dy, vertical_velocity] => Ok(Self::new(dx, dy, vertical_velocity)),
            _ => Err(ShapeError::ObservationLength {
                expected: OBSERVATION_SIZE,
                actual: values.len(),
            }),
        }
    }
}

/// Binary output of an agent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Decision {
    /// Trigger an upward impulse.
    Flap,
    /// Do nothing this tick.
    Coast,
}

impl Decision {
    /// Flaps iff the first output is strictly greater than the second.
    ///
    /// Ties and NaN comparisons coast.
    ///
    /// # Panics
    ///
    /// Panics if `output` does not have exactly two elements.
    #[must_use]
    pub fn from_output(output: &[f64]) -> Self {
        let [a, b] = *output else {
            panic!(
                "decision needs {DECISION_SIZE} network outputs, got {}",
                output.len()
            );
        };
        if a > b { Self::Flap } else { Self::Coast }
    }
}

impl From<Decision> for bool {
    fn from(decision: Decision) -> Self {
        decision.is_flap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum AgentState {
    Alive,
    Dead,
}

/// One evolved controller: a brain plus its survival record.
#[derive(Debug, Clone)]
pub struct Agent {
    brain: Network,
    fitness: u64,
    state: AgentState,
    elite: bool,
}

impl Agent {
    /// Creates a live, non-elite agent with zero fitness.
    #[must_use]
    pub fn new(brain: Network) -> Self {
        Self {
            brain,
            fitness: 0,
            state: AgentState::Alive,
            elite: false,
        }
    }

    /// Creates a live agent flagged elite, starting at `fitness`.
    #[must_use]
    pub fn elite(brain: Network, fitness: u64) -> Self {
        Self {
            brain,
            fitness,
            state: AgentState::Alive,
            elite: true,
        }
    }

    #[must_use]
    pub fn brain(&self) -> &Network {
        &self.brain
    }

    /// Ticks survived (plus any head start).
    #[must_use]
    pub fn fitness(&self) -> u64 {
        self.fitness
    }

    #[must_use]
    pub fn is_elite(&self) -> bool {
        self.elite
    }

    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn mark_dead(&mut self) {
        self.state = AgentState::Dead;
    }

    /// Credits one survived tick. Dead agents keep their final fitness.
    pub fn record_tick(&mut self) {
        if self.is_alive() {
            self.fitness += 1;
        }
    }

    /// Runs the brain on `observation`.
    ///
    /// # Panics
    ///
    /// Panics if the agent is dead.
    #[must_use]
    pub fn decide(&self, observation: &Observation) -> Decision {
        assert!(self.is_alive(), "dead agents do not decide");
        Decision::from_output(&self.brain.forward(&observation.to_array()))
    }
}
