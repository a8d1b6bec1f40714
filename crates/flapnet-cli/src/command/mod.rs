use clap::{Parser, Subcommand};
use flapnet_engine::{
    Activation, DECISION_SIZE, DEFAULT_MUTATION_RATE, ELITE_HEAD_START, OBSERVATION_SIZE,
    PopulationConfig, Topology, WeightInit,
};

use self::{train::TrainArg, watch::WatchArg};

mod train;
mod watch;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a population headlessly and print per-generation statistics
    Train(#[clap(flatten)] TrainArg),
    /// Watch a population evolve in the terminal
    Watch(#[clap(flatten)] WatchArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Watch(arg) => watch::run(&arg)?,
    }
    Ok(())
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum InitKind {
    #[default]
    Uniform,
    Normal,
}

/// Population and brain options shared by every mode.
#[derive(Debug, Clone, clap::Args)]
struct EvolutionArg {
    /// Agents per generation
    #[arg(long, default_value_t = 100)]
    population: usize,
    /// Probability that an offspring is mutated at all
    #[arg(long, default_value_t = DEFAULT_MUTATION_RATE)]
    mutation_rate: f64,
    /// Starting fitness of the elite clone
    #[arg(long, default_value_t = ELITE_HEAD_START)]
    elite_head_start: u64,
    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [5, 4])]
    hidden: Vec<usize>,
    /// Activation function (sigmoid, tanh, relu, identity)
    #[arg(long, default_value_t = Activation::SIGMOID)]
    activation: Activation,
    /// Also apply the activation after every hidden layer
    #[arg(long)]
    activate_hidden: bool,
    /// Distribution of first-generation weights
    #[arg(long, value_enum, default_value_t)]
    init: InitKind,
    /// Half-width (uniform) or standard deviation (normal) of initial weights
    #[arg(long, default_value_t = 1.0)]
    init_scale: f64,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

impl EvolutionArg {
    fn population_config(&self) -> PopulationConfig {
        let widths = self
            .hidden
            .iter()
            .copied()
            .chain([DECISION_SIZE])
            .collect::<Vec<_>>();
        let weight_init = match self.init {
            InitKind::Uniform => WeightInit::Uniform {
                half_width: self.init_scale,
            },
            InitKind::Normal => WeightInit::Normal {
                std_dev: self.init_scale,
            },
        };
        PopulationConfig {
            size: self.population,
            mutation_rate: self.mutation_rate,
            topology: Topology::from_widths(
                OBSERVATION_SIZE,
                &widths,
                self.activation,
                self.activate_hidden,
            ),
            weight_init,
            elite_head_start: self.elite_head_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;
    use flapnet_engine::{ConfigError, Population, ShapeError};

    use super::*;

    #[test]
    fn command_is_well_formed() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_reference_network() {
        let args = CommandArgs::parse_from(["flapnet", "train"]);
        let Mode::Train(arg) = args.mode else {
            panic!("expected train");
        };
        let config = arg.evolution.population_config();
        assert_eq!(config.size, 100);
        assert_eq!(config.mutation_rate, 0.2);
        assert_eq!(config.topology, Topology::default());
        assert_eq!(config.weight_init, WeightInit::default());
    }

    #[test]
    fn rejects_unusable_tick_rates() {
        for rate in ["0", "-5", "NaN", "inf", "fast"] {
            let result = CommandArgs::try_parse_from(["flapnet", "watch", "--tick-rate", rate]);
            assert!(result.is_err(), "accepted tick rate {rate}");
        }
        let args = CommandArgs::try_parse_from(["flapnet", "watch", "--tick-rate", "120"]);
        assert!(args.is_ok());
    }

    #[test]
    fn zero_width_hidden_layer_is_rejected() {
        let args = CommandArgs::parse_from(["flapnet", "train", "--hidden", "0"]);
        let Mode::Train(arg) = args.mode else {
            panic!("expected train");
        };
        assert!(matches!(
            Population::new(arg.evolution.population_config()),
            Err(ConfigError::Topology(ShapeError::ZeroWidth { index: 0 }))
        ));
    }

    #[test]
    fn custom_network() {
        let args = CommandArgs::parse_from([
            "flapnet",
            "watch",
            "--hidden",
            "8",
            "--activation",
            "tanh",
            "--activate-hidden",
            "--init",
            "normal",
            "--init-scale",
            "0.5",
        ]);
        let Mode::Watch(arg) = args.mode else {
            panic!("expected watch");
        };
        let config = arg.evolution.population_config();
        assert_eq!(
            config.topology,
            Topology::new(3)
                .dense(8)
                .activation(Activation::TANH)
                .dense(2)
                .activation(Activation::TANH)
        );
        assert_eq!(config.weight_init, WeightInit::Normal { std_dev: 0.5 });
    }
}
