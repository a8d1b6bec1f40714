use std::path::PathBuf;

use chrono::{DateTime, Utc};
use flapnet_engine::PopulationConfig;
use flapnet_sim::{GenerationReport, World, WorldConfig};
use serde::Serialize;

use super::EvolutionArg;
use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    pub(super) evolution: EvolutionArg,
    /// Generations to run
    #[arg(long, default_value_t = 50)]
    generations: u64,
    /// Ticks after which a generation is cut short
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,
    /// Write a JSON report of the run to this file ("-" for stdout)
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Log of a training run. Brains are not included.
#[derive(Debug, Serialize)]
struct TrainingReport {
    trained_at: DateTime<Utc>,
    seed: u64,
    population: PopulationConfig,
    world: WorldConfig,
    best_fitness: u64,
    generations: Vec<GenerationReport>,
}

/// Runs `count` consecutive generations, logging each one as it finishes.
fn run_generations(world: &mut World, count: u64) -> anyhow::Result<Vec<GenerationReport>> {
    let mut history = Vec::new();
    for _ in 0..count {
        let summary = world.run_generation()?;
        tracing::info!(
            generation = summary.generation,
            ticks = summary.ticks,
            max = summary.fitness.max,
            mean = summary.fitness.mean,
            median = summary.fitness.median,
            elite = ?summary.elite_fitness,
            timed_out = summary.timed_out,
            "generation finished"
        );
        history.push(summary);
    }
    Ok(history)
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    util::init_tracing();

    let TrainArg {
        evolution,
        generations,
        max_ticks,
        report,
    } = arg;

    let seed = flapnet_engine::resolve_seed(evolution.seed);
    let population = evolution.population_config();
    let world_config = WorldConfig {
        max_generation_ticks: Some(*max_ticks),
        ..WorldConfig::default()
    };
    let mut world = World::new(world_config.clone(), population.clone(), seed)?;
    tracing::info!(
        seed,
        population = population.size,
        mutation_rate = population.mutation_rate,
        parameters = population.topology.parameter_count(),
        "training started"
    );

    let history = run_generations(&mut world, *generations)?;

    let best_fitness = history.iter().map(|r| r.fitness.max).max().unwrap_or(0);
    tracing::info!(best_fitness, "training completed");

    if let Some(path) = report {
        let path = (path.as_os_str() != "-").then(|| path.clone());
        let report = TrainingReport {
            trained_at: Utc::now(),
            seed,
            population,
            world: world_config,
            best_fitness,
            generations: history,
        };
        Output::save_json(&report, path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_are_consecutive() {
        let population = PopulationConfig {
            size: 8,
            ..PopulationConfig::default()
        };
        let world_config = WorldConfig {
            max_generation_ticks: Some(300),
            ..WorldConfig::default()
        };
        let mut world = World::new(world_config, population, 3).unwrap();
        let history = run_generations(&mut world, 3).unwrap();
        let generations: Vec<_> = history.iter().map(|r| r.generation).collect();
        assert_eq!(generations, vec![1, 2, 3]);
        assert!(history[1].elite_fitness.is_some());
        // Nothing is bred past the last requested generation.
        assert_eq!(world.population().generation(), 3);
        assert!(world.population().is_extinct());
    }
}
