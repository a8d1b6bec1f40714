use flapnet_sim::{World, WorldConfig};

use self::app::WatchApp;
use super::EvolutionArg;
use crate::tui::Tui;

mod app;
mod view;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WatchArg {
    #[clap(flatten)]
    pub(super) evolution: EvolutionArg,
    /// Simulation ticks per second
    #[arg(long, default_value_t = 60.0, value_parser = parse_rate)]
    tick_rate: f64,
    /// Start in turbo mode
    #[arg(long)]
    turbo: bool,
    /// Ticks after which a generation is cut short
    #[arg(long)]
    max_ticks: Option<u64>,
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|err| format!("{err}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be a positive finite number, got {rate}"))
    }
}

pub(crate) fn run(arg: &WatchArg) -> anyhow::Result<()> {
    let WatchArg {
        evolution,
        tick_rate,
        turbo,
        max_ticks,
    } = arg;

    let seed = flapnet_engine::resolve_seed(evolution.seed);
    let world_config = WorldConfig {
        max_generation_ticks: *max_ticks,
        ..WorldConfig::default()
    };
    let world = World::new(world_config, evolution.population_config(), seed)?;

    let mut app = WatchApp::new(world, *tick_rate, *turbo);
    Tui::new().run(&mut app)?;
    app.into_result()
}
