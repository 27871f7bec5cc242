//! Headless simulation runner.
//!
//! Loads a map, optional engine config and scenario, runs a fixed number of
//! ticks, then prints where every entity ended up and how the path cache did.
//!
//! ```text
//! sim-cli --map data/maps/courtyard.txt --scenario data/scenarios/patrol.ron \
//!         --ticks 300 --subject 15,10 --dangerous
//! ```

mod report;

use std::path::PathBuf;
use std::time::Duration;

use agent_runtime::{EngineConfig, EntityController, EntityEvent, Event, Topic};
use anyhow::{Context, Result};
use clap::Parser;
use nav_content::{ConfigLoader, ContentFactory, GridLoader, Scenario, ScenarioLoader};
use nav_core::Vec2;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, warn};

/// Run the agent simulation without a renderer
#[derive(Parser, Debug)]
#[command(name = "sim-cli")]
#[command(about = "Headless grid agent simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Grid map (`.txt` text or `.ron`)
    #[arg(short, long, value_name = "FILE")]
    map: PathBuf,

    /// Engine configuration (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scenario with entity spawns (RON)
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 100)]
    ticks: u32,

    /// Simulated time per tick in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Tracked subject position as `x,y`; overrides the scenario's
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    subject: Option<(f32, f32)>,

    /// Mark the subject as dangerous
    #[arg(long, requires = "subject")]
    dangerous: bool,
}

fn parse_point(text: &str) -> Result<(f32, f32), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{text}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid coordinate `{part}`: {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut controller = build(&cli)?;
    let mut events = controller.subscribe(Topic::Entity);

    let tick = Duration::from_millis(cli.tick_ms);
    info!(ticks = cli.ticks, tick_ms = cli.tick_ms, entities = controller.len(), "simulation started");
    for _ in 0..cli.ticks {
        controller.update(tick);
        log_entity_events(&mut events);
    }
    info!(elapsed_ms = controller.now().as_millis() as u64, "simulation finished");

    print!("{}", report::render(&controller));
    Ok(())
}

fn build(cli: &Cli) -> Result<EntityController> {
    let grid = GridLoader::load(&cli.map)?;
    let config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => EngineConfig::default(),
    };
    let scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::load(path)?,
        None => Scenario::default(),
    };

    info!(
        map = %cli.map.display(),
        width = grid.width(),
        height = grid.height(),
        walkable = grid.walkable_count(),
        "map loaded"
    );

    let mut controller = ContentFactory::assemble(grid, config, &scenario)
        .context("Failed to assemble simulation")?;

    if let Some((x, y)) = cli.subject {
        controller.set_subject(Vec2::new(x, y), cli.dangerous);
    }
    Ok(controller)
}

fn log_entity_events(events: &mut Receiver<Event>) {
    loop {
        match events.try_recv() {
            Ok(Event::Entity(EntityEvent::StateChanged { entity, from, to })) => {
                info!(%entity, from, to, "state changed");
            }
            Ok(Event::Entity(EntityEvent::UnknownState { entity, requested, .. })) => {
                warn!(%entity, requested, "unknown state requested");
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "event log fell behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_parse_with_whitespace() {
        assert_eq!(parse_point("3, 4.5"), Ok((3.0, 4.5)));
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,1").is_err());
    }

    #[test]
    fn dangerous_requires_a_subject() {
        assert!(Cli::try_parse_from(["sim-cli", "--map", "m.txt", "--dangerous"]).is_err());
        let cli = Cli::try_parse_from([
            "sim-cli", "--map", "m.txt", "--subject", "1,2", "--dangerous", "--ticks", "5",
        ])
        .unwrap();
        assert_eq!(cli.subject, Some((1.0, 2.0)));
        assert!(cli.dangerous);
        assert_eq!(cli.ticks, 5);
        assert_eq!(cli.tick_ms, 100);
    }
}
