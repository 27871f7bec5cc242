//! Content factory for building a controller from a data directory.

use std::path::{Path, PathBuf};

use agent_runtime::{EngineConfig, EntityController};
use nav_core::Grid;
use tracing::debug;

use crate::loaders::{ConfigLoader, GridLoader, LoadResult, Scenario, ScenarioLoader};

/// Loads content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// ├── maps/
/// │   ├── courtyard.txt
/// │   └── arena.ron
/// └── scenarios/
///     └── patrol.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads `config.toml`, or the defaults when the file does not exist.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if path.exists() {
            ConfigLoader::load(&path)
        } else {
            debug!(path = %path.display(), "no config file; using defaults");
            Ok(EngineConfig::default())
        }
    }

    /// Loads `maps/{name}.ron`, falling back to `maps/{name}.txt`.
    pub fn load_map(&self, name: &str) -> LoadResult<Grid> {
        let maps = self.data_dir.join("maps");
        let ron = maps.join(format!("{name}.ron"));
        if ron.exists() {
            return GridLoader::load(&ron);
        }
        GridLoader::load(&maps.join(format!("{name}.txt")))
    }

    /// Loads `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{name}.ron"));
        ScenarioLoader::load(&path)
    }

    /// Builds a controller for a named scenario, on the map it names.
    pub fn build(&self, scenario: &str) -> LoadResult<EntityController> {
        let scenario = self.load_scenario(scenario)?;
        let map = scenario
            .map
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Scenario does not name a map"))?;
        let grid = self.load_map(map)?;
        let config = self.load_config()?;
        Self::assemble(grid, config, &scenario)
    }

    /// Builds a controller from already-loaded parts.
    pub fn assemble(
        grid: Grid,
        config: EngineConfig,
        scenario: &Scenario,
    ) -> LoadResult<EntityController> {
        let mut controller = EntityController::builder()
            .grid(grid)
            .config(config)
            .build()?;
        scenario.apply(&mut controller)?;
        Ok(controller)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
