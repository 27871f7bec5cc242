//! Scenario loader: which entities spawn where.
//!
//! Maps hold terrain only; a scenario places entities on one.
//!
//! ```ron
//! (
//!     map: Some("courtyard"),
//!     spawns: [
//!         (archetype: guard, position: (4, 4), group: Some(1), route: [(4, 4), (12, 4)]),
//!         (archetype: merchant, position: (8, 8)),
//!     ],
//!     subject: Some((position: (15.0, 10.0), dangerous: true)),
//! )
//! ```

use std::path::Path;

use agent_runtime::{Archetype, EntityController, EntityId, GroupId, RuntimeError, SpawnOptions};
use nav_core::{Position, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::loaders::{LoadResult, read_file};

/// One entity to spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub archetype: Archetype,
    pub position: (i32, i32),
    #[serde(default)]
    pub group: Option<u32>,
    #[serde(default)]
    pub speed: Option<f32>,
    /// Patrol points, waypoints or trade hotspots, depending on archetype.
    #[serde(default)]
    pub route: Vec<(i32, i32)>,
    #[serde(default)]
    pub anchor: Option<(i32, i32)>,
}

impl SpawnSpec {
    pub fn cell(&self) -> Position {
        Position::new(self.position.0, self.position.1)
    }

    pub fn options(&self) -> SpawnOptions {
        SpawnOptions {
            speed: self.speed,
            group: self.group.map(GroupId),
            route: self
                .route
                .iter()
                .map(|&(x, y)| Position::new(x, y))
                .collect(),
            anchor: self.anchor.map(|(x, y)| Position::new(x, y)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectSpec {
    pub position: (f32, f32),
    #[serde(default)]
    pub dangerous: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Map name for [`ContentFactory::build`](crate::ContentFactory::build).
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub spawns: Vec<SpawnSpec>,
    #[serde(default)]
    pub subject: Option<SubjectSpec>,
}

impl Scenario {
    /// Spawns every entity and places the subject.
    ///
    /// Spawns whose archetype has no registered behavior are skipped with a
    /// warning; any other spawn error aborts.
    pub fn apply(&self, controller: &mut EntityController) -> LoadResult<Vec<EntityId>> {
        let mut spawned = Vec::with_capacity(self.spawns.len());
        for spec in &self.spawns {
            match controller.spawn(spec.archetype, spec.cell(), spec.options()) {
                Ok(id) => spawned.push(id),
                Err(RuntimeError::UnknownArchetype(archetype)) => {
                    warn!(%archetype, position = %spec.cell(), "no behavior for archetype; spawn skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(subject) = self.subject {
            let (x, y) = subject.position;
            controller.set_subject(Vec2::new(x, y), subject.dangerous);
        }

        info!(
            spawned = spawned.len(),
            skipped = self.spawns.len() - spawned.len(),
            "scenario applied"
        );
        Ok(spawned)
    }
}

pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::from_ron(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load scenario {}: {}", path.display(), e))
    }

    pub fn from_ron(text: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(text)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        Ok(scenario)
    }
}
