//! Grid map loader.
//!
//! Two formats are accepted, chosen by extension:
//! - `.ron`: `(dimensions: (w, h), blocked: [(x, y), ...])`
//! - anything else: a text block where `.` is walkable and other characters
//!   are obstacles

use std::path::Path;

use nav_core::{Grid, Position};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    dimensions: (u32, u32),
    #[serde(default)]
    blocked: Vec<(i32, i32)>,
}

pub struct GridLoader;

impl GridLoader {
    pub fn load(path: &Path) -> LoadResult<Grid> {
        let content = read_file(path)?;
        let is_ron = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));

        let grid = if is_ron {
            Self::from_ron(&content)
        } else {
            Self::from_text(&content)
        };
        grid.map_err(|e| anyhow::anyhow!("Failed to load map {}: {}", path.display(), e))
    }

    pub fn from_text(text: &str) -> LoadResult<Grid> {
        Ok(text.parse()?)
    }

    /// Builds an open grid of the given size, then blocks the listed cells.
    pub fn from_ron(text: &str) -> LoadResult<Grid> {
        let data: MapDataRon = ron::from_str(text)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;

        let (width, height) = data.dimensions;
        let mut grid = Grid::new(width, height)?;
        for (x, y) in data.blocked {
            grid.set_walkable(Position::new(x, y), false)?;
        }
        Ok(grid)
    }
}
