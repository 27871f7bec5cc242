//! Search configuration and heuristics.
use crate::geometry::Position;

/// Distance estimate used to order frontier expansion.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Heuristic {
    /// `|dx| + |dy|`
    #[default]
    Manhattan,
    /// `sqrt(dx² + dy²)`
    Euclidean,
    /// `max(|dx|, |dy|)`
    Chebyshev,
}

impl Heuristic {
    /// Unweighted estimate between two cells.
    pub fn estimate(self, from: Position, to: Position) -> f64 {
        let dx = f64::from(from.x.abs_diff(to.x));
        let dy = f64::from(from.y.abs_diff(to.y));
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
            Heuristic::Chebyshev => dx.max(dy),
        }
    }
}

/// Construction options for the A* search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SearchOptions {
    /// Offer the four diagonal neighbours in addition to the orthogonal ones.
    pub allow_diagonals: bool,
    /// Permit diagonal moves past a blocked orthogonal cell.
    ///
    /// When false a diagonal step requires both flanking orthogonal cells to be
    /// walkable, so agents never squeeze through a diagonal gap.
    pub cut_corners: bool,
    /// Cost of a diagonal step (orthogonal steps cost 1.0).
    pub diagonal_weight: f64,
    pub heuristic: Heuristic,
    /// Scales the heuristic; values above 1 trade optimality for speed.
    pub heuristic_weight: f64,
    /// Maximum node expansions before the search gives up.
    pub max_iterations: u32,
}

impl SearchOptions {
    pub const DEFAULT_DIAGONAL_WEIGHT: f64 = 1.4;
    pub const DEFAULT_HEURISTIC_WEIGHT: f64 = 1.0;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

    pub fn new() -> Self {
        Self {
            allow_diagonals: true,
            cut_corners: false,
            diagonal_weight: Self::DEFAULT_DIAGONAL_WEIGHT,
            heuristic: Heuristic::default(),
            heuristic_weight: Self::DEFAULT_HEURISTIC_WEIGHT,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Four-directional movement only.
    pub fn orthogonal() -> Self {
        Self::new().with_diagonals(false)
    }

    #[must_use]
    pub fn with_diagonals(mut self, allow: bool) -> Self {
        self.allow_diagonals = allow;
        self
    }

    #[must_use]
    pub fn with_corner_cutting(mut self, cut: bool) -> Self {
        self.cut_corners = cut;
        self
    }

    #[must_use]
    pub fn with_diagonal_weight(mut self, weight: f64) -> Self {
        self.diagonal_weight = weight;
        self
    }

    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    #[must_use]
    pub fn with_heuristic_weight(mut self, weight: f64) -> Self {
        self.heuristic_weight = weight;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Weighted heuristic estimate (`heuristic_weight * h`).
    #[inline]
    pub fn weighted_estimate(&self, from: Position, to: Position) -> f64 {
        self.heuristic_weight * self.heuristic.estimate(from, to)
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new()
    }
}
