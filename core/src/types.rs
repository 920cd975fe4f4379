//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A simulation tick. One tick = one host time step.
pub type Tick = u64;

/// A stable, unique identifier for a package entity.
pub type EntityId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Index of a place inside the tier registry. Stable for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceId(pub usize);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "place#{}", self.0)
    }
}

/// A cell on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance. Exact over the whole i32 grid, so
    /// usable for nearest-place ties.
    pub fn distance_sq(&self, other: &Position) -> i128 {
        let dx = self.x as i128 - other.x as i128;
        let dy = self.y as i128 - other.y as i128;
        dx * dx + dy * dy
    }

    /// One grid step toward `target` (diagonals allowed).
    pub fn step_toward(&self, target: &Position) -> Position {
        Position {
            x: self.x + unit_step(self.x, target.x),
            y: self.y + unit_step(self.y, target.y),
        }
    }
}

fn unit_step(from: i32, to: i32) -> i32 {
    match to.cmp(&from) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => 0,
    }
}

/// The four network tiers a place can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    House,
    Edge,
    Fog,
    Cloud,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::House => "House",
            Self::Edge  => "Edge",
            Self::Fog   => "Fog",
            Self::Cloud => "Cloud",
        };
        f.pad(s)
    }
}

/// The two applications sharing the topology.
/// House-originated traffic belongs to App1, everything else to App2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum App {
    App1,
    App2,
}

impl App {
    pub fn for_origin(kind: TierKind) -> Self {
        match kind {
            TierKind::House => Self::App1,
            _               => Self::App2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_toward_moves_one_cell_diagonally() {
        let from = Position::new(0, 0);
        assert_eq!(from.step_toward(&Position::new(5, -3)), Position::new(1, -1));
        assert_eq!(from.step_toward(&Position::new(0, 4)), Position::new(0, 1));
        assert_eq!(from.step_toward(&from), from);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let west = Position::new(i32::MIN + 5, i32::MIN);
        let east = Position::new(i32::MAX - 5, i32::MAX);
        let span = (i32::MAX as i128 - 5) - (i32::MIN as i128 + 5);
        let height = i32::MAX as i128 - i32::MIN as i128;
        assert_eq!(west.distance_sq(&east), span * span + height * height);
        assert_eq!(east.step_toward(&west), Position::new(i32::MAX - 6, i32::MAX - 1));
        assert_eq!(west.step_toward(&east), Position::new(i32::MIN + 6, i32::MIN + 1));
    }

    #[test]
    fn house_origin_is_app1() {
        assert_eq!(App::for_origin(TierKind::House), App::App1);
        assert_eq!(App::for_origin(TierKind::Edge), App::App2);
    }
}
