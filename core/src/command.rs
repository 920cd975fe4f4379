use serde::{Deserialize, Serialize};
use crate::types::EntityId;

/// Commands a host may issue between ticks.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Freeze a package: the dispatcher and motion skip it.
    TakeControl { package_id: EntityId },
    ReleaseControl { package_id: EntityId },
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TakeControl { .. }    => "take_control",
            Self::ReleaseControl { .. } => "release_control",
        }
    }

    pub fn package_id(&self) -> &str {
        match self {
            Self::TakeControl { package_id } | Self::ReleaseControl { package_id } => package_id,
        }
    }
}
