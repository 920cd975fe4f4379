use crate::{
    speed::DEFAULT_SPEED,
    types::TierKind,
    world::PlaceSpec,
};
use serde::{Deserialize, Serialize};

fn default_base_speed() -> u32 { DEFAULT_SPEED }
fn default_ordinary_packages() -> usize { 40 }
fn default_true() -> bool { true }

/// Knobs of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Speed of a package carrying a 16-byte payload.
    #[serde(default = "default_base_speed")]
    pub base_speed: u32,
    #[serde(default = "default_ordinary_packages")]
    pub ordinary_packages: usize,
    /// Create the interoperability relay.
    #[serde(default = "default_true")]
    pub interoperability: bool,
    /// When off, payloads travel expanded end to end.
    #[serde(default = "default_true")]
    pub compaction: bool,
    /// Master seed. Drawn at random and logged when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_speed:        default_base_speed(),
            ordinary_packages: default_ordinary_packages(),
            interoperability:  true,
            compaction:        true,
            seed:              None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LayoutFile {
    places: Vec<PlaceSpec>,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub scenario: ScenarioConfig,
    pub layout:   Vec<PlaceSpec>,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let scenario_path = format!("{data_dir}/scenario/scenario.json");
        let scenario_content = std::fs::read_to_string(&scenario_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {scenario_path}: {e}"))?;
        let scenario: ScenarioConfig = serde_json::from_str(&scenario_content)?;

        let layout_path = format!("{data_dir}/world/layout.json");
        let layout_content = std::fs::read_to_string(&layout_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {layout_path}: {e}"))?;
        let layout_file: LayoutFile = serde_json::from_str(&layout_content)?;

        if scenario.base_speed == 0 {
            anyhow::bail!("{scenario_path}: base_speed must be at least 1");
        }

        Ok(Self { scenario, layout: layout_file.places })
    }

    /// Small fixed topology: one cloud, two fogs, two edges, three houses.
    pub fn default_test() -> Self {
        let place = |name: &str, kind, x, y| PlaceSpec { name: name.into(), kind, x, y };
        Self {
            scenario: ScenarioConfig {
                ordinary_packages: 8,
                ..ScenarioConfig::default()
            },
            layout: vec![
                place("Cloud", TierKind::Cloud, 50, 0),
                place("FogNorth", TierKind::Fog, 20, 10),
                place("FogSouth", TierKind::Fog, 20, 40),
                place("EdgeA", TierKind::Edge, 0, 5),
                place("EdgeB", TierKind::Edge, 0, 45),
                place("House1", TierKind::House, 5, 15),
                place("House2", TierKind::House, 5, 35),
                place("House3", TierKind::House, 10, 25),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_fields_fall_back_to_defaults() {
        let scenario: ScenarioConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(scenario.base_speed, 11);
        assert_eq!(scenario.ordinary_packages, 40);
        assert!(scenario.interoperability);
        assert!(scenario.compaction);
        assert_eq!(scenario.seed, None);
    }

    #[test]
    fn scenario_overrides_are_honoured() {
        let scenario: ScenarioConfig =
            serde_json::from_str(r#"{"base_speed": 5, "compaction": false, "seed": 7}"#).unwrap();
        assert_eq!(scenario.base_speed, 5);
        assert!(!scenario.compaction);
        assert_eq!(scenario.seed, Some(7));
    }

    #[test]
    fn default_test_has_every_tier() {
        let config = SimConfig::default_test();
        for kind in [TierKind::Cloud, TierKind::Fog, TierKind::Edge, TierKind::House] {
            assert!(config.layout.iter().any(|p| p.kind == kind), "missing {kind}");
        }
    }
}
