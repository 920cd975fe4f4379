//! Initial package population.
//!
//! `Package0..PackageN-1` alternate between Edge (even index) and House
//! (odd index) origins. The relay, when enabled, is re-armed straight away
//! so it starts parked at a real Edge tier with a real Fog target.

use crate::{
    config::ScenarioConfig,
    error::{SimError, SimResult},
    package::Package,
    payload::Payload,
    relay_controller,
    rng::SubsystemRng,
    speed::SpeedModel,
    taxonomy::Taxonomy,
    types::{Tick, TierKind},
    world::TierRegistry,
};

/// Tier kinds the scenario cannot run without.
pub fn required_tiers(scenario: &ScenarioConfig) -> Vec<TierKind> {
    let mut kinds = vec![TierKind::Cloud, TierKind::Fog];
    if scenario.ordinary_packages > 0 || scenario.interoperability {
        kinds.push(TierKind::Edge);
    }
    if scenario.ordinary_packages > 1 {
        kinds.push(TierKind::House);
    }
    kinds
}

/// The relay publishes a compacted payload and its expansion, so it
/// needs compaction on. Without compaction the scenario is the plain
/// variant: payloads travel expanded and there is no relay.
pub fn validate_scenario(scenario: &ScenarioConfig) -> SimResult<()> {
    if scenario.interoperability && !scenario.compaction {
        return Err(SimError::Config(
            "interoperability requires compaction; disable one or enable both".into(),
        ));
    }
    Ok(())
}

pub fn validate_topology(scenario: &ScenarioConfig, tiers: &TierRegistry) -> SimResult<()> {
    match required_tiers(scenario).into_iter().find(|kind| !tiers.has_kind(*kind)) {
        Some(kind) => Err(SimError::UnknownTierType { kind }),
        None => Ok(()),
    }
}

pub fn populate(
    scenario: &ScenarioConfig,
    tiers: &TierRegistry,
    taxonomy: &dyn Taxonomy,
    speed: &SpeedModel,
    rng: &mut SubsystemRng,
) -> SimResult<Vec<Package>> {
    validate_scenario(scenario)?;
    validate_topology(scenario, tiers)?;

    let mut packages = Vec::with_capacity(scenario.ordinary_packages + 1);
    for i in 0..scenario.ordinary_packages {
        let kind = if i % 2 == 0 { TierKind::Edge } else { TierKind::House };
        let origin = tiers.random_place_of_type(kind, rng)?;
        let position = tiers.place(origin)?.position;
        let payload = Payload::Expanded(taxonomy.sample_label_set(rng));
        packages.push(Package::ordinary(format!("Package{i}"), origin, position, payload, speed));
    }

    if scenario.interoperability {
        let origin = tiers.random_place_of_type(TierKind::Edge, rng)?;
        let fog = tiers.random_place_of_type(TierKind::Fog, rng)?;
        let mut relay = Package::relay(origin, tiers.place(origin)?.position, fog, speed);
        relay_controller::rearm(&mut relay, tiers, rng, speed, Tick::default())?;
        packages.push(relay);
    }

    log::info!(
        "population: {} ordinary packages, relay {}",
        scenario.ordinary_packages,
        if scenario.interoperability { "on" } else { "off" },
    );
    Ok(packages)
}
