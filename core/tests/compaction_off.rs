//! Runs with compaction disabled: payloads stay expanded end to end.

use edgefog_core::{
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
    taxonomy::TaxonomyCatalog,
    world::TierState,
};
use std::sync::Arc;

#[test]
fn deliveries_carry_expanded_payloads() {
    let mut config = SimConfig::default_test();
    config.scenario.compaction = false;
    config.scenario.interoperability = false;
    config.scenario.seed = Some(12);
    let taxonomy = Arc::new(TaxonomyCatalog::default_test());
    let mut engine = SimEngine::build("no-compaction".into(), &config, taxonomy).unwrap();

    let events = engine.run_ticks(300).unwrap();
    let sizes: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::FogDelivery { size, .. } => Some(*size),
            _ => None,
        })
        .collect();
    assert!(!sizes.is_empty());
    assert!(sizes.iter().all(|s| *s > 16), "found a compacted delivery: {sizes:?}");

    for place in engine.world.tiers.places() {
        if let TierState::Fog(c) = &place.state {
            for tally in [&c.app1, &c.app2] {
                if let Some(p) = &tally.last_payload {
                    assert!(!p.is_compacted());
                }
            }
        }
    }
}
