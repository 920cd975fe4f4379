//! Ordinary package lifecycle through the full engine.

use edgefog_core::{
    config::{ScenarioConfig, SimConfig},
    engine::SimEngine,
    event::SimEvent,
    package::Activity,
    speed::SpeedModel,
    taxonomy::TaxonomyCatalog,
    types::{App, TierKind},
    world::{PlaceSpec, TierState},
};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn every_package_departs_on_the_first_tick() {
    let mut engine = SimEngine::build_test("lc-first", 3).unwrap();
    let events = engine.run_ticks(1).unwrap();

    let dispatched: HashSet<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::PackageDispatched { package_id, .. } => Some(package_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(dispatched.len(), 8, "Expected all 8 test packages to leave, got {dispatched:?}");

    for p in engine.world.packages.iter().filter(|p| !p.is_relay()) {
        assert_eq!(p.activity, Activity::GoingToFog);
        assert!(p.visible, "{} should be visible once in flight", p.id);
    }
}

#[test]
fn every_package_completes_a_round_trip() {
    let mut engine = SimEngine::build_test("lc-liveness", 21).unwrap();
    let events = engine.run_ticks(300).unwrap();

    let recycled: HashSet<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::PackageRecycled { package_id, .. } => Some(package_id.as_str()),
            _ => None,
        })
        .collect();
    for i in 0..8 {
        let id = format!("Package{i}");
        assert!(recycled.contains(id.as_str()), "{id} never returned from the cloud");
    }
}

#[test]
fn compacted_payloads_arrive_at_sixteen_bytes() {
    let mut engine = SimEngine::build_test("lc-size", 8).unwrap();
    let events = engine.run_ticks(200).unwrap();

    let mut fog_deliveries = 0;
    for event in &events {
        match event {
            SimEvent::FogDelivery { size, .. } | SimEvent::CloudDelivery { size, .. } => {
                assert_eq!(*size, 16);
                fog_deliveries += 1;
            }
            _ => {}
        }
    }
    assert!(fog_deliveries > 0);
}

#[test]
fn edge_packages_leave_compacted_and_houses_leave_expanded() {
    let mut engine = SimEngine::build_test("lc-origin", 5).unwrap();
    let events = engine.run_ticks(1).unwrap();

    for event in &events {
        if let SimEvent::PackageDispatched { package_id, compacted, size, .. } = event {
            let index: usize = package_id.trim_start_matches("Package").parse().unwrap();
            if index % 2 == 0 {
                assert!(*compacted, "{package_id} left an edge uncompacted");
                assert_eq!(*size, 16);
            } else {
                assert!(!*compacted, "{package_id} left a house compacted");
                assert!(*size > 16);
            }
        }
    }
}

#[test]
fn tier_counters_match_delivery_events() {
    let mut engine = SimEngine::build_test("lc-counters", 13).unwrap();
    let events = engine.run_ticks(250).unwrap();

    let fog_app1 = events
        .iter()
        .filter(|e| matches!(e, SimEvent::FogDelivery { app: App::App1, .. }))
        .count() as u64;
    let cloud_total = events
        .iter()
        .filter(|e| matches!(e, SimEvent::CloudDelivery { .. }))
        .count() as u64;

    let mut counted_fog_app1 = 0;
    let mut counted_cloud = 0;
    for place in engine.world.tiers.places() {
        match &place.state {
            TierState::Fog(c) => {
                counted_fog_app1 += c.app1.packets;
                assert_eq!(c.app1.bytes, c.app1.packets * 16);
            }
            TierState::Cloud(c) => {
                counted_cloud += c.app1.packets + c.app2.packets;
                assert!(c.app1.last_payload.is_none() && c.app2.last_payload.is_none());
            }
            _ => {}
        }
    }
    assert!(fog_app1 > 0);
    assert_eq!(counted_fog_app1, fog_app1);
    assert_eq!(counted_cloud, cloud_total);
}

#[test]
fn packages_on_hold_are_hidden_and_speed_follows_size() {
    let mut engine = SimEngine::build_test("lc-invariants", 31).unwrap();
    let model = SpeedModel::default();

    engine.run_ticks(1).unwrap();
    for _ in 0..150 {
        engine.run_ticks(1).unwrap();
        for p in &engine.world.packages {
            if p.activity == Activity::OnHold {
                assert!(!p.visible, "{} visible while on hold", p.id);
            }
            match p.size() {
                Some(size) => assert_eq!(p.speed(), model.speed_for(size), "{}", p.id),
                None => assert_eq!(p.speed(), model.base_speed(), "{}", p.id),
            }
        }
    }
}

#[test]
fn layouts_at_the_grid_edges_still_step() {
    let place = |name: &str, kind, x, y| PlaceSpec { name: name.into(), kind, x, y };
    let config = SimConfig {
        scenario: ScenarioConfig { ordinary_packages: 1, seed: Some(5), ..ScenarioConfig::default() },
        layout: vec![
            place("Cloud", TierKind::Cloud, 0, 0),
            place("FarFog", TierKind::Fog, i32::MIN + 5, 0),
            place("FarEdge", TierKind::Edge, i32::MAX - 5, 0),
        ],
    };
    let taxonomy = Arc::new(TaxonomyCatalog::default_test());
    let mut engine = SimEngine::build("lc-grid-edge".into(), &config, taxonomy).unwrap();
    engine.run_ticks(5).unwrap();

    let package = engine.world.package("Package0").unwrap();
    assert_eq!(package.activity, Activity::GoingToFog);
    assert!(package.position.x < i32::MAX - 5, "package never moved toward the fog");
}
