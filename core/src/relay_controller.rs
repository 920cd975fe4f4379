//! The interoperability relay.
//!
//! One package per simulation ferries the latest App1 payload seen at a
//! target Fog tier to an Edge tier, where it is published in both reduced
//! and expanded form:
//!
//! ```text
//! ON_HOLD ──(target has data)──▶ GOING_TO_FOG ──(target)──────▶ GOING_TO_EDGE ──▶ re-arm
//!    │                               │  ▲
//!    └──(no data: re-arm)            │  └─────────────┐
//!                                    └─(other fog)──▶ GOING_TO_CLOUD
//! ```
//!
//! Re-arming picks a fresh Edge origin and Fog target and parks the relay
//! on hold, empty.

use crate::{
    codec::CategoryCodec,
    dispatch::StepContext,
    error::{SimError, SimResult},
    event::SimEvent,
    package::{Activity, Package, RelayState, Role},
    package_controller::{arrived_at, missing_payload},
    rng::SubsystemRng,
    speed::SpeedModel,
    types::{App, TierKind, Tick},
    world::TierRegistry,
};

#[derive(Clone)]
pub struct RelayController {
    codec: CategoryCodec,
    speed: SpeedModel,
}

impl RelayController {
    pub fn new(codec: CategoryCodec, speed: SpeedModel) -> Self {
        Self { codec, speed }
    }

    pub fn step(&self, package: &mut Package, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let state = package.relay_state().ok_or_else(|| SimError::UnknownActivity {
            package_id: package.id.clone(),
            activity:   format!("{} (not a relay)", package.activity),
        })?;
        match package.activity {
            Activity::OnHold       => self.on_hold(package, state, ctx),
            Activity::GoingToFog   => self.going_to_fog(package, state, ctx),
            Activity::GoingToCloud => self.going_to_cloud(package, state, ctx),
            Activity::GoingToEdge  => self.going_to_edge(package, ctx),
        }
    }

    fn on_hold(&self, package: &mut Package, state: RelayState, ctx: &mut StepContext<'_>) -> SimResult<()> {
        if package.position != ctx.tiers.place(package.origin)?.position {
            return Ok(());
        }
        if ctx.tiers.last_payload(state.fog_target, App::App1)?.is_none() {
            let event = rearm(package, ctx.tiers, ctx.rng, &self.speed, ctx.tick)?;
            ctx.events.push(event);
            return Ok(());
        }
        package.visible = true;
        let fog = ctx.tiers.nearest_place_of_type(TierKind::Fog, package.position)?;
        package.role = Role::Relay(RelayState { temp_destination: Some(fog), ..state });
        package.travel_to(fog, Activity::GoingToFog);
        ctx.events.push(SimEvent::RelayDeparted {
            tick: ctx.tick,
            fog:  ctx.tiers.place(fog)?.name.clone(),
        });
        Ok(())
    }

    fn going_to_fog(&self, package: &mut Package, state: RelayState, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let Some(reached) = arrived_at(package, ctx)? else {
            return Ok(());
        };
        let hop = state.temp_destination.unwrap_or(reached);

        if hop == state.fog_target {
            if !self.adopt_target_payload(package, state, ctx)? {
                return Ok(());
            }
            package.travel_to(package.origin, Activity::GoingToEdge);
            ctx.events.push(SimEvent::RelayPickup {
                tick: ctx.tick,
                fog:  ctx.tiers.place(hop)?.name.clone(),
            });
        } else if ctx.tiers.place(hop)?.kind() == TierKind::Fog {
            let cloud = ctx.tiers.cloud()?;
            package.travel_to(cloud, Activity::GoingToCloud);
        } else {
            package.travel_to(hop, Activity::GoingToEdge);
        }
        Ok(())
    }

    fn going_to_cloud(&self, package: &mut Package, state: RelayState, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let Some(cloud) = arrived_at(package, ctx)? else {
            return Ok(());
        };
        if !self.adopt_target_payload(package, state, ctx)? {
            return Ok(());
        }
        package.role = Role::Relay(RelayState {
            temp_destination: Some(package.origin),
            ..state
        });
        package.travel_to(state.fog_target, Activity::GoingToFog);
        ctx.events.push(SimEvent::RelayCloudHop {
            tick:  ctx.tick,
            cloud: ctx.tiers.place(cloud)?.name.clone(),
        });
        Ok(())
    }

    fn going_to_edge(&self, package: &mut Package, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let Some(edge) = arrived_at(package, ctx)? else {
            return Ok(());
        };
        let reduced = package.payload().cloned().ok_or_else(|| missing_payload(package))?;
        let reduced_size = reduced.size_bytes();
        let expanded = self.codec.expand_payload(&reduced)?;
        package.set_payload(expanded.clone(), &self.speed);
        let expanded_size = expanded.size_bytes();
        ctx.tiers.store_interop(edge, reduced, expanded)?;

        let edge_name = ctx.tiers.place(edge)?.name.clone();
        log::debug!("tick={} relay: published at {edge_name} ({reduced_size}B -> {expanded_size}B)", ctx.tick);
        ctx.events.push(SimEvent::RelayDelivered {
            tick: ctx.tick,
            edge: edge_name,
            reduced_size,
            expanded_size,
        });

        let event = rearm(package, ctx.tiers, ctx.rng, &self.speed, ctx.tick)?;
        ctx.events.push(event);
        Ok(())
    }

    /// Take the target Fog tier's App1 payload. If the cache is empty the
    /// relay re-arms instead and `false` is returned.
    fn adopt_target_payload(
        &self,
        package: &mut Package,
        state: RelayState,
        ctx: &mut StepContext<'_>,
    ) -> SimResult<bool> {
        match ctx.tiers.last_payload(state.fog_target, App::App1)?.cloned() {
            Some(payload) => {
                package.set_payload(payload, &self.speed);
                Ok(true)
            }
            None => {
                let event = rearm(package, ctx.tiers, ctx.rng, &self.speed, ctx.tick)?;
                ctx.events.push(event);
                Ok(false)
            }
        }
    }
}

/// Park the relay empty at a random Edge tier with a random Fog target.
pub fn rearm(
    package: &mut Package,
    tiers: &TierRegistry,
    rng: &mut SubsystemRng,
    speed: &SpeedModel,
    tick: Tick,
) -> SimResult<SimEvent> {
    let fog_target = tiers.random_place_of_type(TierKind::Fog, rng)?;
    let origin = tiers.random_place_of_type(TierKind::Edge, rng)?;
    let origin_place = tiers.place(origin)?;

    package.origin = origin;
    package.role = Role::Relay(RelayState { fog_target, temp_destination: None });
    package.clear_payload(speed);
    package.hold_at(origin_place.position);

    let fog_name = tiers.place(fog_target)?.name.clone();
    log::trace!("tick={tick} relay: re-armed at {} watching {fog_name}", origin_place.name);
    Ok(SimEvent::RelayRearmed {
        tick,
        origin:     origin_place.name.clone(),
        fog_target: fog_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        payload::Payload,
        rng::{RngBank, SubsystemSlot},
        taxonomy::{LabelSet, TaxonomyCatalog},
        types::PlaceId,
        world::PlaceSpec,
    };
    use std::sync::Arc;

    const CLOUD: PlaceId = PlaceId(0);
    const FOG_NEAR: PlaceId = PlaceId(1);
    const FOG_FAR: PlaceId = PlaceId(2);
    const EDGE: PlaceId = PlaceId(3);

    /// One Edge so re-arm is predictable; two Fogs so both routes exist.
    fn tiers() -> TierRegistry {
        let spec = |name: &str, kind, x, y| PlaceSpec { name: name.into(), kind, x, y };
        TierRegistry::from_specs(&[
            spec("Cloud", TierKind::Cloud, 60, 0),
            spec("FogNear", TierKind::Fog, 10, 0),
            spec("FogFar", TierKind::Fog, 40, 40),
            spec("Edge", TierKind::Edge, 0, 0),
        ])
    }

    fn controller() -> RelayController {
        let codec = CategoryCodec::new(Arc::new(TaxonomyCatalog::default_test()));
        RelayController::new(codec, SpeedModel::default())
    }

    fn compact_lyme() -> Payload {
        let codec = CategoryCodec::new(Arc::new(TaxonomyCatalog::default_test()));
        let labels = LabelSet::new("Lyme disease", "BorreliaBurgdorferi", "Fever", "TickBite");
        codec.compact_payload(&Payload::Expanded(labels)).unwrap()
    }

    /// A relay on hold at the Edge, watching `target`.
    fn relay_watching(tiers: &TierRegistry, target: PlaceId) -> Package {
        let pos = tiers.place(EDGE).unwrap().position;
        Package::relay(EDGE, pos, target, &SpeedModel::default())
    }

    fn step(controller: &RelayController, package: &mut Package, tiers: &mut TierRegistry, events: &mut Vec<SimEvent>, tick: u64, arrive: bool) {
        if arrive {
            if let Some(dest) = package.destination {
                package.position = tiers.place(dest).unwrap().position;
            }
        }
        let bank = RngBank::new(11);
        let mut rng = bank.for_subsystem_at_tick(SubsystemSlot::Dispatch, tick);
        let mut ctx = StepContext { tick, tiers, rng: &mut rng, events };
        controller.step(package, &mut ctx).unwrap();
    }

    #[test]
    fn idles_while_target_has_no_app1_payload() {
        let controller = controller();
        let mut tiers = tiers();
        let mut events = Vec::new();
        let mut relay = relay_watching(&tiers, FOG_NEAR);

        for tick in 1..50 {
            step(&controller, &mut relay, &mut tiers, &mut events, tick, true);
            assert_eq!(relay.activity, Activity::OnHold);
            assert!(!relay.visible);
            assert_eq!(relay.payload(), None);
        }
        assert!(events.iter().all(|e| e.kind() == "relay_rearmed"));
    }

    #[test]
    fn app2_traffic_does_not_wake_the_relay() {
        let controller = controller();
        let mut tiers = tiers();
        let mut events = Vec::new();
        tiers.seed_fog_payload(FOG_NEAR, App::App2, compact_lyme()).unwrap();
        tiers.seed_fog_payload(FOG_FAR, App::App2, compact_lyme()).unwrap();
        let mut relay = relay_watching(&tiers, FOG_NEAR);

        step(&controller, &mut relay, &mut tiers, &mut events, 1, true);
        assert_eq!(relay.activity, Activity::OnHold);
    }

    #[test]
    fn direct_pickup_when_nearest_fog_is_the_target() {
        let controller = controller();
        let mut tiers = tiers();
        let mut events = Vec::new();
        tiers.seed_fog_payload(FOG_NEAR, App::App1, compact_lyme()).unwrap();
        let mut relay = relay_watching(&tiers, FOG_NEAR);

        step(&controller, &mut relay, &mut tiers, &mut events, 1, true);
        assert_eq!(relay.activity, Activity::GoingToFog);
        assert!(relay.visible);
        assert_eq!(relay.relay_state().unwrap().temp_destination, Some(FOG_NEAR));

        step(&controller, &mut relay, &mut tiers, &mut events, 2, true);
        assert_eq!(relay.activity, Activity::GoingToEdge);
        assert_eq!(relay.destination, Some(EDGE));
        assert_eq!(relay.size(), Some(16));

        step(&controller, &mut relay, &mut tiers, &mut events, 3, true);
        let cache = tiers.edge_cache(EDGE).unwrap();
        assert_eq!(cache.reduced_interop, Some(compact_lyme()));
        assert_eq!(
            cache.interop,
            Some(Payload::Expanded(LabelSet::new("Lyme disease", "BorreliaBurgdorferi", "Fever", "TickBite")))
        );
        assert_eq!(relay.activity, Activity::OnHold);
        assert_eq!(relay.payload(), None);
        assert!(!relay.visible);

        let kinds: Vec<_> = events.iter().map(SimEvent::kind).collect();
        assert_eq!(kinds, ["relay_departed", "relay_pickup", "relay_delivered", "relay_rearmed"]);
    }

    #[test]
    fn routes_through_cloud_when_target_is_elsewhere() {
        let controller = controller();
        let mut tiers = tiers();
        let mut events = Vec::new();
        tiers.seed_fog_payload(FOG_FAR, App::App1, compact_lyme()).unwrap();
        let mut relay = relay_watching(&tiers, FOG_FAR);

        // Edge -> nearest fog (not the target)
        step(&controller, &mut relay, &mut tiers, &mut events, 1, true);
        assert_eq!(relay.destination, Some(FOG_NEAR));

        // nearest fog -> cloud
        step(&controller, &mut relay, &mut tiers, &mut events, 2, true);
        assert_eq!(relay.activity, Activity::GoingToCloud);
        assert_eq!(relay.destination, Some(CLOUD));
        assert_eq!(relay.payload(), None);

        // cloud -> target fog, carrying the target's payload
        step(&controller, &mut relay, &mut tiers, &mut events, 3, true);
        assert_eq!(relay.activity, Activity::GoingToFog);
        assert_eq!(relay.destination, Some(FOG_FAR));
        assert_eq!(relay.payload(), Some(&compact_lyme()));
        assert_eq!(relay.relay_state().unwrap().temp_destination, Some(EDGE));

        // target fog -> own origin edge
        step(&controller, &mut relay, &mut tiers, &mut events, 4, true);
        assert_eq!(relay.activity, Activity::GoingToEdge);
        assert_eq!(relay.destination, Some(EDGE));

        step(&controller, &mut relay, &mut tiers, &mut events, 5, true);
        assert!(tiers.edge_cache(EDGE).unwrap().interop.is_some());
        assert_eq!(relay.activity, Activity::OnHold);
        assert!(events.iter().any(|e| e.kind() == "relay_cloud_hop"));
    }

    #[test]
    fn does_nothing_before_arrival() {
        let controller = controller();
        let mut tiers = tiers();
        let mut events = Vec::new();
        tiers.seed_fog_payload(FOG_NEAR, App::App1, compact_lyme()).unwrap();
        let mut relay = relay_watching(&tiers, FOG_NEAR);

        step(&controller, &mut relay, &mut tiers, &mut events, 1, true);
        step(&controller, &mut relay, &mut tiers, &mut events, 2, false);
        assert_eq!(relay.activity, Activity::GoingToFog);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn ordinary_package_is_not_a_relay() {
        let controller = controller();
        let mut tiers = tiers();
        let mut events = Vec::new();
        let mut package = Package::ordinary(
            "Package0",
            EDGE,
            tiers.place(EDGE).unwrap().position,
            compact_lyme(),
            &SpeedModel::default(),
        );
        let bank = RngBank::new(1);
        let mut rng = bank.for_subsystem(SubsystemSlot::Dispatch);
        let mut ctx = StepContext { tick: 1, tiers: &mut tiers, rng: &mut rng, events: &mut events };
        assert!(matches!(controller.step(&mut package, &mut ctx), Err(SimError::UnknownActivity { .. })));
    }
}
