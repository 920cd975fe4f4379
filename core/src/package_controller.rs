//! Lifecycle of ordinary packages.
//!
//! ON_HOLD ─▶ GOING_TO_FOG ─▶ GOING_TO_CLOUD ─▶ ON_HOLD (at a fresh origin)
//!
//! Edge-originated packages compact before leaving; House-originated
//! packages travel expanded and compact at the Fog tier.

use crate::{
    codec::CategoryCodec,
    dispatch::StepContext,
    error::{SimError, SimResult},
    event::SimEvent,
    package::{Activity, Package},
    payload::Payload,
    speed::SpeedModel,
    types::{App, PlaceId, TierKind},
};

#[derive(Clone)]
pub struct PackageController {
    codec:      CategoryCodec,
    speed:      SpeedModel,
    compaction: bool,
}

impl PackageController {
    pub fn new(codec: CategoryCodec, speed: SpeedModel, compaction: bool) -> Self {
        Self { codec, speed, compaction }
    }

    pub fn step(&self, package: &mut Package, ctx: &mut StepContext<'_>) -> SimResult<()> {
        match package.activity {
            Activity::OnHold       => self.on_hold(package, ctx),
            Activity::GoingToFog   => self.going_to_fog(package, ctx),
            Activity::GoingToCloud => self.going_to_cloud(package, ctx),
            other => Err(SimError::UnknownActivity {
                package_id: package.id.clone(),
                activity:   other.to_string(),
            }),
        }
    }

    fn on_hold(&self, package: &mut Package, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let origin = ctx.tiers.place(package.origin)?;
        if package.position != origin.position {
            return Ok(());
        }
        let origin_name = origin.name.clone();
        if origin.kind() == TierKind::Edge {
            self.compact(package)?;
        }
        package.visible = true;
        let fog = ctx.tiers.nearest_place_of_type(TierKind::Fog, package.position)?;
        package.travel_to(fog, Activity::GoingToFog);

        let size = carried_size(package)?;
        log::debug!("tick={} {}: {origin_name} -> fog size={size}", ctx.tick, package.id);
        ctx.events.push(SimEvent::PackageDispatched {
            tick:       ctx.tick,
            package_id: package.id.clone(),
            origin:     origin_name,
            fog:        ctx.tiers.place(fog)?.name.clone(),
            size,
            compacted:  package.payload().is_some_and(Payload::is_compacted),
        });
        Ok(())
    }

    fn going_to_fog(&self, package: &mut Package, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let Some(fog) = arrived_at(package, ctx)? else {
            return Ok(());
        };
        let origin_kind = ctx.tiers.place(package.origin)?.kind();
        if origin_kind == TierKind::House {
            self.compact(package)?;
        }
        let app = App::for_origin(origin_kind);
        let size = carried_size(package)?;
        ctx.tiers.record_delivery(fog, app, size, package.payload().cloned())?;

        let cloud = ctx.tiers.cloud()?;
        package.travel_to(cloud, Activity::GoingToCloud);

        ctx.events.push(SimEvent::FogDelivery {
            tick:       ctx.tick,
            package_id: package.id.clone(),
            fog:        ctx.tiers.place(fog)?.name.clone(),
            app,
            size,
        });
        Ok(())
    }

    fn going_to_cloud(&self, package: &mut Package, ctx: &mut StepContext<'_>) -> SimResult<()> {
        let Some(cloud) = arrived_at(package, ctx)? else {
            return Ok(());
        };
        let origin_kind = ctx.tiers.place(package.origin)?.kind();
        let app = App::for_origin(origin_kind);
        let size = carried_size(package)?;
        ctx.tiers.record_delivery(cloud, app, size, None)?;
        ctx.events.push(SimEvent::CloudDelivery {
            tick:       ctx.tick,
            package_id: package.id.clone(),
            cloud:      ctx.tiers.place(cloud)?.name.clone(),
            app,
            size,
        });

        // Same category as before: House stays House, Edge stays Edge.
        let new_origin = ctx.tiers.random_place_of_type(origin_kind, ctx.rng)?;
        let labels = self.codec.taxonomy().sample_label_set(ctx.rng);
        package.set_payload(Payload::Expanded(labels), &self.speed);
        package.origin = new_origin;
        let origin = ctx.tiers.place(new_origin)?;
        package.hold_at(origin.position);

        let new_size = carried_size(package)?;
        log::debug!("tick={} {}: recycled at {} size={new_size}", ctx.tick, package.id, origin.name);
        ctx.events.push(SimEvent::PackageRecycled {
            tick:       ctx.tick,
            package_id: package.id.clone(),
            new_origin: origin.name.clone(),
            size:       new_size,
        });
        Ok(())
    }

    fn compact(&self, package: &mut Package) -> SimResult<()> {
        if !self.compaction {
            return Ok(());
        }
        let payload = package
            .payload()
            .ok_or_else(|| missing_payload(package))?;
        let compacted = self.codec.compact_payload(payload)?;
        package.set_payload(compacted, &self.speed);
        Ok(())
    }
}

/// The destination, once the package stands on it.
pub(crate) fn arrived_at(
    package: &Package,
    ctx: &StepContext<'_>,
) -> SimResult<Option<PlaceId>> {
    if ctx.tiers.is_at_destination(package)? {
        Ok(package.destination)
    } else {
        Ok(None)
    }
}

fn carried_size(package: &Package) -> SimResult<u32> {
    package.size().ok_or_else(|| missing_payload(package))
}

pub(crate) fn missing_payload(package: &Package) -> SimError {
    SimError::MissingPayload { package_id: package.id.clone() }
}
