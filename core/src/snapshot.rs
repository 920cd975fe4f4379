//! Snapshot serialization — observable world state as JSON.
//!
//! Hosts capture a snapshot between ticks for summaries and IPC
//! `get_state` replies. Snapshots are read-only views; nothing is
//! restored from them.

use crate::{
    error::SimResult,
    package::{Activity, Marker, Package},
    types::{EntityId, Position, RunId, Tick},
    world::{Place, World},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageReport {
    pub id:             EntityId,
    pub relay:          bool,
    pub activity:       Activity,
    pub visible:        bool,
    pub marker:         Marker,
    pub manual_control: bool,
    pub position:       Position,
    pub origin:         String,
    pub destination:    Option<String>,
    pub size:           Option<u32>,
    pub speed:          u32,
    /// Wire text of the carried payload.
    pub payload:        Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub run_id:   RunId,
    pub tick:     Tick,
    pub places:   Vec<Place>,
    pub packages: Vec<PackageReport>,
}

impl WorldSnapshot {
    pub fn capture(run_id: &RunId, tick: Tick, world: &World) -> SimResult<Self> {
        let packages = world
            .packages
            .iter()
            .map(|p| report(p, world))
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self {
            run_id: run_id.clone(),
            tick,
            places: world.tiers.places().to_vec(),
            packages,
        })
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn report(package: &Package, world: &World) -> SimResult<PackageReport> {
    let destination = match package.destination {
        Some(id) => Some(world.tiers.place(id)?.name.clone()),
        None => None,
    };
    Ok(PackageReport {
        id:             package.id.clone(),
        relay:          package.is_relay(),
        activity:       package.activity,
        visible:        package.visible,
        marker:         package.marker,
        manual_control: package.manual_control,
        position:       package.position,
        origin:         world.tiers.place(package.origin)?.name.clone(),
        destination,
        size:           package.size(),
        speed:          package.speed(),
        payload:        package.payload().map(ToString::to_string),
    })
}
