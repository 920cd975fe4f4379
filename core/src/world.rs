//! Tier registry and world state.
//!
//! Stand-in for the spatial engine: places with typed per-tier counters,
//! kind/nearest/random queries, and the package population.

use crate::{
    error::{SimError, SimResult},
    package::Package,
    payload::Payload,
    rng::SubsystemRng,
    types::{App, PlaceId, Position, TierKind},
};
use serde::{Deserialize, Serialize};

/// Traffic one application delivered to a Fog or Cloud tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTally {
    pub packets:      u64,
    pub bytes:        u64,
    /// Always `None` at Cloud tiers.
    pub last_payload: Option<Payload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCounters {
    pub app1: AppTally,
    pub app2: AppTally,
}

impl AppCounters {
    pub fn tally(&self, app: App) -> &AppTally {
        match app {
            App::App1 => &self.app1,
            App::App2 => &self.app2,
        }
    }

    fn tally_mut(&mut self, app: App) -> &mut AppTally {
        match app {
            App::App1 => &mut self.app1,
            App::App2 => &mut self.app2,
        }
    }

    fn record(&mut self, app: App, size: u32, payload: Option<Payload>) {
        let tally = self.tally_mut(app);
        tally.packets += 1;
        tally.bytes += size as u64;
        if payload.is_some() {
            tally.last_payload = payload;
        }
    }
}

/// Interoperability results published at an Edge tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCache {
    pub interop:         Option<Payload>,
    pub reduced_interop: Option<Payload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierState {
    House,
    Edge(EdgeCache),
    Fog(AppCounters),
    Cloud(AppCounters),
}

impl TierState {
    fn for_kind(kind: TierKind) -> Self {
        match kind {
            TierKind::House => Self::House,
            TierKind::Edge  => Self::Edge(EdgeCache::default()),
            TierKind::Fog   => Self::Fog(AppCounters::default()),
            TierKind::Cloud => Self::Cloud(AppCounters::default()),
        }
    }

    pub fn kind(&self) -> TierKind {
        match self {
            Self::House    => TierKind::House,
            Self::Edge(_)  => TierKind::Edge,
            Self::Fog(_)   => TierKind::Fog,
            Self::Cloud(_) => TierKind::Cloud,
        }
    }
}

/// A place as declared in the world layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSpec {
    pub name: String,
    pub kind: TierKind,
    pub x:    i32,
    pub y:    i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id:       PlaceId,
    pub name:     String,
    pub position: Position,
    pub state:    TierState,
}

impl Place {
    pub fn kind(&self) -> TierKind {
        self.state.kind()
    }

    fn mismatch(&self, expected: TierKind) -> SimError {
        SimError::TierMismatch {
            place: self.name.clone(),
            expected,
            actual: self.kind(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TierRegistry {
    places: Vec<Place>,
}

impl TierRegistry {
    pub fn from_specs(specs: &[PlaceSpec]) -> Self {
        let places = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| Place {
                id:       PlaceId(i),
                name:     spec.name.clone(),
                position: Position::new(spec.x, spec.y),
                state:    TierState::for_kind(spec.kind),
            })
            .collect();
        Self { places }
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn place(&self, id: PlaceId) -> SimResult<&Place> {
        self.places.get(id.0).ok_or(SimError::UnknownPlace { place: id })
    }

    fn place_mut(&mut self, id: PlaceId) -> SimResult<&mut Place> {
        self.places.get_mut(id.0).ok_or(SimError::UnknownPlace { place: id })
    }

    pub fn has_kind(&self, kind: TierKind) -> bool {
        self.places.iter().any(|p| p.kind() == kind)
    }

    /// All places of a kind, in registration order.
    pub fn places_of_type(&self, kind: TierKind) -> SimResult<Vec<PlaceId>> {
        let ids: Vec<PlaceId> = self
            .places
            .iter()
            .filter(|p| p.kind() == kind)
            .map(|p| p.id)
            .collect();
        if ids.is_empty() {
            return Err(SimError::UnknownTierType { kind });
        }
        Ok(ids)
    }

    pub fn random_place_of_type(&self, kind: TierKind, rng: &mut SubsystemRng) -> SimResult<PlaceId> {
        let candidates: Vec<PlaceId> = self
            .places
            .iter()
            .filter(|p| p.kind() == kind)
            .map(|p| p.id)
            .collect();
        if candidates.is_empty() {
            return Err(SimError::NoSuchPlace { kind });
        }
        Ok(candidates[rng.pick_index(candidates.len())])
    }

    /// Closest place of a kind. Ties go to the lowest id.
    pub fn nearest_place_of_type(&self, kind: TierKind, position: Position) -> SimResult<PlaceId> {
        self.places
            .iter()
            .filter(|p| p.kind() == kind)
            .min_by_key(|p| (p.position.distance_sq(&position), p.id))
            .map(|p| p.id)
            .ok_or(SimError::UnknownTierType { kind })
    }

    /// The cloud sink: the first registered Cloud tier.
    pub fn cloud(&self) -> SimResult<PlaceId> {
        self.places
            .iter()
            .find(|p| p.kind() == TierKind::Cloud)
            .map(|p| p.id)
            .ok_or(SimError::UnknownTierType { kind: TierKind::Cloud })
    }

    pub fn is_at_destination(&self, package: &Package) -> SimResult<bool> {
        match package.destination {
            Some(dest) => Ok(self.place(dest)?.position == package.position),
            None => Ok(false),
        }
    }

    /// Count a delivery at a Fog or Cloud tier. Only Fog tiers keep the
    /// payload; `payload` is ignored at the Cloud.
    pub fn record_delivery(
        &mut self,
        id: PlaceId,
        app: App,
        size: u32,
        payload: Option<Payload>,
    ) -> SimResult<()> {
        let place = self.place_mut(id)?;
        match &mut place.state {
            TierState::Fog(counters) => counters.record(app, size, payload),
            TierState::Cloud(counters) => counters.record(app, size, None),
            _ => return Err(place.mismatch(TierKind::Fog)),
        }
        Ok(())
    }

    pub fn counters(&self, id: PlaceId) -> SimResult<&AppCounters> {
        let place = self.place(id)?;
        match &place.state {
            TierState::Fog(counters) | TierState::Cloud(counters) => Ok(counters),
            _ => Err(place.mismatch(TierKind::Fog)),
        }
    }

    /// Most recent payload an application delivered to a Fog tier.
    pub fn last_payload(&self, fog: PlaceId, app: App) -> SimResult<Option<&Payload>> {
        let place = self.place(fog)?;
        match &place.state {
            TierState::Fog(counters) => Ok(counters.tally(app).last_payload.as_ref()),
            _ => Err(place.mismatch(TierKind::Fog)),
        }
    }

    pub fn store_interop(&mut self, edge: PlaceId, reduced: Payload, expanded: Payload) -> SimResult<()> {
        let place = self.place_mut(edge)?;
        match &mut place.state {
            TierState::Edge(cache) => {
                cache.reduced_interop = Some(reduced);
                cache.interop = Some(expanded);
                Ok(())
            }
            _ => Err(place.mismatch(TierKind::Edge)),
        }
    }

    pub fn edge_cache(&self, edge: PlaceId) -> SimResult<&EdgeCache> {
        let place = self.place(edge)?;
        match &place.state {
            TierState::Edge(cache) => Ok(cache),
            _ => Err(place.mismatch(TierKind::Edge)),
        }
    }

    /// Set a Fog tier's last payload without a delivery.
    #[cfg(test)]
    pub(crate) fn seed_fog_payload(&mut self, fog: PlaceId, app: App, payload: Payload) -> SimResult<()> {
        let place = self.place_mut(fog)?;
        match &mut place.state {
            TierState::Fog(counters) => {
                counters.tally_mut(app).last_payload = Some(payload);
                Ok(())
            }
            _ => Err(place.mismatch(TierKind::Fog)),
        }
    }
}

/// Everything a tick mutates.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub tiers:    TierRegistry,
    pub packages: Vec<Package>,
}

impl World {
    pub fn package(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub fn package_mut(&mut self, id: &str) -> Option<&mut Package> {
        self.packages.iter_mut().find(|p| p.id == id)
    }

    pub fn relay(&self) -> Option<&Package> {
        self.packages.iter().find(|p| p.is_relay())
    }

    pub fn set_manual_control(&mut self, id: &str, on: bool) -> SimResult<()> {
        let package = self
            .package_mut(id)
            .ok_or_else(|| SimError::PackageNotFound { package_id: id.to_string() })?;
        package.manual_control = on;
        Ok(())
    }
}
