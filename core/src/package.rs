//! Package entities: the mobile data carriers.

use crate::{
    payload::Payload,
    speed::SpeedModel,
    types::{EntityId, PlaceId, Position},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the single interoperability package.
pub const RELAY_PACKAGE_ID: &str = "InteroperabilityPackage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    OnHold,
    GoingToFog,
    GoingToCloud,
    GoingToEdge,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OnHold       => "ON_HOLD",
            Self::GoingToFog   => "GOING_TO_FOG",
            Self::GoingToCloud => "GOING_TO_CLOUD",
            Self::GoingToEdge  => "GOING_TO_EDGE",
        };
        f.write_str(s)
    }
}

/// Display marker for whatever renders the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Original,
    Reduced,
    Relay,
}

/// Relay-only routing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayState {
    /// Fog tier whose App1 cache the relay samples. Always a Fog tier.
    pub fog_target:       PlaceId,
    /// Next hop the relay is heading for; `None` while on hold.
    pub temp_destination: Option<PlaceId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Ordinary,
    Relay(RelayState),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id:             EntityId,
    pub role:           Role,
    pub position:       Position,
    /// House or Edge for ordinary packages, Edge for the relay.
    pub origin:         PlaceId,
    pub activity:       Activity,
    /// Meaningful only while travelling.
    pub destination:    Option<PlaceId>,
    pub visible:        bool,
    pub marker:         Marker,
    /// Set while the host drives this package by hand.
    pub manual_control: bool,
    payload:            Option<Payload>,
    size:               Option<u32>,
    speed:              u32,
}

impl Package {
    /// A hidden ordinary package on hold at `origin`.
    pub fn ordinary(
        id: impl Into<EntityId>,
        origin: PlaceId,
        position: Position,
        payload: Payload,
        speed_model: &SpeedModel,
    ) -> Self {
        let mut package = Self {
            id: id.into(),
            role: Role::Ordinary,
            position,
            origin,
            activity: Activity::OnHold,
            destination: None,
            visible: false,
            marker: Marker::Original,
            manual_control: false,
            payload: None,
            size: None,
            speed: speed_model.base_speed(),
        };
        package.set_payload(payload, speed_model);
        package
    }

    /// The relay, before its first re-arm picks real places.
    pub fn relay(origin: PlaceId, position: Position, fog_target: PlaceId, speed_model: &SpeedModel) -> Self {
        Self {
            id: RELAY_PACKAGE_ID.into(),
            role: Role::Relay(RelayState { fog_target, temp_destination: None }),
            position,
            origin,
            activity: Activity::OnHold,
            destination: None,
            visible: false,
            marker: Marker::Relay,
            manual_control: false,
            payload: None,
            size: None,
            speed: speed_model.base_speed(),
        }
    }

    pub fn is_relay(&self) -> bool {
        matches!(self.role, Role::Relay(_))
    }

    pub fn relay_state(&self) -> Option<RelayState> {
        match self.role {
            Role::Relay(state) => Some(state),
            Role::Ordinary => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn size(&self) -> Option<u32> {
        self.size
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Replace the payload. Size and speed always follow it.
    pub fn set_payload(&mut self, payload: Payload, speed_model: &SpeedModel) {
        let size = payload.size_bytes();
        self.marker = match (&self.role, payload.is_compacted()) {
            (Role::Relay(_), _) => Marker::Relay,
            (Role::Ordinary, true) => Marker::Reduced,
            (Role::Ordinary, false) => Marker::Original,
        };
        self.size = Some(size);
        self.speed = speed_model.speed_for(size);
        self.payload = Some(payload);
    }

    /// Drop the payload; an empty package moves at base speed.
    pub fn clear_payload(&mut self, speed_model: &SpeedModel) {
        self.payload = None;
        self.size = None;
        self.speed = speed_model.base_speed();
    }

    pub fn travel_to(&mut self, destination: PlaceId, activity: Activity) {
        self.destination = Some(destination);
        self.activity = activity;
    }

    /// Park hidden at `position` and wait.
    pub fn hold_at(&mut self, position: Position) {
        self.position = position;
        self.destination = None;
        self.visible = false;
        self.activity = Activity::OnHold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::CompactSet;
    use crate::taxonomy::LabelSet;

    fn expanded() -> Payload {
        Payload::Expanded(LabelSet::new("Lyme disease", "BorreliaBurgdorferi", "Fever", "TickBite"))
    }

    #[test]
    fn speed_tracks_payload_size() {
        let model = SpeedModel::default();
        let mut package = Package::ordinary("Package0", PlaceId(0), Position::new(0, 0), expanded(), &model);
        let size = package.size().unwrap();
        assert_eq!(size, expanded().size_bytes());
        assert_eq!(package.speed(), model.speed_for(size));
        assert_eq!(package.marker, Marker::Original);

        let compact = Payload::Compacted(CompactSet { disease: 111729, driver: 586195, symptom: 60000613, transmission: 70000011 });
        package.set_payload(compact, &model);
        assert_eq!(package.size(), Some(16));
        assert_eq!(package.speed(), model.base_speed());
        assert_eq!(package.marker, Marker::Reduced);
    }

    #[test]
    fn hold_clears_destination_and_hides() {
        let model = SpeedModel::default();
        let mut package = Package::ordinary("Package0", PlaceId(0), Position::new(0, 0), expanded(), &model);
        package.visible = true;
        package.travel_to(PlaceId(3), Activity::GoingToFog);
        package.hold_at(Position::new(4, 4));
        assert_eq!(package.activity, Activity::OnHold);
        assert_eq!(package.destination, None);
        assert!(!package.visible);
        assert_eq!(package.position, Position::new(4, 4));
    }

    #[test]
    fn relay_keeps_its_marker() {
        let model = SpeedModel::default();
        let mut relay = Package::relay(PlaceId(1), Position::new(0, 0), PlaceId(2), &model);
        relay.set_payload(expanded(), &model);
        assert_eq!(relay.marker, Marker::Relay);
        relay.clear_payload(&model);
        assert_eq!(relay.size(), None);
        assert_eq!(relay.speed(), model.base_speed());
    }
}
