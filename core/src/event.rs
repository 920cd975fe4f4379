//! The event stream — everything observable that happens in a tick.
//!
//! RULE: Controllers report every state transition as an event.
//! Hosts read events; they never poke at controller internals.

use crate::types::{App, EntityId, RunId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed:   u64,
    },

    // ── Ordinary packages ──────────────────────────
    PackageDispatched {
        tick:       Tick,
        package_id: EntityId,
        origin:     String,
        fog:        String,
        size:       u32,
        compacted:  bool,
    },
    FogDelivery {
        tick:       Tick,
        package_id: EntityId,
        fog:        String,
        app:        App,
        size:       u32,
    },
    CloudDelivery {
        tick:       Tick,
        package_id: EntityId,
        cloud:      String,
        app:        App,
        size:       u32,
    },
    PackageRecycled {
        tick:       Tick,
        package_id: EntityId,
        new_origin: String,
        size:       u32,
    },

    // ── Interoperability relay ─────────────────────
    RelayRearmed {
        tick:       Tick,
        origin:     String,
        fog_target: String,
    },
    RelayDeparted {
        tick: Tick,
        fog:  String,
    },
    RelayPickup {
        tick: Tick,
        fog:  String,
    },
    RelayCloudHop {
        tick:  Tick,
        cloud: String,
    },
    RelayDelivered {
        tick:          Tick,
        edge:          String,
        reduced_size:  u32,
        expanded_size: u32,
    },

    // ── Host commands ──────────────────────────────
    CommandApplied {
        tick:         Tick,
        command_type: String,
        package_id:   EntityId,
    },
}

impl SimEvent {
    /// Stable string name of the variant, for summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TickStarted { .. }       => "tick_started",
            Self::TickCompleted { .. }     => "tick_completed",
            Self::RunInitialized { .. }    => "run_initialized",
            Self::PackageDispatched { .. } => "package_dispatched",
            Self::FogDelivery { .. }       => "fog_delivery",
            Self::CloudDelivery { .. }     => "cloud_delivery",
            Self::PackageRecycled { .. }   => "package_recycled",
            Self::RelayRearmed { .. }      => "relay_rearmed",
            Self::RelayDeparted { .. }     => "relay_departed",
            Self::RelayPickup { .. }       => "relay_pickup",
            Self::RelayCloudHop { .. }     => "relay_cloud_hop",
            Self::RelayDelivered { .. }    => "relay_delivered",
            Self::CommandApplied { .. }    => "command_applied",
        }
    }
}

/// One entry of the engine's in-memory event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub run_id:     RunId,
    pub tick:       Tick,
    pub subsystem:  String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}
