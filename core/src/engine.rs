//! The simulation engine — tick host for the edge/fog/cloud network.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Motion subsystem    (packages advance toward destinations)
//!   2. Dispatch subsystem  (controllers react to arrivals)
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - All randomness flows through the RngBank.
//!   - Every event is recorded in the event log.

use crate::{
    clock::SimClock,
    codec::CategoryCodec,
    command::PlayerCommand,
    config::SimConfig,
    dispatch::{DispatchStats, DispatchSubsystem},
    error::SimResult,
    event::{EventLogEntry, SimEvent},
    motion::MotionSubsystem,
    package_controller::PackageController,
    population,
    relay_controller::RelayController,
    rng::{resolve_seed, RngBank, SubsystemSlot},
    snapshot::WorldSnapshot,
    speed::SpeedModel,
    subsystem::SimSubsystem,
    taxonomy::{Taxonomy, TaxonomyCatalog},
    types::{RunId, Tick},
    world::{TierRegistry, World},
};
use std::sync::Arc;

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    pub world:    World,
    seed:         u64,
    subsystems:   Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    event_log:    Vec<EventLogEntry>,
    initialized:  bool,
}

impl SimEngine {
    /// An engine with an empty world and no subsystems.
    pub fn new(run_id: RunId, seed: u64) -> Self {
        Self {
            clock:       SimClock::new(run_id.clone()),
            rng_bank:    RngBank::new(seed),
            world:       World::default(),
            seed,
            subsystems:  Vec::new(),
            event_log:   Vec::new(),
            initialized: false,
            run_id,
        }
    }

    /// Build a fully wired engine: world populated, all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(run_id: RunId, config: &SimConfig, taxonomy: Arc<dyn Taxonomy>) -> SimResult<Self> {
        let scenario = &config.scenario;
        let seed = resolve_seed(scenario.seed);
        let mut engine = SimEngine::new(run_id, seed);

        let speed = SpeedModel::new(scenario.base_speed);
        let tiers = TierRegistry::from_specs(&config.layout);
        let mut rng = engine.rng_bank.for_subsystem(SubsystemSlot::Population);
        let packages = population::populate(scenario, &tiers, taxonomy.as_ref(), &speed, &mut rng)?;
        engine.world = World { tiers, packages };

        let codec = CategoryCodec::new(taxonomy);
        let packages = PackageController::new(codec.clone(), speed, scenario.compaction);
        let relay = RelayController::new(codec, speed);

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(SubsystemSlot::Motion, Box::new(MotionSubsystem::new()));
        engine.register(SubsystemSlot::Dispatch, Box::new(DispatchSubsystem::new(packages, relay)));

        log::info!(
            "engine built: run={} seed={seed} places={} packages={}",
            engine.run_id,
            engine.world.tiers.places().len(),
            engine.world.packages.len(),
        );
        Ok(engine)
    }

    /// Engine over the built-in test topology and taxonomy.
    pub fn build_test(run_id: impl Into<RunId>, seed: u64) -> SimResult<Self> {
        let mut config = SimConfig::default_test();
        config.scenario.seed = Some(seed);
        Self::build(run_id.into(), &config, Arc::new(TaxonomyCatalog::default_test()))
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let current_tick = self.clock.advance();
        let mut tick_events: Vec<SimEvent> = vec![
            SimEvent::TickStarted { tick: current_tick }
        ];

        // Each subsystem sees all events emitted so far this tick.
        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, current_tick);
            let new_events = subsystem.update(current_tick, &mut self.world, &tick_events, &mut rng)?;

            for event in &new_events {
                self.event_log.push(EventLogEntry {
                    run_id:     self.run_id.clone(),
                    tick:       current_tick,
                    subsystem:  subsystem.name().to_string(),
                    event_type: event.kind().to_string(),
                    payload:    serde_json::to_string(event)?,
                });
            }

            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        Ok(tick_events)
    }

    /// Run n ticks in a loop. Returns every event emitted, in order.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        // Emit RunInitialized once so seed differences are observable.
        if !self.initialized {
            let init_event = SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed:   self.seed,
            };
            self.log_engine_event(&init_event)?;
            events.push(init_event);
            self.initialized = true;
        }
        self.clock.resume();
        for _ in 0..n {
            match self.tick() {
                Ok(tick_events) => events.extend(tick_events),
                Err(e) => {
                    self.clock.pause();
                    return Err(e);
                }
            }
        }
        self.clock.pause();
        Ok(events)
    }

    /// Apply a host command between ticks.
    pub fn apply_command(&mut self, command: &PlayerCommand) -> SimResult<SimEvent> {
        let on = matches!(command, PlayerCommand::TakeControl { .. });
        self.world.set_manual_control(command.package_id(), on)?;

        let event = SimEvent::CommandApplied {
            tick:         self.clock.current_tick,
            command_type: command.name().to_string(),
            package_id:   command.package_id().to_string(),
        };
        self.log_engine_event(&event)?;
        log::info!("tick={} command: {} {}", self.clock.current_tick, command.name(), command.package_id());
        Ok(event)
    }

    /// Logged events for one tick. Used by the determinism test and tooling.
    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.event_log.iter().filter(|e| e.tick == tick).collect()
    }

    pub fn event_log(&self) -> &[EventLogEntry] {
        &self.event_log
    }

    pub fn snapshot(&self) -> SimResult<WorldSnapshot> {
        WorldSnapshot::capture(&self.run_id, self.clock.current_tick, &self.world)
    }

    /// Query the dispatcher's counters.
    /// Used by sim-runner to print end-of-run summaries.
    pub fn dispatch_stats(&self) -> Option<DispatchStats> {
        self.subsystems.iter().find_map(|(_, sub)| {
            sub.as_any()
                .downcast_ref::<DispatchSubsystem>()
                .map(DispatchSubsystem::stats)
        })
    }

    fn log_engine_event(&mut self, event: &SimEvent) -> SimResult<()> {
        self.event_log.push(EventLogEntry {
            run_id:     self.run_id.clone(),
            tick:       self.clock.current_tick,
            subsystem:  "engine".to_string(),
            event_type: event.kind().to_string(),
            payload:    serde_json::to_string(event)?,
        });
        Ok(())
    }
}
