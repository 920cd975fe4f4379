//! Dispatch subsystem: runs each package's controller once per tick.
//!
//! Packages are stepped in creation order. The relay goes through the
//! relay controller, everything else through the ordinary lifecycle.
//! Packages under manual control are skipped entirely.
//!
//! Execution: every tick, after motion.

use crate::{
    error::SimResult,
    event::SimEvent,
    package::Role,
    package_controller::PackageController,
    relay_controller::RelayController,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::Tick,
    world::{TierRegistry, World},
};

/// What a controller may touch while stepping one package.
pub struct StepContext<'a> {
    pub tick:   Tick,
    pub tiers:  &'a mut TierRegistry,
    pub rng:    &'a mut SubsystemRng,
    pub events: &'a mut Vec<SimEvent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub ticks:          u64,
    pub steps:          u64,
    pub skipped_manual: u64,
}

pub struct DispatchSubsystem {
    packages: PackageController,
    relay:    RelayController,
    stats:    DispatchStats,
}

impl DispatchSubsystem {
    pub fn new(packages: PackageController, relay: RelayController) -> Self {
        Self { packages, relay, stats: DispatchStats::default() }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}

impl SimSubsystem for DispatchSubsystem {
    fn name(&self) -> &'static str { "dispatch" }

    fn update(
        &mut self,
        tick: Tick,
        world: &mut World,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut out = Vec::new();
        let World { tiers, packages } = world;
        self.stats.ticks += 1;

        for package in packages.iter_mut() {
            if package.manual_control {
                self.stats.skipped_manual += 1;
                log::trace!("tick={tick} dispatch: {} under manual control", package.id);
                continue;
            }
            let mut ctx = StepContext { tick, tiers: &mut *tiers, rng: &mut *rng, events: &mut out };
            match package.role {
                Role::Ordinary => self.packages.step(package, &mut ctx)?,
                Role::Relay(_) => self.relay.step(package, &mut ctx)?,
            }
            self.stats.steps += 1;
        }

        Ok(out)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
