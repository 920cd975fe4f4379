//! Motion subsystem: moves packages toward their destinations.
//!
//! A package with a destination advances up to `speed` grid cells per tick
//! and stops on the destination cell. Packages without a destination or
//! under manual control stay put.
//!
//! Execution: every tick, before dispatch.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::Tick,
    world::World,
};

#[derive(Debug, Default)]
pub struct MotionSubsystem {
    cells_moved: u64,
}

impl MotionSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total grid cells covered by all packages so far.
    pub fn cells_moved(&self) -> u64 {
        self.cells_moved
    }
}

impl SimSubsystem for MotionSubsystem {
    fn name(&self) -> &'static str { "motion" }

    fn update(
        &mut self,
        _tick: Tick,
        world: &mut World,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let World { tiers, packages } = world;

        for package in packages.iter_mut().filter(|p| !p.manual_control) {
            let Some(dest) = package.destination else { continue };
            let target = tiers.place(dest)?.position;
            for _ in 0..package.speed() {
                if package.position == target {
                    break;
                }
                package.position = package.position.step_toward(&target);
                self.cells_moved += 1;
            }
        }

        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
