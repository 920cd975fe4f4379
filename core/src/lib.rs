//! Edge/fog/cloud package-routing simulation.

pub mod clock;
pub mod codec;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod motion;
pub mod package;
pub mod package_controller;
pub mod payload;
pub mod population;
pub mod relay_controller;
pub mod rng;
pub mod snapshot;
pub mod speed;
pub mod subsystem;
pub mod taxonomy;
pub mod types;
pub mod world;
