//! Galton board on rapier2d.
//!
//! The board (pegs, funnel, floor, lanes) is laid out from a [`BoardConfig`],
//! balls are dropped with a skewed random kick, and two timed sweeps keep the
//! world small: resting balls are frozen, and the oldest ball is evicted once
//! the live count passes the cap.

pub mod modules;

pub use modules::config::{BoardConfig, PegSpacing, Preset};
pub use modules::simulation::{Command, Simulation, SimulationStats};
