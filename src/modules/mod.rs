pub mod config;
pub mod geometry;
pub mod logging;
#[cfg(feature = "scale")]
pub mod render;
#[cfg(feature = "scale")]
pub mod scale;
pub mod scene;
pub mod scheduler;
pub mod simulation;
pub mod spawner;
pub mod sweeper;
pub mod world;
