//! Ball creation. Start velocities come from a skewed draw that clusters near
//! zero with rare large values, which is what gives the histogram its bell.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rapier2d::prelude::RigidBodyHandle;

use crate::modules::config::{BoardConfig, REFERENCE_RATE};
use crate::modules::world::{BallSpec, PhysicsWorld};

/// Horizontal launch speed per reference frame at full skew
pub const LAUNCH_SCALE: f32 = 0.3;
/// Spin is the skewed draw divided by this
pub const SPIN_DIVISOR: f32 = 8.0;

/// `sin(2πu)³` for a uniform `u` in `[0, 1)`. Bounded in `[-1, 1]`.
#[inline]
pub fn skew(u: f32) -> f32 {
    (2.0 * PI * u).sin().powi(3)
}

/// Hands out balls in creation order
pub struct BallSpawner {
    rng: Pcg32,
    next_id: u64,
}

impl BallSpawner {
    pub fn new(seed: u64) -> Self {
        Self { rng: Pcg32::seed_from_u64(seed), next_id: 0 }
    }

    /// Id the next ball will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn skewed(&mut self) -> f32 {
        skew(self.rng.random::<f32>())
    }

    /// Drop point for ball `index` of a batch of `batch` balls: jittered
    /// around `x_start`, stacked upward one radius per index.
    pub fn default_position(&mut self, config: &BoardConfig, index: u32, batch: u32) -> (f32, f32) {
        let x = config.x_start + self.skewed() * batch as f32;
        let y = config.y_start - 300.0 - index as f32 * config.ball_radius;
        (x, y)
    }

    /// Build the next ball. Only horizontal and angular velocity are set.
    pub fn next_ball(&mut self, x: f32, y: f32) -> BallSpec {
        let vx = LAUNCH_SCALE * self.skewed();
        let spin = self.skewed() / SPIN_DIVISOR;
        let id = self.next_id;
        self.next_id += 1;
        BallSpec {
            id,
            x,
            y,
            linvel: (vx * REFERENCE_RATE, 0.0),
            angvel: spin * REFERENCE_RATE,
        }
    }

    /// Spawn one ball at `at`, or at the default drop point when `None`.
    /// Returns `None` when the configured radius leaves nothing to spawn.
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        config: &BoardConfig,
        at: Option<(f32, f32)>,
    ) -> Option<RigidBodyHandle> {
        if config.ball_radius <= 0.0 {
            return None;
        }
        let (x, y) = match at {
            Some(point) => point,
            None => self.default_position(config, 0, 1),
        };
        let spec = self.next_ball(x, y);
        Some(world.insert_ball(&spec))
    }

    /// Spawn `count` balls in a loose vertical column above the funnel
    pub fn spawn_batch(&mut self, world: &mut PhysicsWorld, config: &BoardConfig, count: u32) -> Vec<RigidBodyHandle> {
        if config.ball_radius <= 0.0 {
            return Vec::new();
        }
        let mut handles = Vec::with_capacity(count as usize);
        for i in 0..count {
            let (x, y) = self.default_position(config, i, count);
            let spec = self.next_ball(x, y);
            handles.push(world.insert_ball(&spec));
        }
        log::debug!("spawned batch of {count} balls");
        handles
    }
}
