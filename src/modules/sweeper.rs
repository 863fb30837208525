//! Lifecycle sweeps over the balls in the world. Obstacles are never touched.
//!
//! Resting balls still cost solver time, so balls that have come to rest in
//! the lanes are frozen into fixed bodies. Freezing is one-way.

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
use rayon::prelude::*;

use rapier2d::prelude::RigidBodyHandle;

use crate::modules::world::{BallSnapshot, PhysicsWorld};

/// Thresholds for the settle scan, in engine units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleRule {
    /// y beyond which a ball may freeze (+y down)
    pub line: f32,
    /// px/s
    pub max_speed: f32,
}

impl SettleRule {
    #[inline]
    pub fn is_settled(&self, ball: &BallSnapshot) -> bool {
        !ball.frozen && ball.y > self.line && ball.speed < self.max_speed
    }
}

fn settled_handles(balls: &[BallSnapshot], rule: SettleRule) -> Vec<RigidBodyHandle> {
    #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
    {
        balls.par_iter().filter(|ball| rule.is_settled(ball)).map(|ball| ball.handle).collect()
    }

    #[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
    {
        balls.iter().filter(|ball| rule.is_settled(ball)).map(|ball| ball.handle).collect()
    }
}

/// Freeze every ball that is past the settle line and slower than the
/// threshold. Returns how many were frozen.
pub fn settle_scan(world: &mut PhysicsWorld, rule: SettleRule) -> usize {
    let balls = world.balls();
    if balls.is_empty() {
        return 0;
    }
    let frozen = settled_handles(&balls, rule)
        .into_iter()
        .filter(|handle| world.freeze(*handle))
        .count();
    if frozen > 0 {
        log::debug!("settle scan froze {frozen} of {} balls", balls.len());
    }
    frozen
}

/// Remove the oldest ball when more than `max_balls` are live. At most one
/// ball goes per call, so an overshoot drains over several ticks.
pub fn evict_oldest(world: &mut PhysicsWorld, max_balls: usize) -> Option<u64> {
    let balls = world.balls();
    if balls.len() <= max_balls {
        return None;
    }
    let oldest = balls.iter().min_by_key(|ball| ball.id)?;
    world.remove(oldest.handle);
    log::debug!("evicted ball {} ({} live, cap {max_balls})", oldest.id, balls.len() - 1);
    Some(oldest.id)
}
