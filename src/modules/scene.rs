//! Registers the static board with the physics world, once, at startup.

use crate::modules::config::BoardConfig;
use crate::modules::geometry::{self, ObstacleKind};
use crate::modules::world::PhysicsWorld;

/// How many obstacles of each kind went into the world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneSummary {
    pub pegs: usize,
    pub funnel_walls: usize,
    pub floors: usize,
    pub partitions: usize,
}

impl SceneSummary {
    pub fn total(&self) -> usize {
        self.pegs + self.funnel_walls + self.floors + self.partitions
    }
}

pub fn build(world: &mut PhysicsWorld, config: &BoardConfig) -> SceneSummary {
    let mut summary = SceneSummary::default();
    for obstacle in geometry::board(config) {
        world.insert_obstacle(&obstacle);
        match obstacle.kind {
            ObstacleKind::Peg => summary.pegs += 1,
            ObstacleKind::FunnelWall => summary.funnel_walls += 1,
            ObstacleKind::Floor => summary.floors += 1,
            ObstacleKind::Partition => summary.partitions += 1,
        }
    }
    log::info!(
        "board built: {} pegs, {} funnel walls, {} floor, {} partitions",
        summary.pegs,
        summary.funnel_walls,
        summary.floors,
        summary.partitions
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registers_every_obstacle_as_fixed() {
        let config = BoardConfig::classic();
        let mut world = PhysicsWorld::new(&config);
        let summary = build(&mut world, &config);
        assert_eq!(summary, SceneSummary { pegs: 105, funnel_walls: 2, floors: 1, partitions: 16 });
        assert_eq!(world.body_count(), summary.total());
        assert!(world.iter().all(|(body, _)| body.is_fixed()));
    }

    #[test]
    fn test_obstacles_do_not_move_when_stepped() {
        let config = BoardConfig::dense();
        let mut world = PhysicsWorld::new(&config);
        build(&mut world, &config);
        let before: Vec<(f32, f32, f32)> = world
            .iter()
            .map(|(b, _)| (b.translation().x, b.translation().y, b.rotation().angle()))
            .collect();
        for _ in 0..10 {
            world.step();
        }
        let after: Vec<(f32, f32, f32)> = world
            .iter()
            .map(|(b, _)| (b.translation().x, b.translation().y, b.rotation().angle()))
            .collect();
        assert_eq!(before, after);
    }
}
