//! Owns the rapier2d state: bodies, colliders and everything `PhysicsPipeline::step` needs.

use rapier2d::prelude::*;

use crate::modules::config::BoardConfig;
use crate::modules::geometry::{Obstacle, ObstacleKind, ObstacleShape};

// user_data layout: kind in the high 64 bits, ball creation id in the low 64
const KIND_SHIFT: u32 = 64;
const KIND_PEG: u128 = 1;
const KIND_FUNNEL_WALL: u128 = 2;
const KIND_FLOOR: u128 = 3;
const KIND_PARTITION: u128 = 4;
const KIND_BALL: u128 = 5;

/// Tag stored on every body so sweeps can tell balls from obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLabel {
    Obstacle(ObstacleKind),
    /// Creation order; smaller is older
    Ball(u64),
}

impl BodyLabel {
    pub fn to_user_data(self) -> u128 {
        let kind = match self {
            BodyLabel::Obstacle(ObstacleKind::Peg) => KIND_PEG,
            BodyLabel::Obstacle(ObstacleKind::FunnelWall) => KIND_FUNNEL_WALL,
            BodyLabel::Obstacle(ObstacleKind::Floor) => KIND_FLOOR,
            BodyLabel::Obstacle(ObstacleKind::Partition) => KIND_PARTITION,
            BodyLabel::Ball(_) => KIND_BALL,
        };
        let id = match self {
            BodyLabel::Ball(id) => id as u128,
            BodyLabel::Obstacle(_) => 0,
        };
        kind << KIND_SHIFT | id
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        let id = (data & u64::MAX as u128) as u64;
        match data >> KIND_SHIFT {
            KIND_PEG => Some(BodyLabel::Obstacle(ObstacleKind::Peg)),
            KIND_FUNNEL_WALL => Some(BodyLabel::Obstacle(ObstacleKind::FunnelWall)),
            KIND_FLOOR => Some(BodyLabel::Obstacle(ObstacleKind::Floor)),
            KIND_PARTITION => Some(BodyLabel::Obstacle(ObstacleKind::Partition)),
            KIND_BALL => Some(BodyLabel::Ball(id)),
            _ => None,
        }
    }

    pub fn ball_id(self) -> Option<u64> {
        match self {
            BodyLabel::Ball(id) => Some(id),
            BodyLabel::Obstacle(_) => None,
        }
    }
}

/// Everything needed to create one ball body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSpec {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// px/s
    pub linvel: (f32, f32),
    /// rad/s
    pub angvel: f32,
}

/// Read-only view of a ball used by the lifecycle sweeps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSnapshot {
    pub handle: RigidBodyHandle,
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub frozen: bool,
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    // Material values shared by every body
    restitution: f32,
    friction: f32,
    linear_damping: f32,
    ball_radius: f32,
}

impl PhysicsWorld {
    pub fn new(config: &BoardConfig) -> Self {
        // Positive y points down in screen coordinates
        let gravity = vector![0.0, config.gravity_engine()];
        let mut integration_params = IntegrationParameters::default();
        integration_params.dt *= config.time_scale;

        Self {
            gravity,
            integration_params,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            restitution: config.restitution,
            friction: config.friction,
            linear_damping: config.linear_damping(),
            ball_radius: config.ball_radius,
        }
    }

    /// Simulated seconds covered by one `step`
    pub fn dt(&self) -> f32 {
        self.integration_params.dt
    }

    pub fn gravity(&self) -> f32 {
        self.gravity.y
    }

    /// Insert a fixed body with one collider
    pub fn insert_obstacle(&mut self, obstacle: &Obstacle) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![obstacle.x, obstacle.y])
            .rotation(obstacle.rotation)
            .user_data(BodyLabel::Obstacle(obstacle.kind).to_user_data())
            .build();
        let builder = match obstacle.shape {
            ObstacleShape::Circle { radius } => ColliderBuilder::ball(radius),
            ObstacleShape::Rect { width, height } => ColliderBuilder::cuboid(width / 2.0, height / 2.0),
        };
        // Funnel walls are frictionless so balls slide into the throat
        let friction = if obstacle.kind == ObstacleKind::FunnelWall { 0.0 } else { self.friction };
        let collider = builder.restitution(self.restitution).friction(friction).build();

        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Insert a dynamic ball
    pub fn insert_ball(&mut self, spec: &BallSpec) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![spec.x, spec.y])
            .linvel(vector![spec.linvel.0, spec.linvel.1])
            .angvel(spec.angvel)
            .linear_damping(self.linear_damping)
            .ccd_enabled(true)
            .user_data(BodyLabel::Ball(spec.id).to_user_data())
            .build();
        let collider = ColliderBuilder::ball(self.ball_radius)
            .restitution(self.restitution)
            .friction(self.friction)
            .build();

        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Remove a body and its colliders. Returns false if it was already gone.
    pub fn remove(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Turn a ball into a fixed body. Velocities are cleared first so nothing
    /// carries over if the engine ever reads them.
    pub fn freeze(&mut self, handle: RigidBodyHandle) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        if body.is_fixed() {
            return false;
        }
        body.set_linvel(vector![0.0, 0.0], false);
        body.set_angvel(0.0, false);
        body.set_body_type(RigidBodyType::Fixed, false);
        true
    }

    /// Advance the simulation by one timestep
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    /// The moving ball under the point, nearest centre first. Frozen balls
    /// are never picked.
    pub fn ball_at(&self, x: f32, y: f32) -> Option<RigidBodyHandle> {
        let reach = self.ball_radius * self.ball_radius;
        self.balls()
            .into_iter()
            .filter(|ball| !ball.frozen)
            .map(|ball| (ball.handle, (ball.x - x).powi(2) + (ball.y - y).powi(2)))
            .filter(|(_, dist2)| *dist2 <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    /// Point a ball's velocity at `target`, closing `stiffness` of the gap per
    /// second. Returns false once the ball is gone or frozen.
    pub fn pull_toward(&mut self, handle: RigidBodyHandle, target: (f32, f32), stiffness: f32) -> bool {
        if self.label(handle).and_then(BodyLabel::ball_id).is_none() {
            return false;
        }
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        if body.is_fixed() {
            return false;
        }
        let pos = *body.translation();
        let offset = vector![target.0 - pos.x, target.1 - pos.y];
        body.set_linvel(offset * stiffness, true);
        true
    }

    pub fn label(&self, handle: RigidBodyHandle) -> Option<BodyLabel> {
        self.bodies.get(handle).and_then(|body| BodyLabel::from_user_data(body.user_data))
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Direct access for tests and tools that need to place bodies by hand
    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Every body tagged as a ball, in arena order
    pub fn balls(&self) -> Vec<BallSnapshot> {
        self.bodies
            .iter()
            .filter_map(|(handle, body)| {
                let id = BodyLabel::from_user_data(body.user_data)?.ball_id()?;
                let pos = body.translation();
                Some(BallSnapshot {
                    handle,
                    id,
                    x: pos.x,
                    y: pos.y,
                    speed: body.linvel().norm(),
                    frozen: body.is_fixed(),
                })
            })
            .collect()
    }

    pub fn obstacle_count(&self, kind: ObstacleKind) -> usize {
        self.bodies
            .iter()
            .filter(|(_, body)| BodyLabel::from_user_data(body.user_data) == Some(BodyLabel::Obstacle(kind)))
            .count()
    }

    /// Bodies with their colliders, for drawing
    pub fn iter(&self) -> impl Iterator<Item = (&RigidBody, &Collider)> {
        self.bodies.iter().flat_map(move |(_, body)| {
            body.colliders().iter().filter_map(move |handle| self.colliders.get(*handle).map(|c| (body, c)))
        })
    }
}
