//! The simulation object: owns the physics world, the spawner and the
//! housekeeping timers. Input and timers only reach the world through
//! [`Simulation::update`], so all mutation happens on one timeline.

use std::collections::VecDeque;

use rapier2d::prelude::RigidBodyHandle;

use crate::modules::config::{BoardConfig, REFERENCE_RATE};
use crate::modules::scene::{self, SceneSummary};
use crate::modules::scheduler::{Scheduler, Task, TaskId};
use crate::modules::spawner::BallSpawner;
use crate::modules::sweeper::{self, SettleRule};
use crate::modules::world::PhysicsWorld;

/// Maximum physics steps per frame to prevent spiral of death
pub const MAX_SUBSTEPS: u32 = 8;

/// Share of the pointer offset a dragged ball closes per reference frame
pub const DRAG_STIFFNESS: f32 = 0.2;

/// Requests queued from outside the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `None` drops at the default point above the funnel
    SpawnBall { at: Option<(f32, f32)> },
    /// Pick up the moving ball under the pointer, if any
    Grab { x: f32, y: f32 },
    /// Move the pointer while holding a ball
    DragTo { x: f32, y: f32 },
    Release,
}

/// A ball held by the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    handle: RigidBodyHandle,
    target: (f32, f32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationStats {
    pub dynamic_balls: usize,
    pub frozen_balls: usize,
    pub obstacles: usize,
    /// Seconds of wall clock fed to `update`
    pub elapsed: f64,
}

impl SimulationStats {
    pub fn balls(&self) -> usize {
        self.dynamic_balls + self.frozen_balls
    }
}

pub struct Simulation {
    config: BoardConfig,
    world: PhysicsWorld,
    scene: SceneSummary,
    spawner: BallSpawner,
    scheduler: Scheduler,
    commands: VecDeque<Command>,
    drag: Option<Drag>,
    timers: Vec<TaskId>,
    batch_spawned: bool,
    accumulator: f32,
}

impl Simulation {
    /// Build the world and register the board. Balls come with `start`.
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let mut world = PhysicsWorld::new(&config);
        let scene = scene::build(&mut world, &config);
        Self {
            config,
            world,
            scene,
            spawner: BallSpawner::new(seed),
            scheduler: Scheduler::new(),
            commands: VecDeque::new(),
            drag: None,
            timers: Vec::new(),
            batch_spawned: false,
            accumulator: 0.0,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Ball currently held by the pointer
    pub fn dragged(&self) -> Option<RigidBodyHandle> {
        self.drag.map(|drag| drag.handle)
    }

    pub fn is_running(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn settle_rule(&self) -> SettleRule {
        SettleRule {
            line: self.config.settle_line(),
            max_speed: self.config.settle_speed_engine(),
        }
    }

    /// Drop the startup batch (first start only) and arm the sweeps.
    /// Does nothing if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        if !self.batch_spawned {
            let count = self.config.start_balls;
            self.spawner.spawn_batch(&mut self.world, &self.config, count);
            self.batch_spawned = true;
        }

        let settle = self.scheduler.schedule_repeating(self.config.settle_period as f64, Task::SettleScan);
        let evict = self.scheduler.schedule_repeating(self.config.evict_period as f64, Task::EvictOldest);
        let mop_up = self.scheduler.schedule_once(self.config.mop_up_delay as f64, Task::SettleScan);
        self.timers.extend(settle);
        self.timers.extend(evict);
        self.timers.push(mop_up);
        log::info!(
            "simulation started: {} balls, settle every {}s, evict every {}s above {}",
            self.world.balls().len(),
            self.config.settle_period,
            self.config.evict_period,
            self.config.max_balls
        );
    }

    /// Cancel every pending sweep. Physics and input keep working.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        for id in self.timers.drain(..) {
            self.scheduler.cancel(id);
        }
        log::info!("simulation stopped");
    }

    pub fn submit(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Pointer press at board coordinates. Every press spawns one ball.
    pub fn click(&mut self, x: f32, y: f32) {
        self.submit(Command::SpawnBall { at: Some((x, y)) });
    }

    pub fn grab(&mut self, x: f32, y: f32) {
        self.submit(Command::Grab { x, y });
    }

    pub fn drag_to(&mut self, x: f32, y: f32) {
        self.submit(Command::DragTo { x, y });
    }

    pub fn release(&mut self) {
        self.submit(Command::Release);
    }

    /// Run queued commands, advance physics by `frame_dt` seconds of wall
    /// clock, then run whatever sweeps came due.
    pub fn update(&mut self, frame_dt: f32) {
        while let Some(command) = self.commands.pop_front() {
            self.apply(command);
        }

        // Wall-clock length of one step; time_scale only changes simulated time
        let step = self.world.dt() / self.config.time_scale;
        self.accumulator += frame_dt.max(0.0);
        let mut substeps = 0;
        while self.accumulator >= step && substeps < MAX_SUBSTEPS {
            self.pull_dragged();
            self.world.step();
            self.accumulator -= step;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        for task in self.scheduler.advance(frame_dt.max(0.0) as f64) {
            self.run_task(task);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::SpawnBall { at } => {
                self.spawner.spawn(&mut self.world, &self.config, at);
            }
            Command::Grab { x, y } => {
                self.drag = self.world.ball_at(x, y).map(|handle| Drag { handle, target: (x, y) });
                if let Some(drag) = self.drag {
                    log::debug!("grabbed {:?}", drag.handle);
                }
            }
            Command::DragTo { x, y } => {
                if let Some(drag) = &mut self.drag {
                    drag.target = (x, y);
                }
            }
            Command::Release => self.drag = None,
        }
    }

    /// Steer the held ball at the pointer. Lets go once it is evicted or frozen.
    fn pull_dragged(&mut self) {
        let Some(drag) = self.drag else {
            return;
        };
        let stiffness = DRAG_STIFFNESS * REFERENCE_RATE;
        if !self.world.pull_toward(drag.handle, drag.target, stiffness) {
            log::debug!("dropped {:?}", drag.handle);
            self.drag = None;
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SettleScan => {
                self.settle_now();
            }
            Task::EvictOldest => {
                self.evict_now();
            }
        }
    }

    /// Run one settle scan immediately
    pub fn settle_now(&mut self) -> usize {
        let rule = self.settle_rule();
        sweeper::settle_scan(&mut self.world, rule)
    }

    /// Run one eviction scan immediately
    pub fn evict_now(&mut self) -> Option<u64> {
        sweeper::evict_oldest(&mut self.world, self.config.max_balls as usize)
    }

    pub fn stats(&self) -> SimulationStats {
        let balls = self.world.balls();
        let frozen_balls = balls.iter().filter(|ball| ball.frozen).count();
        SimulationStats {
            dynamic_balls: balls.len() - frozen_balls,
            frozen_balls,
            obstacles: self.scene.total(),
            elapsed: self.scheduler.now(),
        }
    }
}
