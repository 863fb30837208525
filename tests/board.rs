use plinko::modules::geometry::ObstacleKind;
use plinko::{BoardConfig, Simulation};
use rapier2d::prelude::{nalgebra, vector};

const FRAME: f32 = 1.0 / 60.0;

fn run_for(sim: &mut Simulation, seconds: f32) {
    let frames = (seconds / FRAME).round() as u32;
    for _ in 0..frames {
        sim.update(FRAME);
    }
}

#[test]
fn test_startup_board_and_batch() {
    let config = BoardConfig { rows: 14, ball_radius: 10.0, start_balls: 100, ..BoardConfig::classic() };
    let mut sim = Simulation::new(config, 7);
    sim.start();

    let world = sim.world();
    assert_eq!(world.balls().len(), 100);
    assert_eq!(world.obstacle_count(ObstacleKind::Peg), 14 * 15 / 2);
    assert_eq!(world.obstacle_count(ObstacleKind::FunnelWall), 2);
    assert_eq!(world.obstacle_count(ObstacleKind::Floor), 1);
    assert_eq!(world.obstacle_count(ObstacleKind::Partition), 16);

    // Distinct stagger per batch index
    let mut ys: Vec<f32> = world.balls().iter().map(|b| b.y).collect();
    ys.sort_by(f32::total_cmp);
    ys.dedup();
    assert_eq!(ys.len(), 100);
}

#[test]
fn test_settled_batch_is_frozen_by_one_scan() {
    let config = BoardConfig::classic();
    let mut sim = Simulation::new(config.clone(), 7);
    sim.start();

    // Lay every ball to rest in the lanes, one per lane per level
    let floor_top = config.height - 1.5 * config.floor_thickness;
    let first_lane = config.x_start - config.rows as f32 * config.peg_gap / 2.0;
    let handles: Vec<_> = sim.world().balls().iter().map(|b| b.handle).collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let lane = (i % 15) as f32;
        let level = (i / 15) as f32;
        let x = first_lane + lane * config.peg_gap;
        let y = floor_top - config.ball_radius - level * 2.0 * config.ball_radius;
        assert!(y > config.settle_line());
        let body = sim.world_mut().body_mut(handle).unwrap();
        body.set_translation(vector![x, y], false);
        body.set_linvel(vector![0.0, 0.0], false);
        body.set_angvel(0.0, false);
    }

    assert_eq!(sim.settle_now(), 100);
    let stats = sim.stats();
    assert_eq!(stats.dynamic_balls, 0);
    assert_eq!(stats.frozen_balls, 100);
    // Already frozen balls are not counted twice
    assert_eq!(sim.settle_now(), 0);
}

/// Run the startup batch from the funnel until every ball has come to rest
/// below the settle line, checking once per simulated second.
fn drain_startup_batch(config: BoardConfig, seed: u64, limit_secs: u32) {
    let start_balls = config.start_balls as usize;
    let mut sim = Simulation::new(config, seed);
    sim.start();

    let rule = sim.settle_rule();
    let mut resting = false;
    for _ in 0..limit_secs {
        run_for(&mut sim, 1.0);
        resting = sim.world().balls().iter().all(|ball| ball.frozen || rule.is_settled(ball));
        if resting {
            break;
        }
    }
    let balls = sim.world().balls();
    let stuck: Vec<(f32, f32)> = balls
        .iter()
        .filter(|ball| !ball.frozen && !rule.is_settled(ball))
        .map(|ball| (ball.x, ball.y))
        .collect();
    assert!(resting, "{} balls never came to rest, first at {:?}", stuck.len(), stuck.first());
    assert_eq!(balls.len(), start_balls);

    sim.settle_now();
    let stats = sim.stats();
    assert_eq!(stats.dynamic_balls, 0);
    assert_eq!(stats.frozen_balls, start_balls);
}

#[test]
fn test_classic_startup_batch_flows_through_funnel_and_freezes() {
    drain_startup_batch(BoardConfig::classic(), 7, 90);
}

#[test]
fn test_dense_startup_batch_flows_through_funnel_and_freezes() {
    drain_startup_batch(BoardConfig::dense(), 7, 90);
}

#[test]
fn test_dropped_balls_come_to_rest_and_freeze() {
    let config = BoardConfig { start_balls: 0, ..BoardConfig::classic() };
    let mut sim = Simulation::new(config, 11);
    sim.start();

    // Drop beside the upper peg rows, clear of the funnel throat
    for x in [330.0, 350.0, 650.0, 670.0, 330.0, 350.0, 650.0, 670.0] {
        sim.click(x, 300.0);
        run_for(&mut sim, 0.5);
    }
    run_for(&mut sim, 36.0);

    let line = sim.config().settle_line();
    let balls = sim.world().balls();
    assert_eq!(balls.len(), 8);
    for ball in &balls {
        assert!(ball.y > line, "ball {} stuck at y = {}", ball.id, ball.y);
        assert!(ball.frozen, "ball {} still moving at {} px/s", ball.id, ball.speed);
    }
    assert_eq!(sim.stats().dynamic_balls, 0);
}

#[test]
fn test_click_spawns_one_ball_with_horizontal_kick() {
    let mut sim = Simulation::new(BoardConfig::classic(), 3);
    sim.click(500.0, 500.0);
    sim.update(0.0);

    let balls = sim.world().balls();
    assert_eq!(balls.len(), 1);
    assert_eq!((balls[0].x, balls[0].y), (500.0, 500.0));
    let body = sim.world().body(balls[0].handle).unwrap();
    assert_eq!(body.linvel().y, 0.0);
}

#[test]
fn test_rapid_clicks_are_not_debounced() {
    let mut sim = Simulation::new(BoardConfig::classic(), 3);
    for i in 0..5 {
        sim.click(100.0 + 30.0 * i as f32, 200.0);
    }
    sim.update(FRAME);
    assert_eq!(sim.world().balls().len(), 5);
}

#[test]
fn test_overshoot_drains_one_ball_per_tick() {
    let config = BoardConfig { start_balls: 0, max_balls: 2, ..BoardConfig::classic() };
    let mut sim = Simulation::new(config, 5);
    sim.start();
    for i in 0..6 {
        sim.click(60.0 + 25.0 * i as f32, 0.0);
    }
    sim.update(0.0);
    let oldest_two: Vec<u64> = vec![0, 1];

    run_for(&mut sim, 1.25);
    assert_eq!(sim.world().balls().len(), 5);
    run_for(&mut sim, 1.2);
    assert_eq!(sim.world().balls().len(), 4);
    let ids: Vec<u64> = sim.world().balls().iter().map(|b| b.id).collect();
    assert!(oldest_two.iter().all(|id| !ids.contains(id)));
}

#[test]
fn test_obstacles_never_change() {
    let mut sim = Simulation::new(BoardConfig { start_balls: 20, max_balls: 10, ..BoardConfig::classic() }, 1);
    let snapshot = |sim: &Simulation| -> Vec<(f32, f32, f32, bool)> {
        sim.world()
            .iter()
            .filter(|(body, _)| plinko::modules::world::BodyLabel::from_user_data(body.user_data)
                .is_some_and(|label| label.ball_id().is_none()))
            .map(|(b, _)| (b.translation().x, b.translation().y, b.rotation().angle(), b.is_fixed()))
            .collect()
    };
    let before = snapshot(&sim);
    sim.start();
    run_for(&mut sim, 5.0);
    assert_eq!(snapshot(&sim), before);
    assert!(before.iter().all(|o| o.3));
}
