//! Drawing the world with macroquad. Shapes are read back from the colliders,
//! so whatever the engine holds is what gets drawn.

use macroquad::prelude::*;

use crate::modules::scale::Viewport;
use crate::modules::simulation::{Simulation, SimulationStats};
use crate::modules::world::BodyLabel;

const OBSTACLE_COLOR: Color = LIGHTGRAY;
const BALL_COLOR: Color = GREEN;
const FROZEN_BALL_COLOR: Color = DARKGREEN;
const ANGLE_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.6);

pub fn draw_world(sim: &Simulation, viewport: &Viewport) {
    for (body, collider) in sim.world().iter() {
        let pos = viewport.virtual_to_screen(vec2(body.translation().x, body.translation().y));
        let rot = body.rotation().angle();
        let color = match BodyLabel::from_user_data(body.user_data) {
            Some(BodyLabel::Ball(_)) if body.is_fixed() => FROZEN_BALL_COLOR,
            Some(BodyLabel::Ball(_)) => BALL_COLOR,
            _ => OBSTACLE_COLOR,
        };

        let shape = collider.shape();
        if let Some(ball) = shape.as_ball() {
            let radius = viewport.length(ball.radius);
            draw_circle(pos.x, pos.y, radius, color);
            let tip = angle_tip(pos, rot, radius);
            draw_line(pos.x, pos.y, tip.x, tip.y, 1.0, ANGLE_COLOR);
        }
        if let Some(cuboid) = shape.as_cuboid() {
            let w = viewport.length(cuboid.half_extents.x * 2.0);
            let h = viewport.length(cuboid.half_extents.y * 2.0);
            // Rotate about the centre, not the corner
            draw_rectangle_ex(
                pos.x,
                pos.y,
                w,
                h,
                DrawRectangleParams { offset: vec2(0.5, 0.5), rotation: rot, color },
            );
        }
    }
}

/// Rim point the spin indicator runs to from the centre
fn angle_tip(centre: Vec2, angle: f32, radius: f32) -> Vec2 {
    centre + Vec2::from_angle(angle) * radius
}

/// Settle line, drawn faintly across the board
pub fn draw_settle_line(sim: &Simulation, viewport: &Viewport) {
    let line = sim.config().settle_line();
    let left = viewport.virtual_to_screen(vec2(0.0, line));
    let right = viewport.virtual_to_screen(vec2(sim.config().width, line));
    draw_line(left.x, left.y, right.x, right.y, 1.0, Color::new(1.0, 1.0, 1.0, 0.15));
}

pub fn draw_stats(stats: &SimulationStats) {
    let text = format!(
        "balls {}  moving {}  frozen {}  t {:.0}s  fps {}",
        stats.balls(),
        stats.dynamic_balls,
        stats.frozen_balls,
        stats.elapsed,
        get_fps()
    );
    draw_text(&text, 12.0, 24.0, 22.0, WHITE);
}
