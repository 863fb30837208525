//! Obstacle layout for the board. Pure arithmetic on a [`BoardConfig`]: nothing
//! here touches the physics world.

use crate::modules::config::BoardConfig;

/// What an obstacle is, used for labelling and drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Peg,
    FunnelWall,
    Floor,
    Partition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    Circle { radius: f32 },
    /// Full width and height, before rotation
    Rect { width: f32, height: f32 },
}

/// A static body waiting to be inserted into the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub shape: ObstacleShape,
    /// Radians, clockwise on screen since +y points down
    pub rotation: f32,
}

impl Obstacle {
    fn circle(kind: ObstacleKind, x: f32, y: f32, radius: f32) -> Self {
        Self { kind, x, y, shape: ObstacleShape::Circle { radius }, rotation: 0.0 }
    }

    fn rect(kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32, rotation: f32) -> Self {
        Self { kind, x, y, shape: ObstacleShape::Rect { width, height }, rotation }
    }

    /// Degenerate shapes are dropped rather than handed to the engine
    fn has_area(&self) -> bool {
        match self.shape {
            ObstacleShape::Circle { radius } => radius > 0.0,
            ObstacleShape::Rect { width, height } => width > 0.0 && height > 0.0,
        }
    }
}

/// Triangular peg field. Row `k` (1-based) holds `k` pegs, centred under
/// `x_start`, so `rows` rows give `rows * (rows + 1) / 2` pegs. Row 1 hangs
/// `peg_top_margin` below the funnel exit.
pub fn peg_field(config: &BoardConfig) -> Vec<Obstacle> {
    if config.peg_radius <= 0.0 {
        return Vec::new();
    }
    let x_gap = config.peg_gap;
    let rows = config.row_count();

    let total = rows as usize * (rows as usize + 1) / 2;
    let mut pegs = Vec::with_capacity(total);
    for row in 1..=rows {
        let y = config.peg_row_y(row);
        // Half the row's span, so the row is centred on x_start
        let x_row_offset = (x_gap * row as f32 - x_gap) / 2.0;
        for j in 0..row {
            let x = config.x_start - x_row_offset + x_gap * j as f32;
            pegs.push(Obstacle::circle(ObstacleKind::Peg, x, y, config.peg_radius));
        }
    }
    pegs
}

/// The two sloped walls above the pegs. Their lower ends leave
/// `funnel_opening` between them.
pub fn funnel_walls(config: &BoardConfig) -> [Obstacle; 2] {
    let length = config.funnel_wall_length;
    let angle = config.funnel_wall_angle;
    let half_run = length * angle.cos() / 2.0;
    let half_rise = length * angle.sin() / 2.0;
    let half_opening = config.funnel_opening / 2.0;
    let y = config.y_start + config.funnel_drop - half_rise;

    let left_x = config.x_start - half_opening - half_run;
    let right_x = config.x_start + half_opening + half_run;
    let thickness = config.funnel_wall_thickness;
    [
        Obstacle::rect(ObstacleKind::FunnelWall, left_x, y, length, thickness, angle),
        Obstacle::rect(ObstacleKind::FunnelWall, right_x, y, length, thickness, -angle),
    ]
}

/// Full-width slab along the bottom margin
pub fn floor(config: &BoardConfig) -> Obstacle {
    Obstacle::rect(
        ObstacleKind::Floor,
        config.x_start,
        config.height - config.floor_thickness,
        config.width - 4.0,
        config.floor_thickness,
        0.0,
    )
}

/// `rows + 2` thin walls standing on the floor, one peg gap apart and lined
/// up under the last peg row, forming the histogram lanes.
pub fn partitions(config: &BoardConfig) -> Vec<Obstacle> {
    let rows = config.row_count();
    let count = rows + 2;
    let wall_height = config.wall_height();
    let floor_top = config.height - 1.5 * config.floor_thickness;
    let y = floor_top - wall_height / 2.0;
    let left = config.x_start - rows as f32 * config.peg_gap / 2.0;

    (0..count)
        .map(|i| {
            let x = left + (i as f32 - 0.5) * config.peg_gap;
            Obstacle::rect(ObstacleKind::Partition, x, y, config.partition_thickness, wall_height, 0.0)
        })
        .collect()
}

/// Every static obstacle on the board, pegs first
pub fn board(config: &BoardConfig) -> Vec<Obstacle> {
    let mut obstacles = peg_field(config);
    obstacles.extend(funnel_walls(config));
    obstacles.push(floor(config));
    obstacles.extend(partitions(config));
    obstacles.retain(Obstacle::has_area);
    obstacles
}
