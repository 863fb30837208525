//! Board configuration: every tunable of a run, fixed once the simulation is built.
//!
//! Values are in the frame-based units the board was tuned in (velocities per
//! 1/60 s frame, gravity as a scale on px/ms²). The `*_engine` helpers convert
//! them into rapier's per-second units.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Frames per second the velocity-style constants were tuned against.
pub const REFERENCE_RATE: f32 = 60.0;

/// Largest peg triangle a config may ask for
pub const MAX_ROWS: u32 = 128;

/// Vertical spacing of the peg rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PegSpacing {
    /// `sin(60°) * gap`, equilateral triangles
    #[default]
    Isometric,
    /// `0.5 * gap`, tighter quincunx
    Quincunx,
}

impl PegSpacing {
    pub fn row_gap(self, gap: f32) -> f32 {
        match self {
            PegSpacing::Isometric => gap * (PI / 3.0).sin(),
            PegSpacing::Quincunx => 0.5 * gap,
        }
    }
}

/// Named parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Classic,
    Dense,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Dense => "dense",
        }
    }

    pub fn config(self) -> BoardConfig {
        match self {
            Preset::Classic => BoardConfig::classic(),
            Preset::Dense => BoardConfig::dense(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    // === Board ===
    pub width: f32,
    pub height: f32,
    /// Horizontal centre of the drop
    pub x_start: f32,
    pub y_start: f32,

    // === Pegs ===
    pub rows: u32,
    pub ball_radius: f32,
    pub peg_radius: f32,
    /// Horizontal distance between neighbouring pegs
    pub peg_gap: f32,
    pub peg_spacing: PegSpacing,
    /// Distance from the funnel exit down to the first peg row
    pub peg_top_margin: f32,

    // === Funnel, floor, lanes ===
    pub funnel_wall_length: f32,
    /// Radians from horizontal
    pub funnel_wall_angle: f32,
    pub funnel_wall_thickness: f32,
    /// Horizontal opening between the two funnel walls
    pub funnel_opening: f32,
    /// How far below `y_start` the funnel opening sits
    pub funnel_drop: f32,
    pub floor_thickness: f32,
    pub partition_thickness: f32,

    // === Physics ===
    pub restitution: f32,
    pub friction: f32,
    /// Fraction of velocity lost per reference frame
    pub friction_air: f32,
    pub gravity: f32,
    pub gravity_scale: f32,
    pub time_scale: f32,

    // === Ball lifecycle ===
    /// Balls dropped by the startup batch
    pub start_balls: u32,
    /// Live ball cap enforced by the eviction scan
    pub max_balls: u32,
    /// Speed (px per reference frame) under which a ball counts as resting
    pub settle_speed: f32,
    /// Seconds between settle scans
    pub settle_period: f32,
    /// Seconds between eviction scans
    pub evict_period: f32,
    /// Seconds until the one-shot mop-up settle scan
    pub mop_up_delay: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl BoardConfig {
    /// Isometric board, 14 rows, 100 startup balls
    pub fn classic() -> Self {
        let width = 1000.0;
        let ball_radius = 10.0;
        Self {
            width,
            height: 1000.0,
            x_start: width / 2.0,
            y_start: 100.0,

            rows: 14,
            ball_radius,
            peg_radius: 0.3 * ball_radius,
            peg_gap: 4.0 * ball_radius,
            peg_spacing: PegSpacing::Isometric,
            peg_top_margin: 20.0,

            funnel_wall_length: 600.0,
            funnel_wall_angle: PI / 3.0,
            funnel_wall_thickness: 5.0,
            // Four ball diameters, narrower throats arch and jam
            funnel_opening: 8.0 * ball_radius,
            funnel_drop: 10.0,
            floor_thickness: 20.0,
            partition_thickness: 4.0,

            restitution: 1.0 / 100.0,
            friction: 0.01,
            friction_air: 0.08,
            gravity: 1.0,
            gravity_scale: 0.0018,
            time_scale: 1.0,

            start_balls: 100,
            max_balls: 200,
            settle_speed: 0.1,
            settle_period: 1.2,
            evict_period: 1.2,
            mop_up_delay: 20.0,
        }
    }

    /// Quincunx board with more, smaller balls
    pub fn dense() -> Self {
        let ball_radius = 8.0;
        Self {
            rows: 16,
            ball_radius,
            peg_radius: 3.0,
            peg_gap: 6.0 * ball_radius,
            peg_spacing: PegSpacing::Quincunx,
            funnel_opening: 8.0 * ball_radius,
            start_balls: 150,
            max_balls: 300,
            ..Self::classic()
        }
    }

    /// Parse a JSON board. Missing fields take the classic values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp inconsistent values instead of failing. Zero rows or a zero-sized
    /// board are left alone: they degrade to an empty field.
    pub fn sanitized(mut self) -> Self {
        fn non_negative(name: &str, value: &mut f32) {
            if value.is_nan() || *value < 0.0 {
                log::warn!("{name} = {value} is invalid, using 0");
                *value = 0.0;
            }
        }
        fn positive(name: &str, value: &mut f32, fallback: f32) {
            if value.is_nan() || *value <= 0.0 {
                log::warn!("{name} = {value} is invalid, using {fallback}");
                *value = fallback;
            }
        }

        let defaults = Self::classic();
        if self.rows > MAX_ROWS {
            log::warn!("rows = {} is too many, using {MAX_ROWS}", self.rows);
            self.rows = MAX_ROWS;
        }
        non_negative("width", &mut self.width);
        non_negative("height", &mut self.height);
        non_negative("ball_radius", &mut self.ball_radius);
        non_negative("peg_radius", &mut self.peg_radius);
        non_negative("peg_gap", &mut self.peg_gap);
        non_negative("funnel_wall_length", &mut self.funnel_wall_length);
        non_negative("funnel_wall_thickness", &mut self.funnel_wall_thickness);
        non_negative("funnel_opening", &mut self.funnel_opening);
        non_negative("floor_thickness", &mut self.floor_thickness);
        non_negative("partition_thickness", &mut self.partition_thickness);
        non_negative("restitution", &mut self.restitution);
        non_negative("friction", &mut self.friction);
        non_negative("settle_speed", &mut self.settle_speed);
        non_negative("mop_up_delay", &mut self.mop_up_delay);
        positive("time_scale", &mut self.time_scale, defaults.time_scale);
        positive("settle_period", &mut self.settle_period, defaults.settle_period);
        positive("evict_period", &mut self.evict_period, defaults.evict_period);

        if !(0.0..1.0).contains(&self.friction_air) {
            let clamped = if self.friction_air.is_nan() { 0.0 } else { self.friction_air.clamp(0.0, 0.99) };
            log::warn!("friction_air = {} is invalid, using {}", self.friction_air, clamped);
            self.friction_air = clamped;
        }
        self
    }

    /// Vertical distance between peg rows
    pub fn row_gap(&self) -> f32 {
        self.peg_spacing.row_gap(self.peg_gap)
    }

    /// Rows the geometry builds, never more than [`MAX_ROWS`]
    pub fn row_count(&self) -> u32 {
        self.rows.min(MAX_ROWS)
    }

    /// Where the balls leave the funnel
    pub fn funnel_exit(&self) -> f32 {
        self.y_start + self.funnel_drop
    }

    /// Centre line of peg row `row` (1-based)
    pub fn peg_row_y(&self, row: u32) -> f32 {
        self.funnel_exit() + self.peg_top_margin + self.row_gap() * (row as f32 - 1.0)
    }

    /// Top of the lane partitions, one row gap under the last peg row
    pub fn lane_top(&self) -> f32 {
        self.peg_row_y(self.row_count().max(1)) + self.row_gap()
    }

    /// Height of the lane partitions, from the floor up to [`Self::lane_top`]
    pub fn wall_height(&self) -> f32 {
        let floor_top = self.height - 1.5 * self.floor_thickness;
        (floor_top - self.lane_top()).max(0.0)
    }

    /// Balls below this y (screen coordinates, +y down) may be frozen
    pub fn settle_line(&self) -> f32 {
        self.height - self.floor_thickness - self.wall_height()
    }

    /// Gravity along +y in px/s²
    pub fn gravity_engine(&self) -> f32 {
        // gravity * scale is px/ms²
        self.gravity * self.gravity_scale * 1.0e6
    }

    /// Rapier linear damping equivalent to losing `friction_air` per frame
    pub fn linear_damping(&self) -> f32 {
        -(1.0 - self.friction_air).ln() * REFERENCE_RATE
    }

    /// Settle threshold in px/s
    pub fn settle_speed_engine(&self) -> f32 {
        self.settle_speed * REFERENCE_RATE
    }
}
