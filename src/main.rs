/*
Program Details: <Galton board: balls drop through a peg triangle into lanes>
Click anywhere to drop another ball, hold on a moving ball to drag it.
Space stops/starts the housekeeping sweeps.
*/

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use macroquad::miniquad::date;
use macroquad::prelude::*;
use thiserror::Error;

use plinko::modules::logging;
use plinko::modules::render::{draw_settle_line, draw_stats, draw_world};
use plinko::modules::scale::{mouse_position_virtual, use_virtual_resolution};
use plinko::{BoardConfig, Preset, Simulation};

/// Galton board simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in board to run
    #[arg(short, long, value_enum, default_value_t = Preset::Classic)]
    preset: Preset,
    /// JSON board file; fields it leaves out take the classic values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// RNG seed for ball launches (defaults to the clock)
    #[arg(short, long)]
    seed: Option<u64>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Set up window settings before the app runs
fn window_conf() -> Conf {
    Conf {
        window_title: "plinko".to_string(),
        window_width: 1000,
        window_height: 1000,
        fullscreen: false,
        high_dpi: true,
        window_resizable: true,
        sample_count: 4, // MSAA
        ..Default::default()
    }
}

#[derive(Debug, Error)]
enum ConfigError {
    #[error("failed to read board config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid board config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read a JSON board file. Missing fields take the classic values.
fn load_board(path: &Path) -> Result<BoardConfig, ConfigError> {
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BoardConfig::from_json(&json)?)
}

fn board_config(args: &Args) -> BoardConfig {
    let Some(path) = &args.config else {
        return args.preset.config();
    };
    match load_board(path) {
        Ok(config) => {
            log::info!("loaded board from {}", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}; falling back to the {} preset", args.preset.as_str());
            args.preset.config()
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = board_config(&args);
    let seed = args.seed.unwrap_or(date::now() as u64);
    log::info!("seed {seed}");

    let mut sim = Simulation::new(config, seed);
    sim.start();

    loop {
        let viewport = use_virtual_resolution(sim.config().width, sim.config().height);
        clear_background(BLACK);

        // Every press drops exactly one ball where the pointer is, and picks
        // up whatever moving ball was already there
        let pointer = mouse_position_virtual(&viewport);
        if is_mouse_button_pressed(MouseButton::Left) {
            sim.grab(pointer.x, pointer.y);
            sim.click(pointer.x, pointer.y);
        } else if is_mouse_button_down(MouseButton::Left) {
            sim.drag_to(pointer.x, pointer.y);
        }
        if is_mouse_button_released(MouseButton::Left) {
            sim.release();
        }
        if is_key_pressed(KeyCode::Space) {
            if sim.is_running() {
                sim.stop();
            } else {
                sim.start();
            }
        }
        if is_key_pressed(KeyCode::Escape) {
            sim.stop();
            break;
        }

        sim.update(get_frame_time());

        draw_settle_line(&sim, &viewport);
        draw_world(&sim, &viewport);
        draw_stats(&sim.stats());

        next_frame().await;
    }
}
