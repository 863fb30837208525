#[cfg(not(target_arch = "wasm32"))]
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `verbose` lowers the default level to debug, which shows every sweep.
/// `RUST_LOG` still wins when set.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = Env::default().default_filter_or(level.to_string());
        // Fails only if a logger is already installed
        let _ = Builder::from_env(env).try_init();
    }

    #[cfg(target_arch = "wasm32")]
    log::set_max_level(level);
}
