//! Touchscreen backlight daemon. Dims the display after a short idle
//! period, turns it off after a longer one, and restores full brightness
//! on touch or on an external wake signal (SIGUSR1).
//!
//! There is no public code API for you to use! However, the command line
//! interface should be stable.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use crate::backlight::Backlight;
use crate::input::TouchInput;
use crate::monitor::{Monitor, WriteCache};
use crate::state::DimmerState;
use crate::utils::wait_for_file;

mod backlight;
mod flags;
mod input;
mod monitor;
mod notify;
mod params;
mod signals;
mod state;
mod utils;

/// Assumed when the hardware does not report a maximum brightness.
const FALLBACK_MAX_BRIGHTNESS: u32 = 255;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = flags::Cli::parse();
    setup_daemon(&cli)
}

/// Set up to start daemon. Any error here is startup-fatal: the process
/// exits non-zero without entering the loop.
fn setup_daemon(config: &flags::Cli) -> anyhow::Result<()> {
    signals::install().context("failed to install signal handlers")?;

    let backlight_dir = match &config.backlight_dir {
        Some(dir) => dir.clone(),
        None => utils::find_backlight()?,
    };
    if let Some(timeout) = config.wait {
        wait_for_file(&backlight_dir, Duration::from_millis(timeout.into()))?;
        wait_for_file(&config.input, Duration::from_millis(timeout.into()))?;
    }

    let mut backlight =
        Backlight::new(backlight_dir.clone()).context("failed to open backlight")?;
    let mut input = TouchInput::open(&config.input).context("failed to open input device")?;

    let hw_max = match backlight.max_brightness() {
        Ok(value) => value,
        Err(err) => {
            warn!("cannot read max_brightness, assuming {FALLBACK_MAX_BRIGHTNESS}: {err:#}");
            FALLBACK_MAX_BRIGHTNESS
        }
    };
    let params = params::derive(config.brightness, config.timeout, config.dim_percent, hw_max);

    let mut state = DimmerState::new(
        params.brightness_full,
        params.brightness_dim,
        params.dim_timeout,
        params.off_timeout,
    );
    state.touch(utils::monotonic_seconds()?);

    // Seed the write cache from the one startup read; afterwards only our
    // own successful writes update it.
    let mut cache = match backlight.brightness() {
        Ok(value) => WriteCache::seeded(value),
        Err(err) => {
            warn!("cannot read current brightness: {err:#}");
            WriteCache::unseeded()
        }
    };
    if cache.needs_write(params.brightness_full) {
        backlight
            .set_brightness(params.brightness_full)
            .context("failed to set initial brightness")?;
        cache.record(params.brightness_full);
    }

    info!(
        "started: brightness={} dim={} (at {}s) off at {}s, backlight={:?}, input={:?}",
        params.brightness_full,
        params.brightness_dim,
        params.dim_timeout,
        params.off_timeout,
        backlight_dir,
        config.input
    );
    notify::ready();

    let mut monitor = Monitor::new(&input).context("failed to set up epoll")?;
    monitor.run(&mut state, &mut input, &mut backlight, &mut cache)?;

    info!("stopped");
    Ok(())
}
