//! Startup helpers and the monotonic clock read.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use nix::time::{clock_gettime, ClockId};

/// Current monotonic time in whole seconds, truncated to `u32`.
///
/// The truncation wraps about every 136 years; idle arithmetic in the
/// state machine uses wrapping subtraction and stays correct across it.
pub(crate) fn monotonic_seconds() -> anyhow::Result<u32> {
    let ts = clock_gettime(ClockId::CLOCK_MONOTONIC).context("clock_gettime failed")?;
    Ok(ts.tv_sec() as u32)
}

/// Wait for a device node to show up. Helps with late loaded kernel modules.
pub(crate) fn wait_for_file(path: &Path, timeout: Duration) -> anyhow::Result<()> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(250));
    }
    anyhow::bail!(
        "could not find {path:?}. Maybe --wait is too short (or there is a typo)?"
    );
}

/// Find the backlight to control when none was given on the command line.
pub(crate) fn find_backlight() -> anyhow::Result<PathBuf> {
    let class_dir = Path::new("/sys/class/backlight");
    let mut backlight_dir = None;

    for entry in class_dir
        .read_dir()
        .with_context(|| format!("failed to list {class_dir:?}"))?
    {
        let file_name = entry?.file_name().to_string_lossy().into_owned();
        if backlight_dir.is_some() {
            anyhow::bail!("Multiple backlights found. Please specify one explicitly.");
        } else {
            backlight_dir = Some(file_name);
        }
    }
    match backlight_dir {
        Some(name) => Ok(class_dir.join(name)),
        None => anyhow::bail!("No backlight found. Please specify one explicitly."),
    }
}
