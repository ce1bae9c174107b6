//! Abstraction for the backlight in /sys

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

const BRIGHTNESS: &str = "brightness";
const MAX_BRIGHTNESS: &str = "max_brightness";

/// Helper to read an integer from a sysfs attribute.
fn read_int(p: &Path) -> anyhow::Result<u32> {
    let mut f = OpenOptions::new()
        .read(true)
        .open(p)
        .with_context(|| format!("failed to open {p:?}"))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)
        .with_context(|| format!("failed to read {p:?}"))?;
    buf.trim_end_matches('\n')
        .parse()
        .with_context(|| format!("unparsable integer in {p:?}"))
}

/// Handle for one /sys/class/backlight entry.
#[derive(Debug)]
pub(crate) struct Backlight {
    /// Path to the backlight directory.
    path: PathBuf,
}

impl Backlight {
    /// Open a backlight directory, verifying the brightness attribute is
    /// actually writable so startup fails fast on a bogus path.
    pub(crate) fn new(path: PathBuf) -> anyhow::Result<Self> {
        let probe = path.join(BRIGHTNESS);
        OpenOptions::new()
            .write(true)
            .open(&probe)
            .with_context(|| format!("failed to open {probe:?} for writing"))?;
        Ok(Self { path })
    }

    /// Read the current hardware brightness.
    pub(crate) fn brightness(&self) -> anyhow::Result<u32> {
        read_int(&self.path.join(BRIGHTNESS))
    }

    /// Read the maximum brightness supported by the hardware.
    pub(crate) fn max_brightness(&self) -> anyhow::Result<u32> {
        read_int(&self.path.join(MAX_BRIGHTNESS))
    }

    /// Write a new brightness value.
    pub(crate) fn set_brightness(&mut self, brightness: u32) -> anyhow::Result<()> {
        let p = self.path.join(BRIGHTNESS);
        let mut f = OpenOptions::new()
            .write(true)
            .open(&p)
            .with_context(|| format!("failed to open {p:?}"))?;
        write!(f, "{brightness}").with_context(|| format!("failed to write to {p:?}"))?;
        Ok(())
    }
}
