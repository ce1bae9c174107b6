//! clap argument parsing
use std::path::PathBuf;

/// Touchscreen backlight daemon. Dims and turns off the display after touch inactivity
#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Brightness value for the active display.
    #[clap(short, long, default_value_t = 150,
           value_parser = clap::value_parser!(u32).range(15..=255))]
    pub brightness: u32,
    /// Seconds of inactivity before the display is turned off.
    #[clap(short, long, default_value_t = 300,
           value_parser = clap::value_parser!(u32).range(10..=86400))]
    pub timeout: u32,
    /// Dim after this percentage of the off timeout, at this percentage
    /// of full brightness.
    #[clap(short, long, default_value_t = 10,
           value_parser = clap::value_parser!(u32).range(1..=100))]
    pub dim_percent: u32,
    /// Sysfs directory of the backlight to control. Auto-detected when
    /// /sys/class/backlight holds exactly one entry.
    #[clap(short = 'l', long = "backlight")]
    pub backlight_dir: Option<PathBuf>,
    /// Path to the evdev touch device to monitor.
    #[clap(short, long, default_value = "/dev/input/event0")]
    pub input: PathBuf,
    /// Timeout in milliseconds during startup for device nodes to appear.
    ///
    /// This can help with late loaded kernel modules.
    #[clap(short, long)]
    pub wait: Option<u32>,
}
