//! Touchscreen input via evdev

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use anyhow::Context;
use evdev_rs::enums::EventCode;
use evdev_rs::{Device, ReadFlag};

/// Handle for the touch device under /dev/input.
pub(crate) struct TouchInput {
    dev: Device,
}

impl TouchInput {
    /// Open the device non-blocking so the event queue can be drained to
    /// exhaustion after each poll wakeup.
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(nix::libc::O_NONBLOCK)
            .open(path)
            .with_context(|| format!("failed to open {path:?}"))?;
        let dev = Device::new_from_file(file)
            .with_context(|| format!("{path:?} is not an evdev device"))?;
        Ok(Self { dev })
    }

    /// Descriptor to register with the poll primitive.
    pub(crate) fn fd(&self) -> BorrowedFd<'_> {
        self.dev.file().as_fd()
    }

    /// Drain every queued event and report whether any of them was touch
    /// activity. Key and absolute-axis events both count; which one the
    /// screen reports depends on the driver, and either means a finger.
    pub(crate) fn drain_events(&mut self) -> anyhow::Result<bool> {
        let mut activity = false;
        loop {
            match self.dev.next_event(ReadFlag::NORMAL) {
                Ok((_, event)) => {
                    if matches!(
                        event.event_code,
                        EventCode::EV_KEY(_) | EventCode::EV_ABS(_)
                    ) {
                        activity = true;
                    }
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                // A hard read error means the device is gone; bail out so
                // the supervisor restarts us with fresh handles.
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("error reading input device {:?}", self.dev.file())
                    });
                }
            }
        }
        Ok(activity)
    }
}
