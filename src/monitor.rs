//! Main epoll loop

use std::time::Duration;

use anyhow::Context;
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags, EpollTimeout};

use crate::backlight::Backlight;
use crate::input::TouchInput;
use crate::signals;
use crate::state::DimmerState;
use crate::utils;

/// Marker value in epoll for the touch device.
const INPUT_HANDLE: u64 = 1;

/// Last brightness value this process successfully wrote.
///
/// This is what suppresses redundant sysfs writes: a transition whose
/// target equals the cached value costs no hardware access at all. The
/// cache tracks our own writes, not the hardware; it is seeded from one
/// read at startup and never re-synchronized afterwards.
#[derive(Debug)]
pub(crate) struct WriteCache {
    last_written: Option<u32>,
}

impl WriteCache {
    /// Cache primed with the brightness read at startup.
    pub(crate) fn seeded(value: u32) -> Self {
        Self {
            last_written: Some(value),
        }
    }

    /// Cache with no known hardware value; the first write always goes out.
    pub(crate) fn unseeded() -> Self {
        Self { last_written: None }
    }

    pub(crate) fn needs_write(&self, target: u32) -> bool {
        self.last_written != Some(target)
    }

    pub(crate) fn record(&mut self, value: u32) {
        self.last_written = Some(value);
    }
}

/// Write `target` through the cache. A failed write is logged and leaves
/// the cache untouched, so the next differing target retries instead of
/// the loop hammering the same value.
pub(crate) fn apply(backlight: &mut Backlight, cache: &mut WriteCache, target: u32) {
    if !cache.needs_write(target) {
        debug!("brightness already at {target}, skipping write");
        return;
    }
    match backlight.set_brightness(target) {
        Ok(()) => {
            debug!("brightness set to {target}");
            cache.record(target);
        }
        Err(err) => warn!("failed to set brightness to {target}: {err:#}"),
    }
}

#[derive(Debug)]
pub(crate) struct Monitor {
    epoll: Epoll,
}

impl Monitor {
    pub(crate) fn new(input: &TouchInput) -> anyhow::Result<Self> {
        let epoll = Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC)?;
        epoll.add(
            input.fd(),
            EpollEvent::new(EpollFlags::EPOLLIN | EpollFlags::EPOLLERR, INPUT_HANDLE),
        )?;
        Ok(Self { epoll })
    }

    /// Run the wait/react cycle until a termination signal arrives, then
    /// restore full brightness so the screen is not left dark.
    pub(crate) fn run(
        &mut self,
        state: &mut DimmerState,
        input: &mut TouchInput,
        backlight: &mut Backlight,
        cache: &mut WriteCache,
    ) -> anyhow::Result<()> {
        while signals::running() {
            let now = utils::monotonic_seconds()?;
            let timeout = match state.next_timeout(now) {
                // The off timeout is capped at a day, far below what an
                // epoll timeout can represent, so the conversion holds.
                Some(secs) => EpollTimeout::try_from(Duration::from_secs(secs.into()))
                    .unwrap_or(EpollTimeout::NONE),
                // Off: nothing is scheduled, only a touch or signal helps.
                None => EpollTimeout::NONE,
            };

            let mut events = [EpollEvent::empty(); 1];
            let ready = match self.epoll.wait(&mut events, timeout) {
                Ok(n) => Some(n),
                // Interruption is how signals reach us, not a fault.
                Err(Errno::EINTR) => None,
                Err(err) => return Err(err).context("epoll_wait failed"),
            };

            // Flags first: a wake request is a synthetic touch and takes
            // the same path. Checked on every pass, not just EINTR, since
            // a signal can also land while the loop is between waits.
            if signals::take_wake() {
                let now = utils::monotonic_seconds()?;
                info!("wake signal received, restoring brightness");
                if let Some(value) = state.touch(now) {
                    apply(backlight, cache, value);
                }
                continue;
            }

            let Some(ready) = ready else {
                // Interrupted by something other than a wake request; the
                // loop condition picks up a termination flag next.
                continue;
            };

            let now = utils::monotonic_seconds()?;
            if ready > 0 {
                // Readiness beats the timer: a touch observed in the same
                // wakeup as an expiry must win.
                if input.drain_events()? {
                    if let Some(value) = state.touch(now) {
                        debug!("touch restored {:?}", state.current());
                        apply(backlight, cache, value);
                    }
                }
            } else if let Some(value) = state.timeout(now) {
                debug!("idle transition to {:?}", state.current());
                apply(backlight, cache, value);
            }
        }

        info!("shutting down");
        crate::notify::stopping();

        // Leave the display in a predictable, visible state.
        let now = utils::monotonic_seconds()?;
        state.touch(now);
        apply(backlight, cache, state.brightness());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_target_needs_no_write() {
        let cache = WriteCache::seeded(100);
        assert!(!cache.needs_write(100));
        assert!(cache.needs_write(10));
        assert!(cache.needs_write(0));
    }

    #[test]
    fn unseeded_cache_forces_the_first_write() {
        let cache = WriteCache::unseeded();
        assert!(cache.needs_write(0));
        assert!(cache.needs_write(100));
    }

    #[test]
    fn recording_suppresses_the_repeat() {
        let mut cache = WriteCache::seeded(100);
        assert!(cache.needs_write(10));
        cache.record(10);
        assert!(!cache.needs_write(10));
        assert!(cache.needs_write(100));
    }
}
