//! Display power state machine. Pure logic, no I/O and no clock of its own.

/// The three power tiers of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PowerState {
    /// Full brightness, user is active.
    Full,
    /// Dimmed, user has been idle for a while.
    Dimmed,
    /// Screen off, waiting for a touch.
    Off,
}

/// State machine context. All timestamps are monotonic seconds truncated
/// to `u32`; elapsed time uses wrapping subtraction so the wrap at
/// `u32::MAX` (roughly every 136 years of uptime) is harmless.
#[derive(Debug)]
pub(crate) struct DimmerState {
    state: PowerState,
    /// Timestamp of the most recent touch or forced restore.
    last_touch: u32,
    brightness_full: u32,
    brightness_dim: u32,
    dim_timeout: u32,
    off_timeout: u32,
}

impl DimmerState {
    /// Create a new machine in [`PowerState::Full`].
    ///
    /// `last_touch` starts at 0, which is meaningless until the caller
    /// establishes a baseline with [`DimmerState::touch`]. The caller
    /// guarantees `dim_timeout < off_timeout` (see `params::derive`).
    pub(crate) fn new(
        brightness_full: u32,
        brightness_dim: u32,
        dim_timeout: u32,
        off_timeout: u32,
    ) -> Self {
        Self {
            state: PowerState::Full,
            last_touch: 0,
            brightness_full,
            brightness_dim,
            dim_timeout,
            off_timeout,
        }
    }

    /// Record a touch at `now`, restoring full brightness if needed.
    ///
    /// Returns the brightness to apply, or `None` when the display is
    /// already at full brightness. The idle clock is reset either way.
    pub(crate) fn touch(&mut self, now: u32) -> Option<u32> {
        self.last_touch = now;
        if self.state != PowerState::Full {
            self.state = PowerState::Full;
            Some(self.brightness_full)
        } else {
            None
        }
    }

    /// Check the idle timeouts at `now` and advance at most one tier.
    ///
    /// States only ever move forward here (Full to Dimmed to Off); both
    /// timeouts are measured from the same touch timestamp. Off is a
    /// sink that only [`DimmerState::touch`] leaves.
    pub(crate) fn timeout(&mut self, now: u32) -> Option<u32> {
        let idle = now.wrapping_sub(self.last_touch);
        match self.state {
            PowerState::Full if idle >= self.dim_timeout => {
                self.state = PowerState::Dimmed;
                Some(self.brightness_dim)
            }
            PowerState::Dimmed if idle >= self.off_timeout => {
                self.state = PowerState::Off;
                Some(0)
            }
            _ => None,
        }
    }

    /// Seconds until [`DimmerState::timeout`] should be called again to
    /// catch the next transition promptly. 0 means it is already due.
    /// `None` in Off: there is no timed transition, only a touch helps.
    pub(crate) fn next_timeout(&self, now: u32) -> Option<u32> {
        let idle = now.wrapping_sub(self.last_touch);
        match self.state {
            PowerState::Full => Some(self.dim_timeout.saturating_sub(idle)),
            PowerState::Dimmed => Some(self.off_timeout.saturating_sub(idle)),
            PowerState::Off => None,
        }
    }

    /// Target brightness of the current tier, independent of what was
    /// last written to hardware.
    pub(crate) fn brightness(&self) -> u32 {
        match self.state {
            PowerState::Full => self.brightness_full,
            PowerState::Dimmed => self.brightness_dim,
            PowerState::Off => 0,
        }
    }

    pub(crate) fn current(&self) -> PowerState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> DimmerState {
        DimmerState::new(100, 10, 5, 10)
    }

    #[test]
    fn dims_then_turns_off_then_restores() {
        let mut m = machine();
        assert_eq!(m.touch(0), None);
        assert_eq!(m.current(), PowerState::Full);

        assert_eq!(m.timeout(5), Some(10));
        assert_eq!(m.current(), PowerState::Dimmed);

        assert_eq!(m.timeout(10), Some(0));
        assert_eq!(m.current(), PowerState::Off);

        assert_eq!(m.touch(11), Some(100));
        assert_eq!(m.current(), PowerState::Full);
    }

    #[test]
    fn no_transition_before_dim_timeout() {
        let mut m = machine();
        m.touch(0);
        assert_eq!(m.timeout(4), None);
        assert_eq!(m.current(), PowerState::Full);
    }

    #[test]
    fn touch_resets_the_idle_clock() {
        let mut m = machine();
        m.touch(0);
        assert_eq!(m.timeout(6), Some(10));
        assert_eq!(m.touch(7), Some(100));
        assert_eq!(m.next_timeout(8), Some(4));
    }

    #[test]
    fn touch_while_full_updates_timestamp_without_a_change() {
        let mut m = machine();
        m.touch(0);
        assert_eq!(m.touch(4), None);
        assert_eq!(m.current(), PowerState::Full);
        // Idle is measured from the second touch.
        assert_eq!(m.timeout(8), None);
        assert_eq!(m.timeout(9), Some(10));
    }

    #[test]
    fn states_only_move_forward() {
        let mut m = machine();
        m.touch(0);
        // Long past both timeouts: still only one tier per call.
        assert_eq!(m.timeout(100), Some(10));
        assert_eq!(m.current(), PowerState::Dimmed);
        assert_eq!(m.timeout(100), Some(0));
        assert_eq!(m.current(), PowerState::Off);
    }

    #[test]
    fn off_is_a_sink_until_touched() {
        let mut m = machine();
        m.touch(0);
        m.timeout(5);
        m.timeout(10);
        assert_eq!(m.current(), PowerState::Off);

        assert_eq!(m.timeout(50), None);
        assert_eq!(m.timeout(1_000_000), None);
        assert_eq!(m.current(), PowerState::Off);
        assert_eq!(m.next_timeout(50), None);

        assert_eq!(m.touch(60), Some(100));
        assert_eq!(m.current(), PowerState::Full);
    }

    #[test]
    fn next_timeout_counts_down_and_clamps_at_zero() {
        let mut m = machine();
        m.touch(0);
        assert_eq!(m.next_timeout(0), Some(5));
        assert_eq!(m.next_timeout(3), Some(2));
        assert_eq!(m.next_timeout(7), Some(0));

        m.timeout(7);
        assert_eq!(m.current(), PowerState::Dimmed);
        assert_eq!(m.next_timeout(8), Some(2));
        assert_eq!(m.next_timeout(12), Some(0));
    }

    #[test]
    fn idle_arithmetic_survives_timestamp_wrap() {
        let mut m = machine();
        m.touch(u32::MAX - 1);

        // Two seconds later the counter has wrapped past zero.
        assert_eq!(m.next_timeout((u32::MAX - 1).wrapping_add(2)), Some(3));

        assert_eq!(m.timeout(1), None); // idle = 3
        assert_eq!(m.timeout(3), Some(10)); // idle = 5
        assert_eq!(m.current(), PowerState::Dimmed);
    }

    #[test]
    fn brightness_tracks_the_current_tier() {
        let mut m = machine();
        m.touch(0);
        assert_eq!(m.brightness(), 100);
        m.timeout(5);
        assert_eq!(m.brightness(), 10);
        m.timeout(10);
        assert_eq!(m.brightness(), 0);
        m.touch(11);
        assert_eq!(m.brightness(), 100);
    }
}
