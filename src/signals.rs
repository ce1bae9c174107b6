//! Process-wide signal flags.
//!
//! Handlers store into an atomic and nothing else; the flags are read and
//! cleared exclusively by the main loop after its wait call returns.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::libc::c_int;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static RUNNING: AtomicBool = AtomicBool::new(true);
static WAKE: AtomicBool = AtomicBool::new(false);

extern "C" fn on_terminate(_: c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

extern "C" fn on_wake(_: c_int) {
    WAKE.store(true, Ordering::SeqCst);
}

/// Install the handlers. SIGTERM and SIGINT request shutdown, SIGUSR1
/// requests a full-brightness restore as if the screen had been touched.
///
/// SA_RESTART is deliberately absent: a blocked epoll_wait has to come
/// back with EINTR for the loop to observe the flags.
pub(crate) fn install() -> nix::Result<()> {
    let terminate = SigAction::new(
        SigHandler::Handler(on_terminate),
        SaFlags::empty(),
        SigSet::empty(),
    );
    let wake = SigAction::new(
        SigHandler::Handler(on_wake),
        SaFlags::empty(),
        SigSet::empty(),
    );
    // SAFETY: Both handlers only store to an atomic, which is async-signal-safe.
    unsafe {
        sigaction(Signal::SIGTERM, &terminate)?;
        sigaction(Signal::SIGINT, &terminate)?;
        sigaction(Signal::SIGUSR1, &wake)?;
    }
    Ok(())
}

/// True until a termination signal arrives.
pub(crate) fn running() -> bool {
    RUNNING.load(Ordering::SeqCst)
}

/// Consume a pending wake request, if any.
pub(crate) fn take_wake() -> bool {
    WAKE.swap(false, Ordering::SeqCst)
}
