//! Supervisor notifications over the sd_notify datagram protocol.
//!
//! A missing NOTIFY_SOCKET means no supervisor is listening; every
//! function here is then a no-op. Notification failures are never fatal,
//! the daemon works the same without a supervisor watching.

use std::env;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::{SocketAddr, UnixDatagram};

use log::warn;

fn notify(message: &str) -> io::Result<()> {
    let Some(socket_path) = env::var_os("NOTIFY_SOCKET") else {
        return Ok(());
    };
    let socket = UnixDatagram::unbound()?;
    let bytes = socket_path.as_bytes();
    if bytes.first() == Some(&b'@') {
        // A leading '@' stands for a NUL byte: abstract namespace socket.
        use std::os::linux::net::SocketAddrExt;
        let addr = SocketAddr::from_abstract_name(&bytes[1..])?;
        socket.send_to_addr(message.as_bytes(), &addr)?;
    } else {
        socket.send_to(message.as_bytes(), socket_path)?;
    }
    Ok(())
}

/// Report that startup finished and the loop is about to run.
pub(crate) fn ready() {
    if let Err(err) = notify("READY=1") {
        warn!("failed to send readiness notification: {err}");
    }
}

/// Report that shutdown has begun.
pub(crate) fn stopping() {
    if let Err(err) = notify("STOPPING=1") {
        warn!("failed to send stopping notification: {err}");
    }
}
