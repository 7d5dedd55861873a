//! Process shutdown signals.

use std::fmt;

use anyhow::{Context, Result};
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Signals that stop the daemon. All of them are handled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Terminate,
    Quit,
    Interrupt,
    Hangup,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Terminate => "SIGTERM",
            Self::Quit => "SIGQUIT",
            Self::Interrupt => "SIGINT",
            Self::Hangup => "SIGHUP",
        };
        f.write_str(name)
    }
}

/// Handlers for the four shutdown signals.
///
/// Handlers are installed by [`ShutdownListener::install`], so signals
/// arriving between installation and [`ShutdownListener::recv`] are not lost.
pub struct ShutdownListener {
    terminate: Signal,
    quit: Signal,
    interrupt: Signal,
    hangup: Signal,
}

impl ShutdownListener {
    /// Must be called from within a tokio runtime.
    pub fn install() -> Result<Self> {
        let install = |kind: SignalKind, which: ShutdownSignal| {
            signal(kind).with_context(|| format!("Failed to install {which} handler"))
        };

        Ok(Self {
            terminate: install(SignalKind::terminate(), ShutdownSignal::Terminate)?,
            quit: install(SignalKind::quit(), ShutdownSignal::Quit)?,
            interrupt: install(SignalKind::interrupt(), ShutdownSignal::Interrupt)?,
            hangup: install(SignalKind::hangup(), ShutdownSignal::Hangup)?,
        })
    }

    /// Waits for the first shutdown signal.
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.quit.recv() => ShutdownSignal::Quit,
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.hangup.recv() => ShutdownSignal::Hangup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::time::Duration;

    fn raise(signum: libc::c_int) {
        // SAFETY: raise only sends a signal to the calling process.
        assert_eq!(unsafe { libc::raise(signum) }, 0);
    }

    async fn recv_within(listener: &mut ShutdownListener) -> ShutdownSignal {
        tokio::time::timeout(Duration::from_secs(5), listener.recv())
            .await
            .expect("signal not delivered")
    }

    #[test]
    fn signal_names() {
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownSignal::Quit.to_string(), "SIGQUIT");
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Hangup.to_string(), "SIGHUP");
    }

    #[tokio::test]
    #[serial]
    async fn listener_installs_and_stays_pending() {
        let mut listener = ShutdownListener::install().unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(50), listener.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn each_signal_maps_to_its_variant() {
        let mut listener = ShutdownListener::install().unwrap();

        raise(libc::SIGHUP);
        assert_eq!(recv_within(&mut listener).await, ShutdownSignal::Hangup);

        raise(libc::SIGQUIT);
        assert_eq!(recv_within(&mut listener).await, ShutdownSignal::Quit);

        raise(libc::SIGTERM);
        assert_eq!(recv_within(&mut listener).await, ShutdownSignal::Terminate);

        raise(libc::SIGINT);
        assert_eq!(recv_within(&mut listener).await, ShutdownSignal::Interrupt);
    }
}
