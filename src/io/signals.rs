//! Unix signal handling for the interactive clock.
//!
//! SIGINT, SIGTERM and SIGHUP request a shutdown. SIGUSR2 asks the running clock to
//! re-read its settings files; one-shot commands such as `nightclock night N` send it
//! after writing. The settings watcher feeds the same channel.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    Shutdown,
    Reload,
}

/// Shared between the signal thread and the run loop.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// For other producers of [`SignalMessage`]s, such as the settings watcher.
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Register the handlers and start the listener thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = channel();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();
    let sender = signal_sender.clone();
    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                if !dispatch(sig, &running_clone, &sender) {
                    break;
                }
            }
        })
        .context("failed to spawn signal thread")?;

    Ok(SignalState {
        running,
        signal_receiver,
        signal_sender,
    })
}

/// Translate one signal. Returns false once the listener should stop.
fn dispatch(sig: i32, running: &AtomicBool, sender: &Sender<SignalMessage>) -> bool {
    let message = match sig {
        SIGUSR2 => SignalMessage::Reload,
        SIGINT | SIGTERM | SIGHUP => {
            running.store(false, Ordering::SeqCst);
            SignalMessage::Shutdown
        }
        _ => return true,
    };

    // A closed receiver means the run loop is already gone.
    sender.send(message).is_ok() && message != SignalMessage::Shutdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_clears_running_and_stops_listener() {
        let running = AtomicBool::new(true);
        let (sender, receiver) = channel();

        assert!(!dispatch(SIGTERM, &running, &sender));
        assert!(!running.load(Ordering::SeqCst));
        assert_eq!(receiver.try_recv().unwrap(), SignalMessage::Shutdown);
    }

    #[test]
    fn test_reload_keeps_listening() {
        let running = AtomicBool::new(true);
        let (sender, receiver) = channel();

        assert!(dispatch(SIGUSR2, &running, &sender));
        assert!(running.load(Ordering::SeqCst));
        assert_eq!(receiver.try_recv().unwrap(), SignalMessage::Reload);
    }

    #[test]
    fn test_closed_receiver_stops_listener() {
        let running = AtomicBool::new(true);
        let (sender, receiver) = channel();
        drop(receiver);

        assert!(!dispatch(SIGUSR2, &running, &sender));
    }
}
