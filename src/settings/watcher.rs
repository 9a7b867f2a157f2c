//! Settings file watching for a running clock.
//!
//! One-shot commands such as `nightclock night 4` or `nightclock set ...` write the
//! settings files directly. The watcher notices those writes and asks the run loop to
//! reload by sending [`SignalMessage::Reload`], the same message SIGUSR2 produces.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::Duration;

use crate::config::display_path;
use crate::constants::SETTINGS_WATCH_QUIET_MS;
use crate::io::signals::SignalMessage;

/// Watches settings files and forwards changes to the run loop.
pub struct SettingsWatcher {
    signal_sender: Sender<SignalMessage>,
    files: Vec<PathBuf>,
}

impl SettingsWatcher {
    pub fn new(signal_sender: Sender<SignalMessage>, files: Vec<PathBuf>) -> Self {
        Self {
            signal_sender,
            files,
        }
    }

    /// Start watching on a background thread.
    ///
    /// The parent directories are watched rather than the files, so files that do not
    /// exist yet and files replaced by an editor are still seen.
    pub fn start(self) -> Result<()> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && is_content_change(&event.kind)
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create settings watcher")?;

        let mut watched_dirs = HashSet::new();
        for file in &self.files {
            let Some(parent) = file.parent() else {
                continue;
            };
            if !watched_dirs.insert(parent.to_path_buf()) {
                continue;
            }
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
            watcher
                .watch(parent, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch directory: {}", parent.display()))?;
            log_debug!("Watching {} for settings changes", display_path(parent));
        }

        let names: Vec<OsString> = self
            .files
            .iter()
            .filter_map(|file| file.file_name().map(OsString::from))
            .collect();
        let signal_sender = self.signal_sender;
        let quiet = Duration::from_millis(SETTINGS_WATCH_QUIET_MS);

        thread::Builder::new()
            .name("settings-watcher".to_string())
            .spawn(move || {
                // The watcher stops when dropped, so it lives as long as this thread
                let _watcher = watcher;
                forward_events(&rx, &names, &signal_sender, quiet);
            })
            .context("failed to spawn settings watcher thread")?;

        Ok(())
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn touches_settings(event: &Event, names: &[OsString]) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .is_some_and(|name| names.iter().any(|watched| watched == name))
    })
}

/// Turn settings events into reload requests.
///
/// A burst of events (an editor writing in several steps) produces a single request,
/// sent once no event has arrived for `quiet`, so the reload reads the final content.
/// Returns when the event source closes or the run loop is gone.
fn forward_events(
    events: &Receiver<Event>,
    names: &[OsString],
    signal_sender: &Sender<SignalMessage>,
    quiet: Duration,
) {
    while let Ok(event) = events.recv() {
        if !touches_settings(&event, names) {
            continue;
        }

        loop {
            match events.recv_timeout(quiet) {
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }

        if signal_sender.send(SignalMessage::Reload).is_err() {
            return;
        }
        log_debug!("Settings change detected, reload requested");
    }
}
