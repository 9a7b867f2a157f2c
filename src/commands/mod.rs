//! Command handlers for the nightclock binary.
//!
//! Each command lives in its own submodule. They all work on the settings files named
//! by the configuration; commands that write tell a running clock to reload.

pub mod get;
pub mod help;
pub mod night;
pub mod reset_lighting;
pub mod run;
pub mod set;
pub mod status;

use anyhow::{Context, Result};

use crate::config::{Config, display_path};
use crate::io::lock::{default_lock_path, running_instance_pid, send_reload_signal};
use crate::settings::{ClockSettings, FileSettingsStore, personal_settings_path};

/// Open the shared and personal settings stores the configuration points at.
pub fn open_settings(config: &Config) -> Result<ClockSettings> {
    let shared_path = config.settings_path();
    let personal_path = personal_settings_path(&shared_path);

    let shared = FileSettingsStore::open(&shared_path)
        .with_context(|| format!("Failed to open settings at {}", display_path(&shared_path)))?;
    let personal = FileSettingsStore::open(&personal_path).with_context(|| {
        format!("Failed to open settings at {}", display_path(&personal_path))
    })?;
    log_debug!("Using settings file {}", display_path(&shared_path));

    Ok(ClockSettings::with_personal_store(
        Box::new(shared),
        Box::new(personal),
    ))
}

/// Tell a running clock to pick up the settings just written.
pub fn notify_running_clock() {
    let Some(pid) = running_instance_pid(&default_lock_path()) else {
        log_indented!("Takes effect the next time the clock runs");
        return;
    };

    match send_reload_signal(pid) {
        Ok(()) => log_indented!("Running clock notified (PID: {})", pid),
        Err(e) => log_warning!("Could not notify the running clock: {}", e),
    }
}
