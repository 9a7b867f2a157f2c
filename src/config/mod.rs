//! Configuration for the nightclock binary.
//!
//! The configuration lives in `nightclock.toml` under `$XDG_CONFIG_HOME/nightclock/`
//! (or the directory given with `--config`). A commented default file is written on
//! first load. Every field is optional:
//!
//! ```toml
//! #[Participant]
//! role = "gm"                   # "gm" (authoritative) or "player"
//!
//! #[Animation]
//! transition_duration = 1500    # Arrow transition in milliseconds (100-10000)
//! settle_duration = 600         # Settle effect after a transition in milliseconds (0-5000)
//!
//! #[Lighting]
//! interpolation_duration = 7500 # Lighting interpolation in milliseconds (0-60000)
//! interpolation_steps = 1000    # Interpolation ticks (1-10000)
//!
//! #[Storage]
//! settings_file = "~/.local/state/nightclock/settings.toml"
//! ```
//!
//! Out-of-range values are rejected by [`validation::validate_config`] with a message
//! naming the field and its accepted range.

pub mod builder;
pub mod loading;
pub mod validation;

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::arrow::AnimationTimings;
use crate::constants::*;
use crate::controller::{ClockTimings, Role};
use crate::lighting::InterpolationTimings;

pub use builder::create_default_config;
pub use loading::{
    display_path, get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir,
};

/// Participant role as written in the config file.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigRole {
    Gm,
    Player,
}

impl From<ConfigRole> for Role {
    fn from(role: ConfigRole) -> Self {
        match role {
            ConfigRole::Gm => Role::GameMaster,
            ConfigRole::Player => Role::Player,
        }
    }
}

/// Settings read from `nightclock.toml`.
///
/// Missing fields resolve to the defaults in [`crate::constants`] through the
/// accessor methods.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Whether this participant drives the clock.
    pub role: Option<ConfigRole>,

    /// Arrow transition length in milliseconds.
    pub transition_duration: Option<u64>,
    /// Settle effect length in milliseconds.
    pub settle_duration: Option<u64>,

    /// Total lighting interpolation time in milliseconds.
    pub interpolation_duration: Option<u64>,
    /// Number of interpolation ticks.
    pub interpolation_steps: Option<u32>,

    /// Settings store location. `~` expands to the home directory.
    pub settings_file: Option<String>,
}

impl Config {
    pub fn role(&self) -> Role {
        self.role.unwrap_or(ConfigRole::Gm).into()
    }

    pub fn clock_timings(&self) -> ClockTimings {
        ClockTimings {
            animation: AnimationTimings {
                transition: Duration::from_millis(
                    self.transition_duration
                        .unwrap_or(DEFAULT_TRANSITION_DURATION),
                ),
                settle: Duration::from_millis(
                    self.settle_duration.unwrap_or(DEFAULT_SETTLE_DURATION),
                ),
            },
            interpolation: InterpolationTimings {
                duration: Duration::from_millis(
                    self.interpolation_duration
                        .unwrap_or(DEFAULT_INTERPOLATION_DURATION),
                ),
                steps: self
                    .interpolation_steps
                    .unwrap_or(DEFAULT_INTERPOLATION_STEPS),
            },
        }
    }

    /// Location of the settings store, either configured or the XDG state default.
    pub fn settings_path(&self) -> PathBuf {
        match self.settings_file.as_deref() {
            Some(path) => expand_home(path),
            None => crate::settings::default_settings_path(),
        }
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("Role: {}", self.role());

        let timings = self.clock_timings();
        log_indented!(
            "Arrow transition: {}ms (settle {}ms)",
            timings.animation.transition.as_millis(),
            timings.animation.settle.as_millis()
        );
        log_indented!(
            "Lighting interpolation: {}ms over {} steps",
            timings.interpolation.duration.as_millis(),
            timings.interpolation.steps
        );

        log_indented!("Settings file: {}", display_path(&self.settings_path()));
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
