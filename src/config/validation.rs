//! Range checks for `nightclock.toml`.

use anyhow::Result;

use super::Config;
use crate::constants::*;

/// Reject values outside their accepted ranges.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(duration) = config.transition_duration
        && !(MINIMUM_TRANSITION_DURATION..=MAXIMUM_TRANSITION_DURATION).contains(&duration)
    {
        anyhow::bail!(
            "transition_duration ({} ms) must be between {} and {} milliseconds",
            duration,
            MINIMUM_TRANSITION_DURATION,
            MAXIMUM_TRANSITION_DURATION
        );
    }

    if let Some(duration) = config.settle_duration
        && !(MINIMUM_SETTLE_DURATION..=MAXIMUM_SETTLE_DURATION).contains(&duration)
    {
        anyhow::bail!(
            "settle_duration ({} ms) must be between {} and {} milliseconds",
            duration,
            MINIMUM_SETTLE_DURATION,
            MAXIMUM_SETTLE_DURATION
        );
    }

    if let Some(duration) = config.interpolation_duration
        && !(MINIMUM_INTERPOLATION_DURATION..=MAXIMUM_INTERPOLATION_DURATION).contains(&duration)
    {
        anyhow::bail!(
            "interpolation_duration ({} ms) must be between {} and {} milliseconds",
            duration,
            MINIMUM_INTERPOLATION_DURATION,
            MAXIMUM_INTERPOLATION_DURATION
        );
    }

    if let Some(steps) = config.interpolation_steps
        && !(MINIMUM_INTERPOLATION_STEPS..=MAXIMUM_INTERPOLATION_STEPS).contains(&steps)
    {
        anyhow::bail!(
            "interpolation_steps ({}) must be between {} and {}",
            steps,
            MINIMUM_INTERPOLATION_STEPS,
            MAXIMUM_INTERPOLATION_STEPS
        );
    }

    if let Some(path) = config.settings_file.as_deref()
        && path.trim().is_empty()
    {
        anyhow::bail!("settings_file cannot be empty");
    }

    Ok(())
}
