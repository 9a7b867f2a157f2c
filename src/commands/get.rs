//! `nightclock get [KEY...]`: read clock settings.
//!
//! With keys, prints clean values for scripts: a single value on its own, several as
//! `key=value` lines. Without keys, lists every setting with its description.

use anyhow::Result;

use crate::config::Config;
use crate::segment::Segment;
use crate::settings::registry::{self, SettingDefinition};
use crate::settings::{ClockSettings, SettingValue};

pub fn handle_get_command(config: &Config, keys: &[String]) -> Result<()> {
    let settings = super::open_settings(config)?;

    if keys.is_empty() {
        display_all(&settings);
        return Ok(());
    }

    let values = lookup(&settings, keys)?;
    if let [(_, value)] = values.as_slice() {
        println!("{value}");
    } else {
        for (key, value) in values {
            println!("{key}={value}");
        }
    }
    Ok(())
}

/// Current values of `keys`, in order. Unknown keys are an error naming all of them.
fn lookup(settings: &ClockSettings, keys: &[String]) -> Result<Vec<(String, SettingValue)>> {
    let unknown: Vec<&str> = keys
        .iter()
        .filter(|key| registry::definition(key).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        anyhow::bail!(
            "Unknown setting(s): {} (run 'nightclock get' to list them)",
            unknown.join(", ")
        );
    }

    Ok(keys
        .iter()
        .filter_map(|key| Some((key.clone(), settings.get_value(key)?)))
        .collect())
}

fn display_all(settings: &ClockSettings) {
    log_block_start!("Clock settings");
    for definition in registry::general_definitions() {
        display_setting(settings, &definition);
    }

    for segment in Segment::ALL {
        log_block_start!("{} lighting", segment.title());
        for definition in registry::lighting_definitions(segment) {
            display_setting(settings, &definition);
        }
    }
    log_end!();
}

fn display_setting(settings: &ClockSettings, definition: &SettingDefinition) {
    let value = settings
        .get_value(&definition.key)
        .unwrap_or_else(|| definition.default.clone());
    log_indented!(
        "{} = {}  ({}, {})",
        definition.key,
        value,
        definition.scope.as_str(),
        definition.name
    );
    log_debug!("{}: {}", definition.key, definition.hint);
}
