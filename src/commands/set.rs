//! `nightclock set <KEY> <VALUE> [<KEY> <VALUE>...]`: change clock settings.
//!
//! Every pair is parsed and validated before anything is written, so a typo in the last
//! pair leaves all settings as they were. World settings are shared by everyone at the
//! table and only the GM may change them.

use anyhow::Result;

use crate::config::Config;
use crate::controller::Role;
use crate::settings::registry::{self, SettingScope};
use crate::settings::validation::validate_value;
use crate::settings::{ClockSettings, SettingValue, parse_value};

pub fn handle_set_command(config: &Config, fields: &[(String, String)]) -> Result<()> {
    let updates = prepare_updates(fields, config.role())?;
    let mut settings = super::open_settings(config)?;
    let changed = apply_updates(&mut settings, &updates)?;

    if changed.is_empty() {
        log_block_start!("Settings unchanged");
        if let [(key, value)] = updates.as_slice() {
            log_indented!("{} is already set to {}", key, value);
        } else {
            log_indented!("All settings already have the specified values");
        }
    } else {
        log_block_start!("Updated settings");
        for (key, value) in &changed {
            log_indented!("{} = {}", key, value);
        }
        super::notify_running_clock();
    }

    log_end!();
    Ok(())
}

/// Parse and validate every `(key, text)` pair for a participant with `role`.
fn prepare_updates(
    fields: &[(String, String)],
    role: Role,
) -> Result<Vec<(String, SettingValue)>> {
    let mut updates = Vec::with_capacity(fields.len());

    for (key, text) in fields {
        let Some(definition) = registry::definition(key) else {
            anyhow::bail!("Unknown setting '{}' (run 'nightclock get' to list them)", key);
        };
        if definition.scope == SettingScope::World && !role.is_authoritative() {
            anyhow::bail!(
                "Only the GM can change {} ({} setting)",
                key,
                definition.scope.as_str()
            );
        }

        let value = validate_value(&definition, parse_value(&definition, text)?)?;
        updates.push((key.clone(), value));
    }

    Ok(updates)
}

/// Store `updates`, returning the ones that changed a value.
fn apply_updates(
    settings: &mut ClockSettings,
    updates: &[(String, SettingValue)],
) -> Result<Vec<(String, SettingValue)>> {
    let mut changed = Vec::new();

    for (key, value) in updates {
        if settings.get_value(key).as_ref() == Some(value) {
            continue;
        }
        settings.set_value(key, value.clone())?;
        changed.push((key.clone(), value.clone()));
    }

    Ok(changed)
}
