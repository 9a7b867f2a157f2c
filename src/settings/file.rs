//! Settings persisted to a TOML file with one table per namespace.
//!
//! Lives under `$XDG_STATE_HOME/nightclock/settings.toml` unless the configuration points
//! elsewhere. Every write rewrites the whole file. Edits made by another process (for
//! example `nightclock night 4` while a clock is running) are picked up by
//! [`FileSettingsStore::reload`], which the run loop calls when the settings watcher or
//! SIGUSR2 reports a change.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use super::{ChangeNotifier, SettingChange, SettingValue, SettingsStore};

type Tables = BTreeMap<String, BTreeMap<String, SettingValue>>;

/// File name of the per-participant store kept next to the shared one.
pub const PERSONAL_SETTINGS_FILE: &str = "local.toml";

/// Default location of the settings file.
pub fn default_settings_path() -> PathBuf {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });
    state_home.join("nightclock").join("settings.toml")
}

/// Location of the per-participant store belonging to the shared store at `shared`.
pub fn personal_settings_path(shared: &Path) -> PathBuf {
    shared.with_file_name(PERSONAL_SETTINGS_FILE)
}

#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    tables: Tables,
    notifier: ChangeNotifier,
}

impl FileSettingsStore {
    /// Open the store at `path`, reading existing values if the file is there.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = read_tables(&path)?;
        Ok(Self {
            path,
            tables,
            notifier: ChangeNotifier::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(tables).context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, namespace: &str, key: &str) -> Option<SettingValue> {
        self.tables.get(namespace)?.get(key).cloned()
    }

    /// Write through to disk. Memory only changes once the file has been written.
    fn set(&mut self, namespace: &str, key: &str, value: SettingValue) -> Result<()> {
        if self.get(namespace, key).as_ref() == Some(&value) {
            return Ok(());
        }

        let mut tables = self.tables.clone();
        tables
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());

        self.persist(&tables)?;
        self.tables = tables;
        self.notifier.notify(&SettingChange {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<SettingChange> {
        self.notifier.subscribe()
    }

    /// Re-read the file and notify about every value that differs from memory.
    fn reload(&mut self) -> Result<usize> {
        let fresh = read_tables(&self.path)?;

        let mut changed = 0;
        for (namespace, values) in &fresh {
            for (key, value) in values {
                if self.get(namespace, key).as_ref() != Some(value) {
                    changed += 1;
                    self.notifier.notify(&SettingChange {
                        namespace: namespace.clone(),
                        key: key.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        self.tables = fresh;

        if changed > 0 {
            log_debug!(
                "Reloaded {} changed setting(s) from {}",
                changed,
                self.path.display()
            );
        }
        Ok(changed)
    }
}

fn read_tables(path: &Path) -> Result<Tables> {
    if !path.exists() {
        return Ok(Tables::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}
