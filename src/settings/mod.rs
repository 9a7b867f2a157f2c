//! Namespaced key/value settings with change notifications.
//!
//! The store itself is opaque: it keeps whatever values it is given. Meaning lives in the
//! [`registry`], which declares every clock setting with its scope, kind and default, and
//! in [`ClockSettings`], which validates writes against those definitions and resolves
//! missing or invalid values to their defaults.

pub mod clock;
pub mod file;
pub mod registry;
pub mod validation;
pub mod watcher;

pub use clock::ClockSettings;
pub use file::{FileSettingsStore, default_settings_path, personal_settings_path};
pub use registry::{SettingDefinition, SettingKind, SettingScope};
pub use validation::parse_value;
pub use watcher::SettingsWatcher;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

/// A stored setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(value) => Some(*value),
            SettingValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Int(_) => "integer",
            SettingValue::Float(_) => "number",
            SettingValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Int(value) => write!(f, "{value}"),
            SettingValue::Float(value) => write!(f, "{value}"),
            SettingValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

/// Notification sent after a stored value changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    pub namespace: String,
    pub key: String,
    pub value: SettingValue,
}

/// Change notifications from every store behind a [`ClockSettings`].
#[derive(Debug, Default)]
pub struct SettingChanges {
    receivers: Vec<Receiver<SettingChange>>,
}

impl SettingChanges {
    pub fn new(receivers: Vec<Receiver<SettingChange>>) -> Self {
        Self { receivers }
    }

    /// Every change received so far, store by store.
    pub fn try_iter(&self) -> impl Iterator<Item = SettingChange> + '_ {
        self.receivers.iter().flat_map(|receiver| receiver.try_iter())
    }
}

/// Host-owned settings storage.
pub trait SettingsStore {
    fn get(&self, namespace: &str, key: &str) -> Option<SettingValue>;

    /// Store a value. Subscribers are notified when the stored value actually changed.
    fn set(&mut self, namespace: &str, key: &str, value: SettingValue) -> Result<()>;

    /// Receive a [`SettingChange`] for every later write that changed a value.
    fn subscribe(&mut self) -> Receiver<SettingChange>;

    /// Pick up values written by someone else. Returns the number of changed keys.
    fn reload(&mut self) -> Result<usize> {
        Ok(0)
    }
}

/// Fan-out of change notifications to every live subscriber.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    senders: Vec<Sender<SettingChange>>,
}

impl ChangeNotifier {
    pub fn subscribe(&mut self) -> Receiver<SettingChange> {
        let (sender, receiver) = mpsc::channel();
        self.senders.push(sender);
        receiver
    }

    /// Deliver `change`, forgetting subscribers whose receiver was dropped.
    pub fn notify(&mut self, change: &SettingChange) {
        self.senders
            .retain(|sender| sender.send(change.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}

/// Settings kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: HashMap<(String, String), SettingValue>,
    notifier: ChangeNotifier,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, namespace: &str, key: &str) -> Option<SettingValue> {
        self.values
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    fn set(&mut self, namespace: &str, key: &str, value: SettingValue) -> Result<()> {
        let previous = self
            .values
            .insert((namespace.to_string(), key.to_string()), value.clone());

        if previous.as_ref() != Some(&value) {
            self.notifier.notify(&SettingChange {
                namespace: namespace.to_string(),
                key: key.to_string(),
                value,
            });
        }
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<SettingChange> {
        self.notifier.subscribe()
    }
}
