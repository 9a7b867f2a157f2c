//! Typed access to the clock settings.

use anyhow::{Context, Result};

use super::registry::{
    self, CLOCK_SCALE, CLOCK_VISIBLE, CURRENT_NIGHT, CURRENT_SEGMENT, LIGHTING_INTEGRATION,
    NIGHT_INCREMENT_SEGMENT,
};
use super::registry::SettingScope;
use super::validation::validate_value;
use super::{SettingChanges, SettingValue, SettingsStore};
use crate::constants::{
    DEFAULT_CLOCK_SCALE, DEFAULT_CLOCK_VISIBLE, DEFAULT_LIGHTING_INTEGRATION, SETTINGS_NAMESPACE,
};
use crate::lighting::LightingEnvironment;
use crate::segment::Segment;
use crate::state::{ClockState, clamp_night};

/// Clock settings on top of host [`SettingsStore`]s.
///
/// World-scoped settings live in the shared store. Client and local settings belong to
/// one participant and live in the personal store when there is one.
///
/// Reads never fail: a missing or invalid stored value resolves to the registered
/// default. Writes are validated against the registry and rejected with an error.
pub struct ClockSettings {
    shared: Box<dyn SettingsStore>,
    personal: Option<Box<dyn SettingsStore>>,
}

impl ClockSettings {
    /// Keep every setting in `store`.
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self {
            shared: store,
            personal: None,
        }
    }

    /// Keep world settings in `shared` and per-participant settings in `personal`.
    pub fn with_personal_store(
        shared: Box<dyn SettingsStore>,
        personal: Box<dyn SettingsStore>,
    ) -> Self {
        Self {
            shared,
            personal: Some(personal),
        }
    }

    fn store(&self, scope: SettingScope) -> &dyn SettingsStore {
        match &self.personal {
            Some(personal) if scope != SettingScope::World => personal.as_ref(),
            _ => self.shared.as_ref(),
        }
    }

    fn store_mut(&mut self, scope: SettingScope) -> &mut dyn SettingsStore {
        if scope != SettingScope::World
            && let Some(personal) = self.personal.as_mut()
        {
            return personal.as_mut();
        }
        self.shared.as_mut()
    }

    /// Current value of `key`, or its default.
    pub fn get_value(&self, key: &str) -> Option<SettingValue> {
        let definition = registry::definition(key)?;
        let stored = self.store(definition.scope).get(SETTINGS_NAMESPACE, key);

        let value = match stored {
            Some(value) => match validate_value(&definition, value) {
                Ok(valid) => valid,
                Err(e) => {
                    log_debug!("Ignoring stored {}: {}", key, e);
                    definition.default
                }
            },
            None => definition.default,
        };
        Some(value)
    }

    /// Validate and store `value` under `key`.
    pub fn set_value(&mut self, key: &str, value: SettingValue) -> Result<()> {
        let Some(definition) = registry::definition(key) else {
            anyhow::bail!("unknown setting '{}'", key);
        };
        let value = validate_value(&definition, value)?;
        self.store_mut(definition.scope)
            .set(SETTINGS_NAMESPACE, key, value)
            .with_context(|| format!("Failed to store {key}"))
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.get_value(key).and_then(|value| value.as_int())
    }

    fn float(&self, key: &str) -> Option<f64> {
        self.get_value(key).and_then(|value| value.as_float())
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.get_value(key).and_then(|value| value.as_bool())
    }

    pub fn current_segment(&self) -> Segment {
        self.int(CURRENT_SEGMENT)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(Segment::from_index)
            .unwrap_or(Segment::Dusk)
    }

    pub fn set_current_segment(&mut self, segment: Segment) -> Result<()> {
        self.set_value(CURRENT_SEGMENT, SettingValue::Int(segment.index() as i64))
    }

    pub fn current_night(&self) -> u32 {
        let night = self
            .int(CURRENT_NIGHT)
            .and_then(|night| u32::try_from(night).ok())
            .unwrap_or_default();
        clamp_night(night)
    }

    /// Store a night count, floored at the first night.
    pub fn set_current_night(&mut self, night: u32) -> Result<()> {
        self.set_value(CURRENT_NIGHT, SettingValue::Int(i64::from(clamp_night(night))))
    }

    pub fn clock_visible(&self) -> bool {
        self.bool(CLOCK_VISIBLE).unwrap_or(DEFAULT_CLOCK_VISIBLE)
    }

    pub fn set_clock_visible(&mut self, visible: bool) -> Result<()> {
        self.set_value(CLOCK_VISIBLE, SettingValue::Bool(visible))
    }

    pub fn clock_scale(&self) -> f64 {
        self.float(CLOCK_SCALE).unwrap_or(DEFAULT_CLOCK_SCALE)
    }

    pub fn set_clock_scale(&mut self, scale: f64) -> Result<()> {
        self.set_value(CLOCK_SCALE, SettingValue::Float(scale))
    }

    pub fn night_increment_segment(&self) -> Segment {
        self.get_value(NIGHT_INCREMENT_SEGMENT)
            .and_then(|value| value.as_str().and_then(Segment::from_name))
            .unwrap_or(Segment::Midnight)
    }

    pub fn set_night_increment_segment(&mut self, segment: Segment) -> Result<()> {
        self.set_value(NIGHT_INCREMENT_SEGMENT, segment.name().into())
    }

    pub fn lighting_integration(&self) -> bool {
        self.bool(LIGHTING_INTEGRATION).unwrap_or(DEFAULT_LIGHTING_INTEGRATION)
    }

    pub fn set_lighting_integration(&mut self, enabled: bool) -> Result<()> {
        self.set_value(LIGHTING_INTEGRATION, SettingValue::Bool(enabled))
    }

    /// Lighting baseline of the segment at `index`, `None` outside `0..=5`.
    pub fn environment_of(&self, index: usize) -> Option<LightingEnvironment> {
        let segment = Segment::from_index(index)?;
        let defaults = LightingEnvironment::default_for(segment);
        let [hue, luminosity, saturation, shadows, intensity] = registry::lighting_keys(segment);

        Some(LightingEnvironment {
            hue: self.float(&hue).unwrap_or(defaults.hue),
            luminosity: self.float(&luminosity).unwrap_or(defaults.luminosity),
            saturation: self.float(&saturation).unwrap_or(defaults.saturation),
            shadows: self.float(&shadows).unwrap_or(defaults.shadows),
            intensity: self.float(&intensity).unwrap_or(defaults.intensity),
        })
    }

    /// Store all five lighting baselines of `segment`.
    ///
    /// Every value is validated before anything is written.
    pub fn set_environment(
        &mut self,
        segment: Segment,
        environment: &LightingEnvironment,
    ) -> Result<()> {
        let keys = registry::lighting_keys(segment);
        let values = [
            environment.hue,
            environment.luminosity,
            environment.saturation,
            environment.shadows,
            environment.intensity,
        ];

        let mut validated = Vec::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(values) {
            let Some(definition) = registry::definition(key) else {
                anyhow::bail!("unknown setting '{}'", key);
            };
            let value = validate_value(&definition, SettingValue::Float(value))?;
            validated.push((definition.scope, value));
        }

        for (key, (scope, value)) in keys.iter().zip(validated) {
            self.store_mut(scope)
                .set(SETTINGS_NAMESPACE, key, value)
                .with_context(|| format!("Failed to store {key}"))?;
        }
        Ok(())
    }

    /// Restore the built-in lighting baselines of `segment`.
    pub fn reset_environment(&mut self, segment: Segment) -> Result<()> {
        for definition in registry::lighting_definitions(segment) {
            self.store_mut(definition.scope)
                .set(SETTINGS_NAMESPACE, &definition.key, definition.default)
                .with_context(|| format!("Failed to reset {}", definition.key))?;
        }
        Ok(())
    }

    /// Snapshot of the persisted clock state.
    pub fn state(&self) -> ClockState {
        ClockState {
            current_segment: self.current_segment(),
            current_night: self.current_night(),
            visible: self.clock_visible(),
        }
    }

    /// Changes to any setting, whichever store holds it.
    pub fn subscribe(&mut self) -> SettingChanges {
        let mut receivers = vec![self.shared.subscribe()];
        if let Some(personal) = self.personal.as_mut() {
            receivers.push(personal.subscribe());
        }
        SettingChanges::new(receivers)
    }

    /// Re-read every store. Returns the number of changed keys.
    pub fn reload(&mut self) -> Result<usize> {
        let mut changed = self.shared.reload()?;
        if let Some(personal) = self.personal.as_mut() {
            changed += personal.reload()?;
        }
        Ok(changed)
    }
}
