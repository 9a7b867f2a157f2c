//! Checks a value against its setting definition before it is stored.

use anyhow::Result;

use super::SettingValue;
use super::registry::{SettingDefinition, SettingKind};
use crate::lighting::normalize_hue;

/// Validate `value` for `definition`, returning the value as it should be stored.
///
/// Integers are accepted for float settings and stored as floats. Float settings with a
/// step are rounded to the nearest step. Hues are wrapped onto `[0, 1)`.
pub fn validate_value(definition: &SettingDefinition, value: SettingValue) -> Result<SettingValue> {
    let key = &definition.key;

    match definition.kind {
        SettingKind::Bool => match value {
            SettingValue::Bool(_) => Ok(value),
            other => anyhow::bail!("{} must be a boolean, got {}", key, other.type_name()),
        },
        SettingKind::Int { min, max } => {
            let Some(number) = value.as_int() else {
                anyhow::bail!("{} must be an integer, got {}", key, value.type_name());
            };
            if number < min {
                anyhow::bail!("{} ({}) must be at least {}", key, number, min);
            }
            if let Some(max) = max
                && number > max
            {
                anyhow::bail!("{} ({}) must be between {} and {}", key, number, min, max);
            }
            Ok(SettingValue::Int(number))
        }
        SettingKind::Float { min, max, step } => {
            let Some(number) = value.as_float() else {
                anyhow::bail!("{} must be a number, got {}", key, value.type_name());
            };
            if !number.is_finite() {
                anyhow::bail!("{} must be a finite number", key);
            }
            if !(min..=max).contains(&number) {
                anyhow::bail!("{} ({}) must be between {} and {}", key, number, min, max);
            }
            let number = match step {
                Some(step) => round_to_step(number, min, step).clamp(min, max),
                None => number,
            };
            Ok(SettingValue::Float(number))
        }
        SettingKind::Hue => {
            let Some(number) = value.as_float() else {
                anyhow::bail!("{} must be a number, got {}", key, value.type_name());
            };
            if !(0.0..=1.0).contains(&number) {
                anyhow::bail!("{} ({}) must be between 0 and 1", key, number);
            }
            Ok(SettingValue::Float(normalize_hue(number)))
        }
        SettingKind::Choice(choices) => {
            let Some(choice) = value.as_str() else {
                anyhow::bail!("{} must be a string, got {}", key, value.type_name());
            };
            if !choices.contains(&choice) {
                anyhow::bail!(
                    "{} must be one of: {} (got '{}')",
                    key,
                    choices.join(", "),
                    choice
                );
            }
            Ok(value)
        }
    }
}

/// Parse command-line text into a value of the shape `definition` expects.
///
/// Only the shape is checked here; ranges and choices are left to [`validate_value`].
pub fn parse_value(definition: &SettingDefinition, text: &str) -> Result<SettingValue> {
    let key = &definition.key;
    let text = text.trim();

    let value = match definition.kind {
        SettingKind::Bool => match text.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => SettingValue::Bool(true),
            "false" | "no" | "off" | "0" => SettingValue::Bool(false),
            _ => anyhow::bail!("{} must be true or false (got '{}')", key, text),
        },
        SettingKind::Int { .. } => match text.parse::<i64>() {
            Ok(number) => SettingValue::Int(number),
            Err(_) => anyhow::bail!("{} must be a whole number (got '{}')", key, text),
        },
        SettingKind::Float { .. } | SettingKind::Hue => match text.parse::<f64>() {
            Ok(number) => SettingValue::Float(number),
            Err(_) => anyhow::bail!("{} must be a number (got '{}')", key, text),
        },
        SettingKind::Choice(_) => SettingValue::Text(text.to_lowercase()),
    };
    Ok(value)
}

/// Round to the nearest multiple of `step` above `min`, trimming float noise.
fn round_to_step(value: f64, min: f64, step: f64) -> f64 {
    let steps = ((value - min) / step).round();
    let rounded = min + steps * step;
    (rounded * 1e9).round() / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::lerp_hue;
    use crate::settings::registry::{self, CLOCK_SCALE, CURRENT_NIGHT, CURRENT_SEGMENT};

    fn definition(key: &str) -> SettingDefinition {
        registry::definition(key).unwrap()
    }

    #[test]
    fn test_segment_range() {
        let definition = definition(CURRENT_SEGMENT);
        assert_eq!(
            validate_value(&definition, SettingValue::Int(5)).unwrap(),
            SettingValue::Int(5)
        );
        assert!(validate_value(&definition, SettingValue::Int(6)).is_err());
        assert!(validate_value(&definition, SettingValue::Int(-1)).is_err());
        assert!(validate_value(&definition, SettingValue::Float(2.0)).is_err());
    }

    #[test]
    fn test_night_has_no_upper_bound() {
        let definition = definition(CURRENT_NIGHT);
        assert!(validate_value(&definition, SettingValue::Int(10_000)).is_ok());
        let err = validate_value(&definition, SettingValue::Int(0)).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_scale_rounds_to_step() {
        let definition = definition(CLOCK_SCALE);
        assert_eq!(
            validate_value(&definition, SettingValue::Float(1.26)).unwrap(),
            SettingValue::Float(1.3)
        );
        assert_eq!(
            validate_value(&definition, SettingValue::Int(2)).unwrap(),
            SettingValue::Float(2.0)
        );
        assert!(validate_value(&definition, SettingValue::Float(2.5)).is_err());
        assert!(validate_value(&definition, SettingValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_choice_membership() {
        let definition = definition(registry::NIGHT_INCREMENT_SEGMENT);
        assert!(validate_value(&definition, "dusk".into()).is_ok());
        let err = validate_value(&definition, "noon".into()).unwrap_err();
        assert!(err.to_string().contains("must be one of"));
    }

    #[test]
    fn test_hue_is_not_stepped() {
        let definition = definition("nightfallBaseHue");
        assert_eq!(
            validate_value(&definition, SettingValue::Float(0.011111)).unwrap(),
            SettingValue::Float(0.011111)
        );
    }

    #[test]
    fn test_full_turn_hue_is_stored_as_zero() {
        let definition = definition("duskBaseHue");
        let stored = validate_value(&definition, SettingValue::Float(1.0)).unwrap();
        assert_eq!(stored, SettingValue::Float(0.0));

        let hue = stored.as_float().unwrap();
        assert_eq!(lerp_hue(hue, hue, 0.5), hue);

        assert!(validate_value(&definition, SettingValue::Float(1.01)).is_err());
        assert!(validate_value(&definition, SettingValue::Float(-0.1)).is_err());
    }

    #[test]
    fn test_parse_follows_setting_kind() {
        assert_eq!(
            parse_value(&definition(registry::LIGHTING_INTEGRATION), "on").unwrap(),
            SettingValue::Bool(true)
        );
        assert_eq!(
            parse_value(&definition(CURRENT_NIGHT), "12").unwrap(),
            SettingValue::Int(12)
        );
        assert_eq!(
            parse_value(&definition("witchingBaseLuminosity"), "-0.35").unwrap(),
            SettingValue::Float(-0.35)
        );
        assert_eq!(
            parse_value(&definition(registry::NIGHT_INCREMENT_SEGMENT), "Dusk").unwrap(),
            SettingValue::Text("dusk".into())
        );

        assert!(parse_value(&definition(registry::LIGHTING_INTEGRATION), "maybe").is_err());
        assert!(parse_value(&definition(CURRENT_NIGHT), "2.5").is_err());
        assert!(parse_value(&definition(CLOCK_SCALE), "big").is_err());
    }

    #[test]
    fn test_bool_rejects_other_types() {
        let definition = definition(registry::LIGHTING_INTEGRATION);
        assert!(validate_value(&definition, SettingValue::Int(1)).is_err());
        assert!(validate_value(&definition, true.into()).is_ok());
    }
}
