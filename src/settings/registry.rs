//! Declarations of every clock setting.

use crate::constants::*;
use crate::lighting::LightingEnvironment;
use crate::segment::Segment;

use super::SettingValue;

pub const CURRENT_SEGMENT: &str = "currentSegment";
pub const CURRENT_NIGHT: &str = "currentNight";
pub const CLOCK_VISIBLE: &str = "clockVisible";
pub const CLOCK_SCALE: &str = "clockScale";
pub const NIGHT_INCREMENT_SEGMENT: &str = "nightIncrementSegment";
pub const LIGHTING_INTEGRATION: &str = "lightingIntegration";

/// Where a setting is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingScope {
    /// Shared by every participant; only the authoritative participant writes it.
    World,
    /// Per participant, kept across sessions.
    Client,
    /// Per participant and device.
    Local,
}

impl SettingScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingScope::World => "world",
            SettingScope::Client => "client",
            SettingScope::Local => "local",
        }
    }
}

/// Accepted shape of a setting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingKind {
    Bool,
    Int {
        min: i64,
        max: Option<i64>,
    },
    Float {
        min: f64,
        max: f64,
        step: Option<f64>,
    },
    /// A position on the color wheel in `[0, 1)`. A full turn (1.0) is stored as 0.0.
    Hue,
    /// One of a fixed set of names.
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingDefinition {
    pub key: String,
    pub name: String,
    pub hint: String,
    pub scope: SettingScope,
    pub kind: SettingKind,
    pub default: SettingValue,
}

const SEGMENT_NAMES: &[&str] = &[
    "dusk",
    "nightfall",
    "evening",
    "midnight",
    "witching",
    "twilight",
];

fn define(
    key: &str,
    name: &str,
    hint: &str,
    scope: SettingScope,
    kind: SettingKind,
    default: SettingValue,
) -> SettingDefinition {
    SettingDefinition {
        key: key.to_string(),
        name: name.to_string(),
        hint: hint.to_string(),
        scope,
        kind,
        default,
    }
}

/// The general clock settings, in display order.
pub fn general_definitions() -> Vec<SettingDefinition> {
    vec![
        define(
            CURRENT_SEGMENT,
            "Current Time Segment",
            "The current time segment (0-5)",
            SettingScope::World,
            SettingKind::Int {
                min: 0,
                max: Some(SEGMENT_COUNT as i64 - 1),
            },
            SettingValue::Int(DEFAULT_CURRENT_SEGMENT),
        ),
        define(
            CURRENT_NIGHT,
            "Current Night",
            "The current night number",
            SettingScope::World,
            SettingKind::Int {
                min: i64::from(MINIMUM_NIGHT),
                max: None,
            },
            SettingValue::Int(DEFAULT_CURRENT_NIGHT),
        ),
        define(
            CLOCK_VISIBLE,
            "Clock Visible",
            "Whether the clock overlay is visible",
            SettingScope::Local,
            SettingKind::Bool,
            SettingValue::Bool(DEFAULT_CLOCK_VISIBLE),
        ),
        define(
            CLOCK_SCALE,
            "Clock Scale",
            "Scale factor for the clock widget size (0.5-2.0)",
            SettingScope::Client,
            SettingKind::Float {
                min: MINIMUM_CLOCK_SCALE,
                max: MAXIMUM_CLOCK_SCALE,
                step: Some(CLOCK_SCALE_STEP),
            },
            SettingValue::Float(DEFAULT_CLOCK_SCALE),
        ),
        define(
            NIGHT_INCREMENT_SEGMENT,
            "Night Increment Segment",
            "Which time segment triggers the night counter to increment",
            SettingScope::World,
            SettingKind::Choice(SEGMENT_NAMES),
            SettingValue::Text(DEFAULT_NIGHT_INCREMENT_SEGMENT.to_string()),
        ),
        define(
            LIGHTING_INTEGRATION,
            "Lighting Integration",
            "Interpolate the scene lighting when the time segment changes",
            SettingScope::World,
            SettingKind::Bool,
            SettingValue::Bool(DEFAULT_LIGHTING_INTEGRATION),
        ),
    ]
}

/// Keys of the five lighting baselines of `segment`, in environment field order.
pub fn lighting_keys(segment: Segment) -> [String; 5] {
    let name = segment.name();
    [
        format!("{name}BaseHue"),
        format!("{name}BaseLuminosity"),
        format!("{name}BaseSaturation"),
        format!("{name}BaseShadows"),
        format!("{name}BaseIntensity"),
    ]
}

/// Lighting baseline settings of one segment.
pub fn lighting_definitions(segment: Segment) -> Vec<SettingDefinition> {
    let name = segment.name();
    let defaults = LightingEnvironment::default_for(segment);
    let [hue, luminosity, saturation, shadows, intensity] = lighting_keys(segment);
    let signed = SettingKind::Float {
        min: -1.0,
        max: 1.0,
        step: Some(LIGHTING_STEP),
    };
    let unsigned = SettingKind::Float {
        min: 0.0,
        max: 1.0,
        step: Some(LIGHTING_STEP),
    };

    vec![
        define(
            &hue,
            "Hue",
            &format!("Hue value for {name} lighting environment"),
            SettingScope::World,
            SettingKind::Hue,
            SettingValue::Float(defaults.hue),
        ),
        define(
            &luminosity,
            "Luminosity",
            &format!("Environment luminosity for {name} (-1 to 1)"),
            SettingScope::World,
            signed,
            SettingValue::Float(defaults.luminosity),
        ),
        define(
            &saturation,
            "Saturation",
            &format!("Environment saturation for {name} (-1 to 1)"),
            SettingScope::World,
            signed,
            SettingValue::Float(defaults.saturation),
        ),
        define(
            &shadows,
            "Shadows",
            &format!("Environment shadow intensity for {name} (0 to 1)"),
            SettingScope::World,
            unsigned,
            SettingValue::Float(defaults.shadows),
        ),
        define(
            &intensity,
            "Hue Intensity",
            &format!("Environment light intensity for {name} (0 to 1)"),
            SettingScope::World,
            unsigned,
            SettingValue::Float(defaults.intensity),
        ),
    ]
}

/// Every clock setting: the general ones followed by each segment's lighting.
pub fn definitions() -> Vec<SettingDefinition> {
    let mut all = general_definitions();
    for segment in Segment::ALL {
        all.extend(lighting_definitions(segment));
    }
    all
}

pub fn definition(key: &str) -> Option<SettingDefinition> {
    definitions().into_iter().find(|definition| definition.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let all = definitions();
        let mut keys: Vec<&str> = all.iter().map(|d| d.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), all.len());
        assert_eq!(all.len(), 6 + 6 * 5);
    }

    #[test]
    fn test_lighting_defaults_match_baselines() {
        let definition = definition("midnightBaseLuminosity").unwrap();
        assert_eq!(definition.default, SettingValue::Float(-1.0));
        assert_eq!(definition.scope, SettingScope::World);

        let hue = definition_for_hue(Segment::Twilight);
        assert_eq!(hue.default, SettingValue::Float(0.886611));
    }

    fn definition_for_hue(segment: Segment) -> SettingDefinition {
        lighting_definitions(segment).remove(0)
    }

    #[test]
    fn test_choice_lists_every_segment() {
        let definition = definition(NIGHT_INCREMENT_SEGMENT).unwrap();
        let SettingKind::Choice(choices) = definition.kind else {
            panic!("nightIncrementSegment should be a choice");
        };
        for segment in Segment::ALL {
            assert!(choices.contains(&segment.name()));
        }
        assert_eq!(definition.default, SettingValue::Text("midnight".into()));
    }

    #[test]
    fn test_unknown_key() {
        assert!(definition("sunsetTime").is_none());
    }
}
