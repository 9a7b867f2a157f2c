//! Localized strings for the overlay.

use crate::segment::Segment;

pub const PREVIOUS_TIME: &str = "NIGHTCLOCK.controls.previousTime";
pub const NEXT_TIME: &str = "NIGHTCLOCK.controls.nextTime";
pub const TOGGLE_CLOCK: &str = "NIGHTCLOCK.controls.toggleClock";
pub const NIGHT_LABEL: &str = "NIGHTCLOCK.night";
pub const EDIT_NIGHT_TITLE: &str = "NIGHTCLOCK.dialog.editNightCounter.title";
pub const EDIT_NIGHT_CONTENT: &str = "NIGHTCLOCK.dialog.editNightCounter.content";

/// Host string lookup. Unknown keys come back unchanged.
pub trait Localizer {
    fn localize(&self, key: &str) -> String;
}

/// Built-in English strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn localize(&self, key: &str) -> String {
        let text = match key {
            PREVIOUS_TIME => "Previous time segment",
            NEXT_TIME => "Next time segment",
            TOGGLE_CLOCK => "Toggle Night Clock",
            NIGHT_LABEL => "Night",
            EDIT_NIGHT_TITLE => "Edit Night Counter",
            EDIT_NIGHT_CONTENT => "Enter the new night number:",
            _ => match key
                .strip_prefix("NIGHTCLOCK.segments.")
                .and_then(Segment::from_name)
            {
                Some(segment) => segment.title(),
                None => key,
            },
        };
        text.to_string()
    }
}

/// Localization key of a segment's display name.
pub fn segment_key(segment: Segment) -> String {
    format!("NIGHTCLOCK.segments.{}", segment.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_keys() {
        let en = EnglishLocalizer;
        assert_eq!(en.localize(NEXT_TIME), "Next time segment");
        assert_eq!(en.localize(&segment_key(Segment::Witching)), "Witching");
        assert_eq!(en.localize("NIGHTCLOCK.missing"), "NIGHTCLOCK.missing");
    }
}
