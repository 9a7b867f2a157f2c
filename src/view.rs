//! The overlay as a capability: markup in, user actions out.
//!
//! The controller never talks to a UI toolkit. It renders markup through an
//! [`OverlayView`], updates the night text, and drives the arrow through the view's
//! [`ArrowSurface`]. Clicks come back as [`UserAction`] values.

use std::sync::{Arc, Mutex, PoisonError};

use crate::arrow::{ArrowSurface, RecordingArrow};
use crate::constants::{OVERLAY_HEIGHT, OVERLAY_LEFT, OVERLAY_TOP, OVERLAY_WIDTH};
use crate::i18n::{self, Localizer};
use crate::state::ClockState;

/// Something the user clicked on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    PreviousTime,
    NextTime,
    /// Night counter edited to the given value.
    EditNight(u32),
    ToggleVisibility,
}

/// Rendering surface for the clock overlay.
pub trait OverlayView {
    /// Mount (or replace) the overlay markup.
    fn render(&mut self, markup: &str);

    fn close(&mut self);

    fn is_rendered(&self) -> bool;

    /// Update the night number without re-rendering.
    fn set_night(&mut self, night: u32);

    fn arrow(&mut self) -> &mut dyn ArrowSurface;
}

/// Overlay markup for `state`. GM controls are only emitted for the authoritative
/// participant.
pub fn overlay_markup(
    state: &ClockState,
    scale: f64,
    authoritative: bool,
    localizer: &dyn Localizer,
) -> String {
    let rotation = state.current_segment.rotation_degrees();
    let segment_title = localizer.localize(&i18n::segment_key(state.current_segment));

    let controls = if authoritative {
        format!(
            r#"
<div class="gm-controls">
<button id="prev-time" title="{}">◄</button>
<button id="next-time" title="{}">►</button>
</div>"#,
            escape(&localizer.localize(i18n::PREVIOUS_TIME)),
            escape(&localizer.localize(i18n::NEXT_TIME)),
        )
    } else {
        String::new()
    };

    format!(
        r#"<div id="nightclock-overlay" class="nightclock-overlay" style="top: {top}px; left: {left}px; width: {width}px; height: {height}px; transform: scale({scale:.1});">
<div class="clock-container">
<div class="clock-face" title="{segment}">
<div class="clock-arrow" id="clock-arrow-overlay" style="transform: translate(-50%, -100%) rotate({rotation}deg);"></div>
</div>
<div class="night-counter">
{night_label} <span class="night-number" id="night-number-overlay">{night}</span>
</div>{controls}
</div>
</div>"#,
        top = OVERLAY_TOP,
        left = OVERLAY_LEFT,
        width = OVERLAY_WIDTH,
        height = OVERLAY_HEIGHT,
        scale = scale,
        segment = escape(&segment_title),
        rotation = rotation,
        night_label = escape(&localizer.localize(i18n::NIGHT_LABEL)),
        night = state.current_night,
        controls = controls,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Default)]
struct ViewRecord {
    markup: Option<String>,
    renders: usize,
    closes: usize,
    night: Option<u32>,
}

/// View that records what the controller asked of it. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    record: Arc<Mutex<ViewRecord>>,
    arrow: RecordingArrow,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut ViewRecord) -> T) -> T {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }

    pub fn markup(&self) -> Option<String> {
        self.with_record(|record| record.markup.clone())
    }

    pub fn render_count(&self) -> usize {
        self.with_record(|record| record.renders)
    }

    pub fn close_count(&self) -> usize {
        self.with_record(|record| record.closes)
    }

    /// Night number last shown.
    pub fn night(&self) -> Option<u32> {
        self.with_record(|record| record.night)
    }

    /// Shared handle to the arrow surface.
    pub fn arrow_handle(&self) -> RecordingArrow {
        self.arrow.clone()
    }
}

impl OverlayView for RecordingView {
    fn render(&mut self, markup: &str) {
        self.with_record(|record| {
            record.markup = Some(markup.to_string());
            record.renders += 1;
        });
    }

    fn close(&mut self) {
        self.with_record(|record| {
            record.markup = None;
            record.closes += 1;
        });
    }

    fn is_rendered(&self) -> bool {
        self.with_record(|record| record.markup.is_some())
    }

    fn set_night(&mut self, night: u32) {
        self.with_record(|record| record.night = Some(night));
    }

    fn arrow(&mut self) -> &mut dyn ArrowSurface {
        &mut self.arrow
    }
}
