//! Terminal stand-ins for the scene and overlay, used by `nightclock run`.
//!
//! Nothing is drawn. Each capability reports what it was asked to do through the
//! logging macros so the clock can be driven and watched from a shell.

use anyhow::Result;

use crate::arrow::{ArrowEffect, ArrowSurface};
use crate::constants::SCENE_LOG_EVERY;
use crate::lighting::{LightingEnvironment, Scene};
use crate::view::OverlayView;

/// Scene that logs lighting writes.
///
/// Interpolations write hundreds of frames, so only every `SCENE_LOG_EVERY`th write
/// is printed. The rest show up under `--debug`.
#[derive(Debug, Default)]
pub struct TerminalScene {
    writes: u32,
}

impl TerminalScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> u32 {
        self.writes
    }
}

impl Scene for TerminalScene {
    fn update_environment(&mut self, environment: &LightingEnvironment) -> Result<()> {
        self.writes += 1;
        if self.writes % SCENE_LOG_EVERY == 1 {
            log_decorated!("Scene lighting: {}", environment);
        } else {
            log_debug!("Scene lighting #{}: {}", self.writes, environment);
        }
        Ok(())
    }
}

/// Arrow that logs effects and rotations.
#[derive(Debug, Default)]
pub struct TerminalArrow {
    rotation: Option<u16>,
}

impl TerminalArrow {
    pub fn rotation(&self) -> Option<u16> {
        self.rotation
    }
}

impl ArrowSurface for TerminalArrow {
    fn play(&mut self, effect: ArrowEffect) {
        match effect {
            ArrowEffect::Named {
                animation_id,
                duration,
            } => log_decorated!("Arrow: {} ({}ms)", animation_id, duration.as_millis()),
            ArrowEffect::Settle {
                rotation_degrees,
                duration,
            } => log_debug!(
                "Arrow settles at {}° ({}ms)",
                rotation_degrees,
                duration.as_millis()
            ),
            ArrowEffect::SmoothRotate {
                rotation_degrees,
                duration,
            } => log_decorated!(
                "Arrow rotates to {}° ({}ms)",
                rotation_degrees,
                duration.as_millis()
            ),
        }
    }

    fn clear_effects(&mut self) {
        log_debug!("Arrow effects cleared");
    }

    fn set_rotation(&mut self, degrees: u16) {
        if self.rotation != Some(degrees) {
            log_debug!("Arrow at {}°", degrees);
        }
        self.rotation = Some(degrees);
    }
}

/// Overlay that keeps the last markup and logs changes.
#[derive(Debug, Default)]
pub struct TerminalView {
    markup: Option<String>,
    night: Option<u32>,
    arrow: TerminalArrow,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn night(&self) -> Option<u32> {
        self.night
    }
}

impl OverlayView for TerminalView {
    fn render(&mut self, markup: &str) {
        log_decorated!("Overlay shown");
        log_debug!("Overlay markup: {} bytes", markup.len());
        self.markup = Some(markup.to_string());
    }

    fn close(&mut self) {
        if self.markup.take().is_some() {
            log_decorated!("Overlay hidden");
        }
    }

    fn is_rendered(&self) -> bool {
        self.markup.is_some()
    }

    fn set_night(&mut self, night: u32) {
        if self.night != Some(night) {
            log_decorated!("Night {}", night);
        }
        self.night = Some(night);
    }

    fn arrow(&mut self) -> &mut dyn ArrowSurface {
        &mut self.arrow
    }
}
