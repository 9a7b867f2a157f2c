//! Shared constants: defaults, validation limits and identifiers.

// # Identity

/// Namespace used for every settings key and the sync channel name.
pub const SETTINGS_NAMESPACE: &str = "nightclock";
pub const CHANNEL_NAME: &str = "module.nightclock";

// # Cycle geometry

pub const SEGMENT_COUNT: usize = 6;
pub const DEGREES_PER_SEGMENT: u16 = 60;

// # Animation timing (milliseconds)

pub const DEFAULT_TRANSITION_DURATION: u64 = 1500;
pub const DEFAULT_SETTLE_DURATION: u64 = 600;
pub const DEFAULT_INTERPOLATION_DURATION: u64 = 7500;
pub const DEFAULT_INTERPOLATION_STEPS: u32 = 1000;

pub const MINIMUM_TRANSITION_DURATION: u64 = 100;
pub const MAXIMUM_TRANSITION_DURATION: u64 = 10_000;
pub const MINIMUM_SETTLE_DURATION: u64 = 0;
pub const MAXIMUM_SETTLE_DURATION: u64 = 5_000;
pub const MINIMUM_INTERPOLATION_DURATION: u64 = 0;
pub const MAXIMUM_INTERPOLATION_DURATION: u64 = 60_000;
pub const MINIMUM_INTERPOLATION_STEPS: u32 = 1;
pub const MAXIMUM_INTERPOLATION_STEPS: u32 = 10_000;

// # Settings defaults

pub const DEFAULT_CURRENT_SEGMENT: i64 = 0;
pub const DEFAULT_CURRENT_NIGHT: i64 = 1;
pub const MINIMUM_NIGHT: u32 = 1;
pub const DEFAULT_CLOCK_VISIBLE: bool = true;
pub const DEFAULT_CLOCK_SCALE: f64 = 1.0;
pub const MINIMUM_CLOCK_SCALE: f64 = 0.5;
pub const MAXIMUM_CLOCK_SCALE: f64 = 2.0;
pub const CLOCK_SCALE_STEP: f64 = 0.1;
pub const DEFAULT_NIGHT_INCREMENT_SEGMENT: &str = "midnight";
pub const DEFAULT_LIGHTING_INTEGRATION: bool = false;

/// Slider step for the per-segment lighting values.
pub const LIGHTING_STEP: f64 = 0.05;

// # Overlay geometry

pub const OVERLAY_WIDTH: u32 = 512;
pub const OVERLAY_HEIGHT: u32 = 512;
pub const OVERLAY_TOP: u32 = 50;
pub const OVERLAY_LEFT: u32 = 150;

// # Run loop

/// Longest the interactive loop waits for input before checking signals again.
pub const MAX_IDLE_WAIT_MS: u64 = 250;

/// Settings file events closer together than this are coalesced into one reload.
pub const SETTINGS_WATCH_QUIET_MS: u64 = 100;

/// Log a scene write every this many interpolation ticks in the terminal host.
pub const SCENE_LOG_EVERY: u32 = 100;

// # Exit code

pub const EXIT_FAILURE: i32 = 1;
