//! # nightclock
//!
//! A six-segment night clock: an overlay whose hand steps through Dusk, Nightfall,
//! Evening, Midnight, Witching and Twilight, a night counter that advances when the
//! hand enters a chosen segment, and optional scene lighting that follows the clock.
//!
//! ## Architecture
//!
//! - **Model**: `segment` (the six segments and their geometry) and `state` (segment,
//!   night counter and stepping rules)
//! - **Animation**: `arrow` plans hand transitions and runs their staged effects,
//!   `lighting` interpolates the scene between per-segment baselines
//! - **Coordination**: `controller` ties the model, animations, settings, overlay and
//!   sync channel together for one participant
//! - **Host seams**: `settings`, `sync`, `view`, `i18n` and `lighting::Scene` describe
//!   what the host provides; in-memory implementations back the tests and the binary
//! - **Infrastructure**: `timers`, `time_source`, `config`, `io`, `logger` and the CLI
//!   support in `args`, `commands` and `terminal`

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod arrow;
pub mod commands;
pub mod config;
pub mod constants;
pub mod controller;
pub mod i18n;
pub mod io;
pub mod lighting;
pub mod segment;
pub mod settings;
pub mod state;
pub mod sync;
pub mod terminal;
pub mod time_source;
pub mod timers;
pub mod view;

pub use controller::{ClockController, ClockHost, ClockTimings, Role};
pub use segment::Segment;
pub use state::{ClockState, Direction};
