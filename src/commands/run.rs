//! `nightclock run`: the interactive terminal clock.
//!
//! Commands are read from stdin one per line:
//!
//! ```text
//! next | n         advance one segment
//! prev | p         step back one segment
//! night <N>        set the night counter
//! toggle | t       show or hide the overlay
//! status | s       print the current state
//! quit | q         stop the clock
//! ```
//!
//! The loop sleeps until the next animation or lighting deadline, waking at least every
//! `MAX_IDLE_WAIT_MS` to pick up input and signals. Settings written by other processes
//! are reloaded when the settings watcher or SIGUSR2 asks for it.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::constants::MAX_IDLE_WAIT_MS;
use crate::controller::{ClockController, ClockHost};
use crate::i18n::EnglishLocalizer;
use crate::io::lock::{acquire_lock, default_lock_path};
use crate::io::signals::{SignalMessage, setup_signal_handler};
use crate::settings::{SettingsWatcher, personal_settings_path};
use crate::sync::LocalBus;
use crate::terminal::{TerminalScene, TerminalView};
use crate::time_source::{RealTimeSource, TimeSource};
use crate::view::UserAction;

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Action(UserAction),
    Status,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parse a console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            [] => return Ok(None),
            ["next" | "n"] => ConsoleCommand::Action(UserAction::NextTime),
            ["prev" | "p"] => ConsoleCommand::Action(UserAction::PreviousTime),
            ["toggle" | "t"] => ConsoleCommand::Action(UserAction::ToggleVisibility),
            ["night", value] => {
                let night = value
                    .parse::<u32>()
                    .with_context(|| format!("'{value}' is not a night number"))?;
                ConsoleCommand::Action(UserAction::EditNight(night))
            }
            ["status" | "s"] => ConsoleCommand::Status,
            ["help" | "h" | "?"] => ConsoleCommand::Help,
            ["quit" | "q" | "exit"] => ConsoleCommand::Quit,
            _ => anyhow::bail!("Unknown command '{}' (try 'help')", line.trim()),
        };
        Ok(Some(command))
    }
}

/// Run the clock until `quit`, end of input or a shutdown signal.
pub fn run_clock(config: &Config) -> Result<()> {
    let lock_path = default_lock_path();
    let Some(_lock) = acquire_lock(&lock_path)? else {
        log_end!();
        return Ok(());
    };

    let signals = setup_signal_handler()?;
    let settings = super::open_settings(config)?;

    let settings_path = config.settings_path();
    let watched = vec![personal_settings_path(&settings_path), settings_path];
    if let Err(e) = SettingsWatcher::new(signals.signal_sender.clone(), watched).start() {
        log_warning!("Settings changes will need SIGUSR2 to apply: {:#}", e);
    }

    let bus = LocalBus::new();
    let (sender, inbox) = bus.join(false);
    let time: Arc<dyn TimeSource> = Arc::new(RealTimeSource::new());

    let host = ClockHost {
        role: config.role(),
        settings,
        scene: Box::new(TerminalScene::new()),
        channel: Box::new(sender),
        view: Box::new(TerminalView::new()),
        localizer: Box::new(EnglishLocalizer),
        time: time.clone(),
    };
    let mut controller = ClockController::with_timings(host, config.clock_timings());

    controller.initialize();
    if let Err(e) = controller.on_scene_ready() {
        log_warning!("Could not apply initial lighting: {}", e);
    }
    display_console_help();

    let input = spawn_input_reader()?;
    let mut input_open = true;

    while signals.is_running() {
        let reload_requested = drain_signals(&signals.signal_receiver);
        if !signals.is_running() {
            break;
        }

        if reload_requested {
            match controller.settings_mut().reload() {
                Ok(0) => log_debug!("Settings reloaded, nothing changed"),
                Ok(count) => log_decorated!("Picked up {} changed setting(s)", count),
                Err(e) => log_warning!("Settings reload failed: {:#}", e),
            }
        }

        for raw in inbox.try_iter() {
            if let Err(e) = controller.handle_json(&raw) {
                log_warning!("Dropped clock message: {}", e);
            }
        }

        controller.advance();

        let wait = idle_wait(controller.next_deadline(), time.now());
        if !input_open {
            // Input is gone; finish running animations, then stop.
            if controller.next_deadline().is_none() {
                break;
            }
            time.sleep(wait);
            continue;
        }

        match input.recv_timeout(wait) {
            Ok(line) => match ConsoleCommand::parse(&line) {
                Ok(Some(ConsoleCommand::Quit)) => break,
                Ok(Some(command)) => execute(&mut controller, command),
                Ok(None) => {}
                Err(e) => log_warning!("{}", e),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => input_open = false,
        }
    }

    controller.shutdown();
    log_block_start!("Clock stopped at {}", controller.state());
    log_end!();
    Ok(())
}

fn execute(controller: &mut ClockController, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Action(action) => {
            if matches!(action, UserAction::PreviousTime | UserAction::NextTime)
                && !controller.is_authoritative()
            {
                log_warning!("Only the GM can change the time");
                return;
            }
            if let Err(e) = controller.handle_action(action) {
                log_error!("{}", e);
            }
        }
        ConsoleCommand::Status => {
            let state = controller.state();
            log_block_start!("{}", state);
            if let Some(previous) = controller.previous_segment()
                && previous != state.current_segment
            {
                log_indented!("Arrow still at {}", previous.title());
            }
            if controller.is_animating() {
                log_indented!("Arrow animating");
            }
            if controller.is_interpolating() {
                log_indented!("Lighting transition running");
            }
        }
        ConsoleCommand::Help => display_console_help(),
        ConsoleCommand::Quit => {}
    }
}

/// Handle every pending signal message. Returns whether a settings reload was asked for;
/// several requests in one pass collapse into one reload.
fn drain_signals(receiver: &Receiver<SignalMessage>) -> bool {
    let mut reload_requested = false;
    for message in receiver.try_iter() {
        match message {
            SignalMessage::Shutdown => log_block_start!("Shutdown requested"),
            SignalMessage::Reload => reload_requested = true,
        }
    }
    reload_requested
}

/// How long to wait for input before the next timer is due.
fn idle_wait(next_deadline: Option<Duration>, now: Duration) -> Duration {
    let cap = Duration::from_millis(MAX_IDLE_WAIT_MS);
    next_deadline
        .map(|deadline| deadline.saturating_sub(now).min(cap))
        .unwrap_or(cap)
}

/// Forward stdin lines to the run loop. The channel closes at end of input.
fn spawn_input_reader() -> Result<Receiver<String>> {
    let (tx, rx) = channel();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn input thread")?;
    Ok(rx)
}

fn display_console_help() {
    log_block_start!("Commands: next, prev, night <N>, toggle, status, help, quit");
}
