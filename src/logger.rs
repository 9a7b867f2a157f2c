//! Structured logging with box-drawing output.
//!
//! Every message goes through [`write_output`], which prints to stdout or, when file
//! logging is active, hands the line to a background writer thread with the ANSI colour
//! codes stripped.
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a new block (`┃` spacer, then `┣ message`). Use it for
//!   state changes such as "Advancing to midnight" or "Loaded configuration".
//! - **`log_decorated!`** continues a block (`┣ message`).
//! - **`log_indented!`** lists details under a block line (`┃   message`).
//! - **`log_pipe!`** inserts a bare `┃` before a semantic message that starts its own block.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_critical!`** carry a `[LEVEL]` tag.
//! - **`log_debug!`** is only printed when debug output was switched on with
//!   [`Log::set_debug`].
//! - **`log_version!`** / **`log_end!`** open and close the whole session.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

// Set once when --log is given
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Global switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    ///
    /// Used to keep the terminal quiet while a command prints its own report.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Turn `log_debug!` output on or off. Debug mode also adds timestamps.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Start routing output to `file_path`.
    ///
    /// The returned guard flushes and joins the writer thread when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut file = std::fs::File::create(&file_path)?;

                loop {
                    match rx.recv() {
                        Ok(LogMessage::Formatted(text)) => {
                            file.write_all(text.as_bytes())?;
                        }
                        Ok(LogMessage::Shutdown) | Err(_) => {
                            file.flush()?;
                            break;
                        }
                    }
                }

                Ok::<(), anyhow::Error>(())
            })?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix for the current line, empty unless debug mode is on.
    pub fn get_timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S%.3f"))
        } else {
            String::new()
        }
    }
}

/// Keeps the file writer alive; dropping it flushes the log file.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` colour sequences.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Public so the exported macros can reach it
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Shared body of the line-oriented macros: `decorate` receives the prefix and message.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($layout:literal, $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($($arg)*);
            let formatted = format!($layout, prefix = prefix, message = message);
            $crate::logger::write_output(&formatted);
        }
    }};
}

/// Log a message that continues the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣ {message}\n", $($arg)*)
    };
}

/// Log a detail line under the current block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃   {message}\n", $($arg)*)
    };
}

/// Log a bare pipe for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_line!("{prefix}┃{message}\n", "")
    };
}

/// Open a new block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┣ {message}\n", $($arg)*)
    };
}

/// Log the session header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!(
            "{prefix}┏ nightclock v{message} ━━╸\n",
            "{}",
            env!("CARGO_PKG_VERSION")
        )
    };
}

/// Log the session terminator.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_line!("{prefix}╹{message}\n", "")
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n", $($arg)*)
    };
}

/// Log an error that ends the session (`┗` corner).
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n", $($arg)*)
    };
}

/// Debug line, suppressed unless [`Log::set_debug`] was enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if $crate::logger::Log::is_debug() {
            $crate::__log_line!("{prefix}┣[\x1b[36mDEBUG\x1b[0m] {message}\n", $($arg)*)
        }
    }};
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mCRITICAL\x1b[0m] {message}\n", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "┣[\x1b[33mWARNING\x1b[0m] scene missing";
        assert_eq!(strip_ansi_codes(colored), "┣[WARNING] scene missing");
        assert_eq!(strip_ansi_codes("plain"), "plain");
    }

    #[test]
    fn test_lone_escape_is_kept() {
        assert_eq!(strip_ansi_codes("a\x1bb"), "a\x1bb");
    }

    #[test]
    #[serial]
    fn test_debug_toggles_timestamps() {
        Log::set_debug(false);
        assert!(Log::get_timestamp_prefix().is_empty());

        Log::set_debug(true);
        assert!(Log::is_debug());
        let prefix = Log::get_timestamp_prefix();
        assert!(prefix.starts_with('[') && prefix.ends_with("] "));

        Log::set_debug(false);
    }

    #[test]
    #[serial]
    fn test_enable_flag_round_trip() {
        Log::set_enabled(false);
        assert!(!Log::is_enabled());
        Log::set_enabled(true);
        assert!(Log::is_enabled());
    }
}
