//! nightclock binary: argument dispatch and session setup.
//!
//! Parsing lives in `args`, the work in `commands`. This file only sets up logging,
//! the config directory and the configuration, then hands off to the command.

use anyhow::Result;

use nightclock::args::{CliAction, GlobalOptions, ParsedArgs};
use nightclock::commands;
use nightclock::config::{self, Config};
use nightclock::constants::EXIT_FAILURE;
use nightclock::logger::{Log, LoggerGuard};
use nightclock::{log_block_start, log_debug, log_end, log_error_exit, log_pipe, log_version};

fn main() -> Result<()> {
    let parsed = ParsedArgs::parse(std::env::args());

    match parsed.action {
        CliAction::ShowVersion => {
            println!("nightclock {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliAction::ShowHelp => {
            commands::help::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError(message) => {
            log_pipe!();
            log_error_exit!("{}", message);
            commands::help::show_usage();
            log_end!();
            std::process::exit(EXIT_FAILURE);
        }
        action => {
            // `get` output is meant for scripts
            let show_header = !matches!(action, CliAction::Get(_));
            let log_guard = start_session(&parsed.options, show_header)?;
            let config = match load_config(&parsed.options) {
                Ok(config) => config,
                Err(e) => exit_with_error(e, log_guard),
            };

            let result = match action {
                CliAction::Run => {
                    config.log_config();
                    commands::run::run_clock(&config)
                }
                CliAction::Status => commands::status::handle_status_command(&config),
                CliAction::SetNight(night) => {
                    commands::night::handle_night_command(&config, night)
                }
                CliAction::Get(keys) => commands::get::handle_get_command(&config, &keys),
                CliAction::Set(fields) => commands::set::handle_set_command(&config, &fields),
                CliAction::ResetLighting(segment) => {
                    commands::reset_lighting::handle_reset_lighting_command(&config, segment)
                }
                CliAction::ShowHelp
                | CliAction::ShowVersion
                | CliAction::ShowHelpDueToError(_) => Ok(()),
            };

            if let Err(e) = result {
                exit_with_error(e, log_guard);
            }
            Ok(())
        }
    }
}

/// Report `error` and exit, flushing the log file first.
fn exit_with_error(error: anyhow::Error, log_guard: Option<LoggerGuard>) -> ! {
    log_pipe!();
    log_error_exit!("{:#}", error);
    log_end!();
    drop(log_guard);
    std::process::exit(EXIT_FAILURE);
}

/// Apply `--debug` and `--log`, then print the header if asked to.
fn start_session(options: &GlobalOptions, show_header: bool) -> Result<Option<LoggerGuard>> {
    Log::set_debug(options.debug_enabled);

    let guard = match &options.log_file {
        Some(path) => Some(Log::start_file_logging(path.clone())?),
        None => None,
    };

    if show_header {
        log_version!();
    }
    if options.debug_enabled {
        log_pipe!();
        log_debug!("Debug mode enabled");
    }
    Ok(guard)
}

fn load_config(options: &GlobalOptions) -> Result<Config> {
    config::set_config_dir(options.config_dir.clone())?;
    if let Some(dir) = config::get_custom_config_dir() {
        log_block_start!("Using config directory: {}", config::display_path(&dir));
    }
    config::load()
}
