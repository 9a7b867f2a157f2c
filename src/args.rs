//! Command-line argument parsing.
//!
//! ```text
//! nightclock [OPTIONS] [COMMAND]
//!
//! Commands:
//!   run                      Interactive terminal clock (default)
//!   status                   Print the persisted clock state
//!   night <N>                Set the night counter
//!   get [KEY...]             Show settings (all of them without keys)
//!   set <KEY> <VALUE> [...]  Change settings
//!   reset-lighting <SEGMENT> Restore a segment's lighting defaults
//!   help                     Show help
//!
//! Options:
//!   -c, --config <DIR>  Use DIR instead of ~/.config/nightclock
//!   -d, --debug         Show debug output with timestamps
//!   -l, --log <FILE>    Write output to FILE instead of the terminal
//!   -h, --help          Show help
//!   -V, --version       Show version
//! ```

use crate::segment::Segment;

/// Global options shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    pub log_file: Option<String>,
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run,
    Status,
    SetNight(u32),
    Get(Vec<String>),
    Set(Vec<(String, String)>),
    ResetLighting(Segment),
    ShowHelp,
    ShowVersion,
    /// Bad arguments; the message explains what was wrong.
    ShowHelpDueToError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub options: GlobalOptions,
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse `args`, skipping the program name.
    ///
    /// Help and version flags win over everything else. Unknown flags and extra
    /// positional arguments produce [`CliAction::ShowHelpDueToError`].
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = GlobalOptions::default();
        let mut positional = Vec::new();
        let mut show_help = false;
        let mut show_version = false;
        let mut error = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => show_help = true,
                "--version" | "-V" | "-v" => show_version = true,
                "--debug" | "-d" => options.debug_enabled = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) => options.config_dir = Some(dir.clone()),
                    None => error = Some(format!("{arg} requires a directory")),
                },
                "--log" | "-l" => match iter.next() {
                    Some(file) => options.log_file = Some(file.clone()),
                    None => error = Some(format!("{arg} requires a file path")),
                },
                // Negative numbers are values, for example `set duskBaseLuminosity -0.5`
                flag if flag.starts_with('-') && flag.parse::<f64>().is_err() => {
                    error.get_or_insert_with(|| format!("Unknown option: {flag}"));
                }
                _ => positional.push(arg.as_str()),
            }
        }

        let action = if show_version {
            CliAction::ShowVersion
        } else if show_help {
            CliAction::ShowHelp
        } else if let Some(message) = error {
            CliAction::ShowHelpDueToError(message)
        } else {
            parse_command(&positional)
        };

        ParsedArgs { options, action }
    }
}

fn parse_command(positional: &[&str]) -> CliAction {
    match positional {
        [] | ["run"] => CliAction::Run,
        ["status"] => CliAction::Status,
        ["help"] | ["help", _] => CliAction::ShowHelp,
        ["night", value] => match parse_night(value) {
            Some(night) => CliAction::SetNight(night),
            None => CliAction::ShowHelpDueToError(format!(
                "Night must be a whole number of at least 1 (got {value})"
            )),
        },
        ["night"] => CliAction::ShowHelpDueToError("night requires a number".to_string()),
        ["get", keys @ ..] => CliAction::Get(keys.iter().map(|key| key.to_string()).collect()),
        ["set", pairs @ ..] if !pairs.is_empty() && pairs.len() % 2 == 0 => CliAction::Set(
            pairs
                .chunks_exact(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                .collect(),
        ),
        ["set", ..] => CliAction::ShowHelpDueToError(
            "set requires <key> <value> pairs, for example: set lightingIntegration true"
                .to_string(),
        ),
        ["reset-lighting", segment] => match segment.parse::<Segment>() {
            Ok(segment) => CliAction::ResetLighting(segment),
            Err(e) => CliAction::ShowHelpDueToError(e.to_string()),
        },
        ["reset-lighting"] => {
            CliAction::ShowHelpDueToError("reset-lighting requires a segment".to_string())
        }
        [command, ..] if is_command(command) => {
            CliAction::ShowHelpDueToError(format!("Too many arguments for {command}"))
        }
        [unknown, ..] => CliAction::ShowHelpDueToError(format!("Unknown command: {unknown}")),
    }
}

fn is_command(word: &str) -> bool {
    matches!(
        word,
        "run" | "status" | "night" | "get" | "set" | "reset-lighting" | "help"
    )
}

fn parse_night(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|night| *night >= 1)
}
