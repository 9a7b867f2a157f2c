//! Help and usage output.

/// Show brief usage (used for argument errors).
pub fn show_usage() {
    log_block_start!("Usage: nightclock [OPTIONS] [COMMAND]");
}

/// Display the full help text.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: nightclock [OPTIONS] [COMMAND]");
    log_block_start!("Commands:");
    log_indented!("run                      Interactive terminal clock (default)");
    log_indented!("status                   Show the persisted clock state");
    log_indented!("night <N>                Set the night counter (N >= 1)");
    log_indented!("get [KEY...]             Show settings (all of them without keys)");
    log_indented!("set <KEY> <VALUE> [...]  Change settings, for example:");
    log_indented!("                           set lightingIntegration true");
    log_indented!("                           set midnightBaseLuminosity -0.8");
    log_indented!("reset-lighting <SEGMENT> Restore a segment's lighting defaults");
    log_indented!("help                     Show this help");
    log_block_start!("Options:");
    log_indented!("-c, --config <DIR>  Use DIR instead of ~/.config/nightclock");
    log_indented!("-d, --debug         Show debug output with timestamps");
    log_indented!("-l, --log <FILE>    Write output to FILE");
    log_indented!("-h, --help          Show this help");
    log_indented!("-V, --version       Show version");
    log_block_start!("Segments:");
    log_indented!("dusk, nightfall, evening, midnight, witching, twilight (or 0-5)");
    log_end!();
}
