//! `nightclock status`: print the persisted clock state.

use anyhow::Result;

use crate::config::Config;
use crate::settings::ClockSettings;

pub fn handle_status_command(config: &Config) -> Result<()> {
    let settings = super::open_settings(config)?;
    display_status(&settings);
    Ok(())
}

fn display_status(settings: &ClockSettings) {
    let state = settings.state();
    let segment = state.current_segment;

    log_block_start!("Clock status");
    log_indented!(
        "Segment: {} ({} of 6, {}°)",
        segment.title(),
        segment.index() + 1,
        segment.rotation_degrees()
    );
    log_indented!("Night: {}", state.current_night);
    log_indented!(
        "Night advances entering: {}",
        settings.night_increment_segment().title()
    );
    log_indented!(
        "Overlay: {} at scale {:.1}",
        if state.visible { "visible" } else { "hidden" },
        settings.clock_scale()
    );

    if settings.lighting_integration() {
        log_block_start!("Lighting integration enabled");
        if let Some(environment) = settings.environment_of(segment.index()) {
            log_indented!("Hue: {:.3}", environment.hue);
            log_indented!("Luminosity: {:.2}", environment.luminosity);
            log_indented!("Saturation: {:.2}", environment.saturation);
            log_indented!("Shadows: {:.2}", environment.shadows);
            log_indented!("Intensity: {:.2}", environment.intensity);
        }
    } else {
        log_block_start!("Lighting integration disabled");
    }
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Log;
    use crate::settings::MemorySettingsStore;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_status_reads_without_writing() {
        Log::set_enabled(false);
        let settings = ClockSettings::new(Box::new(MemorySettingsStore::new()));
        display_status(&settings);
        Log::set_enabled(true);
        assert_eq!(settings.current_night(), 1);
    }
}
