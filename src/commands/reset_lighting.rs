//! `nightclock reset-lighting SEGMENT`: restore a segment's lighting baseline.

use anyhow::Result;

use crate::config::Config;
use crate::lighting::LightingEnvironment;
use crate::segment::Segment;
use crate::settings::ClockSettings;

pub fn handle_reset_lighting_command(config: &Config, segment: Segment) -> Result<()> {
    if !config.role().is_authoritative() {
        anyhow::bail!("Only the GM can change the lighting baselines");
    }
    let mut settings = super::open_settings(config)?;
    reset_lighting(&mut settings, segment)?;
    super::notify_running_clock();
    log_end!();
    Ok(())
}

fn reset_lighting(settings: &mut ClockSettings, segment: Segment) -> Result<()> {
    settings.reset_environment(segment)?;

    log_block_start!("Restored {} lighting", segment.title());
    log_indented!("{}", LightingEnvironment::default_for(segment));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Log;
    use crate::settings::MemorySettingsStore;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_reset_restores_defaults() {
        Log::set_enabled(false);
        let mut settings = ClockSettings::new(Box::new(MemorySettingsStore::new()));
        let dimmed = LightingEnvironment {
            intensity: 0.1,
            ..LightingEnvironment::default_for(Segment::Evening)
        };
        settings.set_environment(Segment::Evening, &dimmed).unwrap();

        reset_lighting(&mut settings, Segment::Evening).unwrap();
        Log::set_enabled(true);

        assert_eq!(
            settings.environment_of(Segment::Evening.index()),
            Some(LightingEnvironment::default_for(Segment::Evening))
        );
    }
}
