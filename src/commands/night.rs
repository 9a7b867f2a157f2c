//! `nightclock night N`: set the night counter.

use anyhow::Result;

use crate::config::Config;
use crate::settings::ClockSettings;

pub fn handle_night_command(config: &Config, night: u32) -> Result<()> {
    if !config.role().is_authoritative() {
        anyhow::bail!("Only the GM can change the night counter");
    }
    let mut settings = super::open_settings(config)?;
    set_night(&mut settings, night)?;
    super::notify_running_clock();
    log_end!();
    Ok(())
}

fn set_night(settings: &mut ClockSettings, night: u32) -> Result<()> {
    let previous = settings.current_night();
    settings.set_current_night(night)?;

    log_block_start!(
        "Night counter: {} → {}",
        previous,
        settings.current_night()
    );
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
    fn test_set_night_persists() {
        Log::set_enabled(false);
        let mut settings = ClockSettings::new(Box::new(MemorySettingsStore::new()));
        set_night(&mut settings, 7).unwrap();
        Log::set_enabled(true);
        assert_eq!(settings.current_night(), 7);
    }
}
