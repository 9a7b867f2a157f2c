//! Default config file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::*;

/// Write a commented default `nightclock.toml` to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Contents of the default config file.
pub fn default_config_content() -> String {
    let mut content = ConfigBuilder::new()
        .add_section("Participant")
        .add_setting(
            "role",
            "\"gm\"",
            "\"gm\" drives the clock, \"player\" follows it",
        )
        .add_section("Animation")
        .add_setting(
            "transition_duration",
            &DEFAULT_TRANSITION_DURATION.to_string(),
            &format!(
                "Arrow transition in milliseconds ({MINIMUM_TRANSITION_DURATION}-{MAXIMUM_TRANSITION_DURATION})"
            ),
        )
        .add_setting(
            "settle_duration",
            &DEFAULT_SETTLE_DURATION.to_string(),
            &format!(
                "Settle effect after a transition in milliseconds ({MINIMUM_SETTLE_DURATION}-{MAXIMUM_SETTLE_DURATION})"
            ),
        )
        .add_section("Lighting")
        .add_setting(
            "interpolation_duration",
            &DEFAULT_INTERPOLATION_DURATION.to_string(),
            &format!(
                "Lighting interpolation in milliseconds ({MINIMUM_INTERPOLATION_DURATION}-{MAXIMUM_INTERPOLATION_DURATION})"
            ),
        )
        .add_setting(
            "interpolation_steps",
            &DEFAULT_INTERPOLATION_STEPS.to_string(),
            &format!(
                "Interpolation ticks ({MINIMUM_INTERPOLATION_STEPS}-{MAXIMUM_INTERPOLATION_STEPS})"
            ),
        )
        .build();

    content.push_str("\n\n#[Storage]\n");
    content.push_str("# settings_file = \"~/.local/state/nightclock/settings.toml\"\n");
    content
}

struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// Render with every comment aligned one column past the longest setting.
    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                Entry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    let padding = " ".repeat(width - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }
        lines.join("\n")
    }
}
