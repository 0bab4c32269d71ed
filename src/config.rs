use crate::error::Result;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Runtime settings. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Delay before the "Split this bill?" prompt fires.
    pub payment_prompt_delay_secs: u64,
    pub reminder_delay_secs: u64,
    pub incoming_prompt_delay_secs: u64,
    /// How many presets get a quick-split button on the payment prompt.
    pub quick_split_presets: usize,
    pub log_level: String,
    /// Start with the built-in Alex and Sam contacts.
    pub seed_presets: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            payment_prompt_delay_secs: 8,
            reminder_delay_secs: 1,
            incoming_prompt_delay_secs: 5,
            quick_split_presets: 2,
            log_level: "info".to_string(),
            seed_presets: true,
        }
    }
}

impl AppConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn payment_prompt_delay(&self) -> Duration {
        Duration::from_secs(self.payment_prompt_delay_secs)
    }

    pub fn reminder_delay(&self) -> Duration {
        Duration::from_secs(self.reminder_delay_secs)
    }

    pub fn incoming_prompt_delay(&self) -> Duration {
        Duration::from_secs(self.incoming_prompt_delay_secs)
    }
}
