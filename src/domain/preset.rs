use super::ids::PresetId;
use serde::{Deserialize, Serialize};

/// A saved contact usable as a split participant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub phone: String,
}

impl Preset {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: PresetId::new(),
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// First letter of the name, uppercased, for avatar badges.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("Alex", "555-111-2222"),
        Preset::new("Sam", "555-333-4444"),
    ]
}
