//! In-memory controller state and the change events it emits

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::{AdditionalProgramConfig, KeyIdentifier, SettingsSnapshot, StoredSettings};
use crate::constants::defaults;

/// A toggleable feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum Feature {
    AdditionalProgram,
    AutoClicker,
}

/// One of the two auto-clicker key binding slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum KeySlot {
    Trigger,
    Click,
}

impl KeySlot {
    pub const ALL: [KeySlot; 2] = [KeySlot::Trigger, KeySlot::Click];

    pub fn name(self) -> &'static str {
        match self {
            KeySlot::Trigger => "Trigger",
            KeySlot::Click => "Click",
        }
    }

    pub fn default_key(self) -> KeyIdentifier {
        match self {
            KeySlot::Trigger => defaults::TRIGGER_KEY,
            KeySlot::Click => defaults::CLICK_KEY,
        }
    }
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeySlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Trigger" => Ok(KeySlot::Trigger),
            "Click" => Ok(KeySlot::Click),
            other => Err(format!("unknown key slot: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureToggleState {
    pub enabled: bool,
}

/// Read-only view of a key binding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyBindingSlot {
    pub slot: KeySlot,
    pub bound_key: KeyIdentifier,
    pub is_recording: bool,
}

/// Emitted to listeners after every state mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    FeatureEnabled { feature: Feature, enabled: bool },
    AdditionalProgramPath(String),
    KeyBound { slot: KeySlot, key: KeyIdentifier },
    Recording { slot: KeySlot, recording: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ControllerState {
    pub additional_program: AdditionalProgramConfig,
    pub auto_clicker: FeatureToggleState,
    pub trigger_key: KeyIdentifier,
    pub click_key: KeyIdentifier,
    // A single field keeps "at most one slot recording" true by construction
    pub recording: Option<KeySlot>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            additional_program: AdditionalProgramConfig::default(),
            auto_clicker: FeatureToggleState::default(),
            trigger_key: KeySlot::Trigger.default_key(),
            click_key: KeySlot::Click.default_key(),
            recording: None,
        }
    }
}

impl ControllerState {
    pub fn from_stored(stored: &StoredSettings) -> Self {
        let defaults = Self::default();
        Self {
            additional_program: stored.additional_program.clone(),
            auto_clicker: FeatureToggleState {
                enabled: stored.auto_clicker_enabled,
            },
            trigger_key: stored.trigger_key.unwrap_or(defaults.trigger_key),
            click_key: stored.click_key.unwrap_or(defaults.click_key),
            recording: None,
        }
    }

    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::AdditionalProgram => self.additional_program.enabled,
            Feature::AutoClicker => self.auto_clicker.enabled,
        }
    }

    pub fn enabled_mut(&mut self, feature: Feature) -> &mut bool {
        match feature {
            Feature::AdditionalProgram => &mut self.additional_program.enabled,
            Feature::AutoClicker => &mut self.auto_clicker.enabled,
        }
    }

    pub fn bound_key(&self, slot: KeySlot) -> KeyIdentifier {
        match slot {
            KeySlot::Trigger => self.trigger_key,
            KeySlot::Click => self.click_key,
        }
    }

    pub fn bound_key_mut(&mut self, slot: KeySlot) -> &mut KeyIdentifier {
        match slot {
            KeySlot::Trigger => &mut self.trigger_key,
            KeySlot::Click => &mut self.click_key,
        }
    }

    pub fn slot(&self, slot: KeySlot) -> KeyBindingSlot {
        KeyBindingSlot {
            slot,
            bound_key: self.bound_key(slot),
            is_recording: self.recording == Some(slot),
        }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            additional_program: self.additional_program.clone(),
            auto_clicker_enabled: self.auto_clicker.enabled,
            trigger_key: self.trigger_key,
            click_key: self.click_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names() {
        assert_eq!(KeySlot::Trigger.to_string(), "Trigger");
        assert_eq!("Click".parse::<KeySlot>(), Ok(KeySlot::Click));
        assert!("click".parse::<KeySlot>().is_err());
    }

    #[test]
    fn test_from_stored_falls_back_per_slot() {
        let stored = StoredSettings {
            trigger_key: None,
            click_key: Some(KeyIdentifier::G),
            ..StoredSettings::default()
        };
        let state = ControllerState::from_stored(&stored);

        assert_eq!(state.trigger_key, KeyIdentifier::F8);
        assert_eq!(state.click_key, KeyIdentifier::G);
        assert_eq!(state.recording, None);
    }

    #[test]
    fn test_slot_view() {
        let mut state = ControllerState::default();
        state.recording = Some(KeySlot::Click);

        assert!(state.slot(KeySlot::Click).is_recording);
        assert!(!state.slot(KeySlot::Trigger).is_recording);
        assert_eq!(state.slot(KeySlot::Click).bound_key, KeyIdentifier::F);
    }
}
