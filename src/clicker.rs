//! Auto-clicker service seam
//!
//! The controller pushes every enabled/key change into the service as soon as
//! it happens, independent of whether the change has been persisted yet.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::config::KeyIdentifier;
use crate::constants::defaults;

/// Properties of the running auto-clicker that the settings controller drives
pub trait AutoClickerService: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn set_trigger_key(&self, key: KeyIdentifier);
    fn set_click_key(&self, key: KeyIdentifier);
}

/// Current auto-clicker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickerConfig {
    pub enabled: bool,
    pub trigger_key: KeyIdentifier,
    pub click_key: KeyIdentifier,
}

impl Default for ClickerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger_key: defaults::TRIGGER_KEY,
            click_key: defaults::CLICK_KEY,
        }
    }
}

/// Shared handle to the auto-clicker configuration
///
/// Clones share the same state, so the input hook thread can read what the
/// settings controller writes.
#[derive(Debug, Clone, Default)]
pub struct AutoClicker {
    config: Arc<Mutex<ClickerConfig>>,
}

impl AutoClicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> ClickerConfig {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut ClickerConfig)) {
        let mut config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut config);
        debug!(config = ?*config, "Auto-clicker configuration updated");
    }
}

impl AutoClickerService for AutoClicker {
    fn set_enabled(&self, enabled: bool) {
        self.update(|config| config.enabled = enabled);
    }

    fn set_trigger_key(&self, key: KeyIdentifier) {
        self.update(|config| config.trigger_key = key);
    }

    fn set_click_key(&self, key: KeyIdentifier) {
        self.update(|config| config.click_key = key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let clicker = AutoClicker::new();
        assert_eq!(
            clicker.config(),
            ClickerConfig {
                enabled: false,
                trigger_key: KeyIdentifier::F8,
                click_key: KeyIdentifier::F,
            }
        );
    }

    #[test]
    fn test_clones_share_state() {
        let clicker = AutoClicker::new();
        let hook_side = clicker.clone();

        clicker.set_enabled(true);
        clicker.set_trigger_key(KeyIdentifier::F9);
        clicker.set_click_key(KeyIdentifier::Space);

        let config = hook_side.config();
        assert!(config.enabled);
        assert_eq!(config.trigger_key, KeyIdentifier::F9);
        assert_eq!(config.click_key, KeyIdentifier::Space);
    }
}
