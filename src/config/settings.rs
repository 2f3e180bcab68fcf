//! Launcher settings as persisted in the settings store
//!
//! Loading is lenient: absent or unparsable values fall back to defaults and
//! key bindings that fail to parse are reported as `None` so the caller keeps
//! whatever it already had.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::KeyIdentifier;
use crate::config::store::{SettingValue, SettingsStore};
use crate::constants::keys;

/// Strip whitespace and surrounding `"` characters from a path
pub fn clean_path(path: &str) -> String {
    path.trim().trim_matches('"').trim().to_string()
}

/// The additional program launched alongside the game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdditionalProgramConfig {
    pub enabled: bool,
    /// Unquoted path, empty when unset
    pub path: String,
}

/// Raw settings as read from the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSettings {
    pub additional_program: AdditionalProgramConfig,
    pub auto_clicker_enabled: bool,
    /// `None` when the stored value is absent or names no known key
    pub trigger_key: Option<KeyIdentifier>,
    pub click_key: Option<KeyIdentifier>,
}

/// Everything written back on save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSnapshot {
    pub additional_program: AdditionalProgramConfig,
    pub auto_clicker_enabled: bool,
    pub trigger_key: KeyIdentifier,
    pub click_key: KeyIdentifier,
}

fn parse_flag(key: &str, value: Option<SettingValue>) -> bool {
    match value {
        None => false,
        Some(value) => value.as_bool().unwrap_or_else(|| {
            warn!(key, value = %value, "Unparsable boolean setting, using false");
            false
        }),
    }
}

fn parse_key(key: &str, value: Option<SettingValue>) -> Option<KeyIdentifier> {
    let text = value?.into_text();
    let text = text.trim().trim_matches('"');
    match text.parse::<KeyIdentifier>() {
        Ok(parsed) => {
            debug!(key, parsed = %parsed, "Key binding parsed");
            Some(parsed)
        }
        Err(err) => {
            warn!(key, error = %err, "Ignoring unparsable key binding");
            None
        }
    }
}

async fn read(store: &dyn SettingsStore, key: &str) -> Result<Option<SettingValue>> {
    store
        .read(key)
        .await
        .with_context(|| format!("Failed to read setting {key}"))
}

impl StoredSettings {
    /// Read all five settings from the store
    ///
    /// Only store failures are errors; bad values are recovered here.
    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        let program_enabled = read(store, keys::ADDITIONAL_PROGRAM_ENABLED).await?;
        let program_path = read(store, keys::ADDITIONAL_PROGRAM_PATH).await?;
        let clicker_enabled = read(store, keys::AUTO_CLICKER_ENABLED).await?;
        let trigger_key = read(store, keys::AUTO_CLICKER_TRIGGER_KEY).await?;
        let click_key = read(store, keys::AUTO_CLICKER_CLICK_KEY).await?;

        debug!(
            enabled = ?clicker_enabled,
            trigger_key = ?trigger_key,
            click_key = ?click_key,
            "Raw auto-clicker settings"
        );

        Ok(Self {
            additional_program: AdditionalProgramConfig {
                enabled: parse_flag(keys::ADDITIONAL_PROGRAM_ENABLED, program_enabled),
                path: program_path
                    .map(|value| clean_path(&value.into_text()))
                    .unwrap_or_default(),
            },
            auto_clicker_enabled: parse_flag(keys::AUTO_CLICKER_ENABLED, clicker_enabled),
            trigger_key: parse_key(keys::AUTO_CLICKER_TRIGGER_KEY, trigger_key),
            click_key: parse_key(keys::AUTO_CLICKER_CLICK_KEY, click_key),
        })
    }
}

impl SettingsSnapshot {
    /// Write every setting, one key at a time
    ///
    /// A failure part-way leaves earlier keys written; there is no rollback.
    pub async fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        let entries: [(&str, SettingValue); 5] = [
            (
                keys::ADDITIONAL_PROGRAM_ENABLED,
                self.additional_program.enabled.into(),
            ),
            (
                keys::ADDITIONAL_PROGRAM_PATH,
                clean_path(&self.additional_program.path).into(),
            ),
            (keys::AUTO_CLICKER_ENABLED, self.auto_clicker_enabled.into()),
            (keys::AUTO_CLICKER_TRIGGER_KEY, self.trigger_key.name().into()),
            (keys::AUTO_CLICKER_CLICK_KEY, self.click_key.name().into()),
        ];

        for (key, value) in entries {
            store
                .write(key, value)
                .await
                .with_context(|| format!("Failed to write setting {key}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::memory::MemoryStore;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(r#""C:\app.exe""#), r"C:\app.exe");
        assert_eq!(clean_path(r#"  "C:\Program Files\x.exe"  "#), r"C:\Program Files\x.exe");
        assert_eq!(clean_path(""), "");
        assert_eq!(clean_path(r#""""#), "");
    }

    #[tokio::test]
    async fn test_load_from_empty_store() {
        let store = MemoryStore::default();
        let settings = StoredSettings::load(&store).await.unwrap();

        assert_eq!(settings, StoredSettings::default());
    }

    #[tokio::test]
    async fn test_load_parses_values() {
        let store = MemoryStore::with_values([
            (keys::ADDITIONAL_PROGRAM_ENABLED, SettingValue::from("True")),
            (keys::ADDITIONAL_PROGRAM_PATH, SettingValue::from(r#""C:\app.exe""#)),
            (keys::AUTO_CLICKER_ENABLED, SettingValue::Bool(true)),
            (keys::AUTO_CLICKER_TRIGGER_KEY, SettingValue::from("\"F9\"")),
            (keys::AUTO_CLICKER_CLICK_KEY, SettingValue::from("NotAKey")),
        ]);

        let settings = StoredSettings::load(&store).await.unwrap();

        assert!(settings.additional_program.enabled);
        assert_eq!(settings.additional_program.path, r"C:\app.exe");
        assert!(settings.auto_clicker_enabled);
        assert_eq!(settings.trigger_key, Some(KeyIdentifier::F9));
        assert_eq!(settings.click_key, None);
    }

    #[tokio::test]
    async fn test_unparsable_flag_is_false() {
        let store = MemoryStore::with_values([(keys::AUTO_CLICKER_ENABLED, "maybe")]);
        let settings = StoredSettings::load(&store).await.unwrap();
        assert!(!settings.auto_clicker_enabled);
    }

    #[tokio::test]
    async fn test_load_propagates_store_failure() {
        let store = MemoryStore::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        assert!(StoredSettings::load(&store).await.is_err());
    }

    #[tokio::test]
    async fn test_save_writes_all_keys() {
        let store = MemoryStore::default();
        let snapshot = SettingsSnapshot {
            additional_program: AdditionalProgramConfig {
                enabled: true,
                path: r#""C:\tool.exe""#.to_string(),
            },
            auto_clicker_enabled: false,
            trigger_key: KeyIdentifier::F8,
            click_key: KeyIdentifier::Space,
        };

        snapshot.save(&store).await.unwrap();

        assert_eq!(store.write_count(), 5);
        assert_eq!(
            store.get(keys::ADDITIONAL_PROGRAM_PATH),
            Some(SettingValue::from(r"C:\tool.exe"))
        );
        assert_eq!(
            store.get(keys::AUTO_CLICKER_CLICK_KEY),
            Some(SettingValue::from("Space"))
        );
        assert_eq!(
            store.get(keys::AUTO_CLICKER_ENABLED),
            Some(SettingValue::Bool(false))
        );
    }

    #[tokio::test]
    async fn test_partial_save_is_not_rolled_back() {
        let store = MemoryStore::default();
        store.fail_writes_after.store(2, Ordering::SeqCst);
        let snapshot = SettingsSnapshot {
            additional_program: AdditionalProgramConfig::default(),
            auto_clicker_enabled: true,
            trigger_key: KeyIdentifier::F8,
            click_key: KeyIdentifier::F,
        };

        assert!(snapshot.save(&store).await.is_err());
        assert!(store.get(keys::ADDITIONAL_PROGRAM_PATH).is_some());
        assert!(store.get(keys::AUTO_CLICKER_ENABLED).is_none());
    }

    #[tokio::test]
    async fn test_flag_round_trip() {
        for flag in [true, false] {
            let store = MemoryStore::with_values([
                (keys::ADDITIONAL_PROGRAM_ENABLED, SettingValue::Bool(flag)),
                (keys::AUTO_CLICKER_ENABLED, SettingValue::Bool(!flag)),
            ]);

            let first = StoredSettings::load(&store).await.unwrap();
            SettingsSnapshot {
                additional_program: first.additional_program.clone(),
                auto_clicker_enabled: first.auto_clicker_enabled,
                trigger_key: KeyIdentifier::F8,
                click_key: KeyIdentifier::F,
            }
            .save(&store)
            .await
            .unwrap();
            let second = StoredSettings::load(&store).await.unwrap();

            assert_eq!(second.additional_program.enabled, flag);
            assert_eq!(second.auto_clicker_enabled, !flag);
        }
    }
}
