//! Configuration management
//!
//! Key identifiers, the key/value settings store and the typed view of the
//! launcher settings on top of it.

pub mod keys;
pub mod settings;
pub mod store;

pub use keys::KeyIdentifier;
pub use settings::{AdditionalProgramConfig, SettingsSnapshot, StoredSettings};
pub use store::{JsonFileStore, SettingValue, SettingsStore};
