//! Application-wide constants
//!
//! Setting key names, default bindings and file locations live here so the
//! controller, the store and the CLI agree on a single source of truth.

/// Persisted setting key names
pub mod keys {
    pub const ADDITIONAL_PROGRAM_ENABLED: &str = "AdditionalProgramEnabled";
    pub const ADDITIONAL_PROGRAM_PATH: &str = "AdditionalProgramPath";
    pub const AUTO_CLICKER_ENABLED: &str = "AutoClickerEnabled";
    pub const AUTO_CLICKER_TRIGGER_KEY: &str = "AutoClickerTriggerKey";
    pub const AUTO_CLICKER_CLICK_KEY: &str = "AutoClickerClickKey";
}

/// Values used when a setting is absent or unparsable
pub mod defaults {
    use crate::config::KeyIdentifier;

    /// Key that toggles clicking on and off
    pub const TRIGGER_KEY: KeyIdentifier = KeyIdentifier::F8;

    /// Key that is pressed repeatedly while clicking is active
    pub const CLICK_KEY: KeyIdentifier = KeyIdentifier::F;
}

/// Status channel timing
pub mod status {
    use std::time::Duration;

    /// How long a status message stays visible after a successful save
    pub const CLEAR_DELAY: Duration = Duration::from_secs(2);
}

/// Settings file location
pub mod config {
    /// Directory name under the platform config directory
    pub const APP_DIR: &str = "FufuLauncher";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}

/// User-facing messages
pub mod messages {
    pub const FILE_NOT_ACCESSIBLE: &str = "File does not exist or cannot be accessed";
    pub const WINDOW_UNAVAILABLE: &str = "Unable to get the main window handle";
    pub const INVALID_WINDOW_HANDLE: &str =
        "Invalid window handle, please run as a normal user";
    pub const INVALID_WINDOW_HANDLE_STATUS: &str = "Error: invalid window handle";
    pub const PERMISSION_DENIED: &str =
        "Permission error: run the launcher as a normal user to select files";
    pub const ERROR_DIALOG_TITLE: &str = "Operation failed";
}
