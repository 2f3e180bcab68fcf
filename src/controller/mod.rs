//! Settings controller for the "other" settings panel
//!
//! Owns the additional-program and auto-clicker settings, the key recording
//! state machine and change notification. All methods run on one thread
//! (`SettingsController` is `!Send`); work finishing elsewhere is routed back
//! through [`crate::common::dispatcher::OwnerThread`].

pub mod persistence;
pub mod state;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::clicker::AutoClickerService;
use crate::common::status::{StatusChannel, StatusMessage};
use crate::config::settings::clean_path;
use crate::config::{AdditionalProgramConfig, KeyIdentifier, SettingsSnapshot, SettingsStore, StoredSettings};
use crate::constants::messages;
use crate::picker::{ErrorNotifier, FilePicker, PickerError};

pub use persistence::{PendingSave, SaveQueue};
pub use state::{Feature, FeatureToggleState, KeyBindingSlot, KeySlot, SettingChange};

use state::ControllerState;

/// Identifies a registered change listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SettingChange)>;

pub struct SettingsController {
    state: RefCell<ControllerState>,
    clicker: Arc<dyn AutoClickerService>,
    saves: SaveQueue,
    status: Arc<StatusChannel>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
    // Re-entrant dispatch bookkeeping: changes raised by listeners are queued,
    // and listeners removed mid-dispatch are skipped then dropped
    pending_changes: RefCell<VecDeque<SettingChange>>,
    dispatching: RefCell<Vec<ListenerId>>,
    removed_while_dispatching: RefCell<Vec<ListenerId>>,
    notifying: Cell<bool>,
}

impl SettingsController {
    /// Load settings from the store and push them into the auto-clicker
    ///
    /// Never fails: store errors are logged and defaults are used instead.
    pub async fn load(store: Arc<dyn SettingsStore>, clicker: Arc<dyn AutoClickerService>) -> Self {
        debug!("Loading launcher settings");

        let stored = match StoredSettings::load(store.as_ref()).await {
            Ok(stored) => stored,
            Err(err) => {
                error!(error = ?err, "Failed to load settings, using defaults");
                StoredSettings::default()
            }
        };

        clicker.set_enabled(stored.auto_clicker_enabled);
        if let Some(key) = stored.trigger_key {
            clicker.set_trigger_key(key);
        }
        if let Some(key) = stored.click_key {
            clicker.set_click_key(key);
        }

        let state = ControllerState::from_stored(&stored);
        info!(
            enabled = state.auto_clicker.enabled,
            trigger_key = %state.trigger_key,
            click_key = %state.click_key,
            additional_program = state.additional_program.enabled,
            "Settings loaded"
        );

        let status = Arc::new(StatusChannel::new());
        Self {
            state: RefCell::new(state),
            clicker,
            saves: SaveQueue::spawn(store, status.clone()),
            status,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            pending_changes: RefCell::new(VecDeque::new()),
            dispatching: RefCell::new(Vec::new()),
            removed_while_dispatching: RefCell::new(Vec::new()),
            notifying: Cell::new(false),
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.state.borrow().enabled(feature)
    }

    pub fn feature(&self, feature: Feature) -> FeatureToggleState {
        FeatureToggleState {
            enabled: self.is_enabled(feature),
        }
    }

    pub fn additional_program(&self) -> AdditionalProgramConfig {
        self.state.borrow().additional_program.clone()
    }

    pub fn slot(&self, slot: KeySlot) -> KeyBindingSlot {
        self.state.borrow().slot(slot)
    }

    /// The slot currently waiting for a key press, if any
    pub fn recording_slot(&self) -> Option<KeySlot> {
        self.state.borrow().recording
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        self.state.borrow().snapshot()
    }

    pub fn status(&self) -> String {
        self.status.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusMessage> {
        self.status.subscribe()
    }

    /// Register a listener called synchronously after each state change
    ///
    /// Listeners may call back into the controller. Changes they cause are
    /// delivered to every listener after the current change.
    pub fn subscribe(&self, listener: impl FnMut(&SettingChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        {
            let mut listeners = self.listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            if listeners.len() != before {
                return true;
            }
        }

        let mut removed = self.removed_while_dispatching.borrow_mut();
        if self.dispatching.borrow().contains(&id) && !removed.contains(&id) {
            removed.push(id);
            return true;
        }
        false
    }

    fn notify(&self, changes: &[SettingChange]) {
        if changes.is_empty() {
            return;
        }
        self.pending_changes
            .borrow_mut()
            .extend(changes.iter().cloned());

        // A listener triggered this change; the outer dispatch loop delivers it
        if self.notifying.replace(true) {
            return;
        }

        let mut active = std::mem::take(&mut *self.listeners.borrow_mut());
        *self.dispatching.borrow_mut() = active.iter().map(|(id, _)| *id).collect();

        loop {
            let next = self.pending_changes.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };
            for (id, listener) in active.iter_mut() {
                if self.removed_while_dispatching.borrow().contains(id) {
                    continue;
                }
                listener(&change);
            }
        }

        let removed = std::mem::take(&mut *self.removed_while_dispatching.borrow_mut());
        active.retain(|(id, _)| !removed.contains(id));
        self.dispatching.borrow_mut().clear();

        let mut listeners = self.listeners.borrow_mut();
        let added = std::mem::take(&mut *listeners);
        *listeners = active;
        listeners.extend(added);
        drop(listeners);

        self.notifying.set(false);
    }

    /// Toggle a feature, push it to the auto-clicker and persist
    pub fn set_feature_enabled(&self, feature: Feature, enabled: bool) -> PendingSave {
        let changed = {
            let mut state = self.state.borrow_mut();
            let flag = state.enabled_mut(feature);
            let changed = *flag != enabled;
            *flag = enabled;
            changed
        };

        if feature == Feature::AutoClicker {
            self.clicker.set_enabled(enabled);
        }
        info!(feature = ?feature, enabled, "Feature toggled");

        if changed {
            self.notify(&[SettingChange::FeatureEnabled { feature, enabled }]);
        }
        self.save()
    }

    /// Start capturing a key for `slot`, stopping any other capture
    ///
    /// Recording is session-only and never persisted.
    pub fn begin_recording(&self, slot: KeySlot) {
        let previous = self.state.borrow_mut().recording.replace(slot);
        if previous == Some(slot) {
            return;
        }

        debug!(slot = %slot, "Recording key");
        let mut changes = Vec::with_capacity(2);
        if let Some(previous) = previous {
            changes.push(SettingChange::Recording {
                slot: previous,
                recording: false,
            });
        }
        changes.push(SettingChange::Recording {
            slot,
            recording: true,
        });
        self.notify(&changes);
    }

    /// Abandon a capture without changing any binding
    pub fn cancel_recording(&self) {
        let previous = self.state.borrow_mut().recording.take();
        if let Some(slot) = previous {
            debug!(slot = %slot, "Key recording cancelled");
            self.notify(&[SettingChange::Recording {
                slot,
                recording: false,
            }]);
        }
    }

    /// Bind `key` to `slot`, end any capture, push to the auto-clicker and persist
    pub fn commit_recorded_key(&self, slot: KeySlot, key: KeyIdentifier) -> PendingSave {
        let (previous_recording, changed) = {
            let mut state = self.state.borrow_mut();
            let previous_recording = state.recording.take();
            let bound = state.bound_key_mut(slot);
            let changed = *bound != key;
            *bound = key;
            (previous_recording, changed)
        };

        match slot {
            KeySlot::Trigger => self.clicker.set_trigger_key(key),
            KeySlot::Click => self.clicker.set_click_key(key),
        }
        info!(slot = %slot, key = %key, "Key binding updated");

        let mut changes = Vec::with_capacity(2);
        if let Some(recording) = previous_recording {
            changes.push(SettingChange::Recording {
                slot: recording,
                recording: false,
            });
        }
        if changed {
            changes.push(SettingChange::KeyBound { slot, key });
        }
        self.notify(&changes);

        self.save()
    }

    /// Set the additional program path (quotes stripped, not persisted until saved)
    pub fn set_additional_program_path(&self, path: &str) {
        let path = clean_path(path);
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.additional_program.path != path;
            state.additional_program.path = path.clone();
            changed
        };

        if changed {
            info!(path = %path, "Additional program path set");
            self.notify(&[SettingChange::AdditionalProgramPath(path)]);
        }
    }

    /// Persist the current state in the background
    pub fn save(&self) -> PendingSave {
        let snapshot = self.snapshot();
        self.saves.submit(snapshot)
    }

    /// Let the user pick the additional program
    ///
    /// Returns the path that was applied, or `None` if nothing changed.
    pub async fn browse_program(
        &self,
        picker: &dyn FilePicker,
        notifier: &dyn ErrorNotifier,
    ) -> Option<String> {
        let selected = match picker.pick_file().await {
            Ok(Some(selected)) => selected,
            Ok(None) => {
                debug!("Program selection cancelled");
                return None;
            }
            Err(PickerError::NoWindow) => {
                self.show_error(notifier, messages::WINDOW_UNAVAILABLE).await;
                return None;
            }
            Err(PickerError::InvalidWindowHandle) => {
                self.status.publish(messages::INVALID_WINDOW_HANDLE_STATUS);
                self.show_error(notifier, messages::INVALID_WINDOW_HANDLE)
                    .await;
                return None;
            }
            Err(PickerError::PermissionDenied) => {
                error!("Permission denied while selecting program");
                self.show_error(notifier, messages::PERMISSION_DENIED).await;
                return None;
            }
            Err(err @ PickerError::Other(_)) => {
                error!(error = %err, "Program selection failed");
                self.show_error(notifier, &format!("Failed to select program: {err}"))
                    .await;
                return None;
            }
        };

        let path = clean_path(&selected.to_string_lossy());
        info!(path = %path, "Program selected");

        if !picker.exists(Path::new(&path)) {
            self.show_error(notifier, messages::FILE_NOT_ACCESSIBLE).await;
            return None;
        }

        self.set_additional_program_path(&path);
        Some(path)
    }

    async fn show_error(&self, notifier: &dyn ErrorNotifier, message: &str) {
        if let Err(err) = notifier
            .show_error(messages::ERROR_DIALOG_TITLE, message)
            .await
        {
            warn!(error = ?err, "Failed to show error dialog");
            self.status.publish(format!("Error: {message}"));
        }
    }
}
