//! Command-line front end over the settings controller

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Command;
use crate::clicker::AutoClicker;
use crate::common::dispatcher::OwnerThread;
use crate::common::messages::{BackgroundRefreshMessage, MessageBus};
use crate::config::store::log_store_location;
use crate::config::{JsonFileStore, KeyIdentifier};
use crate::controller::{Feature, KeySlot, PendingSave, SettingsController};
use crate::picker::{ConsoleNotifier, PresetPicker};

pub async fn run(settings_path: Option<PathBuf>, command: Command) -> Result<()> {
    let store = JsonFileStore::new(settings_path.unwrap_or_else(JsonFileStore::default_path));
    log_store_location(&store);

    let clicker = AutoClicker::new();
    let controller =
        Rc::new(SettingsController::load(Arc::new(store), Arc::new(clicker.clone())).await);
    controller.subscribe(|change| debug!(?change, "Setting changed"));

    let mut status_rx = controller.subscribe_status();
    tokio::task::spawn_local(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            if !status.is_empty() {
                warn!(status = %status.text, "Status");
            }
        }
    });

    match command {
        Command::Show { json } => show(&controller, json),
        Command::Keys => {
            for key in KeyIdentifier::ALL {
                println!("{:<30} {:>3}  {}", key.name(), key.code(), key.display_name());
            }
            Ok(())
        }
        Command::Enable { feature, enabled } => {
            let pending = controller.set_feature_enabled(feature, enabled);
            finish(&controller, pending).await
        }
        Command::Bind { slot, key } => {
            controller.begin_recording(slot);
            let pending = controller.commit_recorded_key(slot, key);
            finish(&controller, pending).await
        }
        Command::Record { slot } => record(controller, slot).await,
        Command::SetProgram { path } => {
            let picker = PresetPicker::new(Some(path));
            match controller.browse_program(&picker, &ConsoleNotifier).await {
                Some(_) => finish(&controller, controller.save()).await,
                None => anyhow::bail!("Additional program not changed"),
            }
        }
        Command::Save => finish(&controller, controller.save()).await,
        Command::Refresh { no_force } => refresh(BackgroundRefreshMessage::new(!no_force)).await,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn show(controller: &SettingsController, json: bool) -> Result<()> {
    if json {
        let snapshot = controller.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize settings")?
        );
        return Ok(());
    }

    let program = controller.additional_program();
    let path = if program.path.is_empty() {
        "<unset>"
    } else {
        program.path.as_str()
    };
    println!("Additional program: {} ({})", on_off(program.enabled), path);
    println!(
        "Auto-clicker:       {}",
        on_off(controller.feature(Feature::AutoClicker).enabled)
    );
    for slot in KeySlot::ALL {
        let binding = controller.slot(slot);
        println!(
            "  {:<8} {} ({})",
            slot,
            binding.bound_key.display_name(),
            binding.bound_key
        );
    }
    Ok(())
}

/// Wait for a queued save and report the outcome
async fn finish(controller: &SettingsController, pending: PendingSave) -> Result<()> {
    match pending.await {
        Ok(()) => {
            println!("Settings saved");
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", controller.status());
            Err(err)
        }
    }
}

fn apply_captured_key(
    controller: &SettingsController,
    slot: KeySlot,
    line: &str,
) -> Result<Option<PendingSave>> {
    if line.is_empty() {
        controller.cancel_recording();
        return Ok(None);
    }

    match line.parse::<KeyIdentifier>() {
        Ok(key) => Ok(Some(controller.commit_recorded_key(slot, key))),
        Err(err) => {
            controller.cancel_recording();
            Err(err).context("Run `keys` to list valid key names")
        }
    }
}

/// Capture a key name on a blocking reader thread and commit it on the owner thread
async fn record(controller: Rc<SettingsController>, slot: KeySlot) -> Result<()> {
    controller.begin_recording(slot);
    println!("Recording {slot} key: type a key name (e.g. F8) and press Enter, empty line cancels");

    let owner = OwnerThread::new(controller.clone());
    let handle = tokio::runtime::Handle::current();

    let captured = tokio::task::spawn_blocking(move || -> Result<Option<PendingSave>> {
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read key from stdin")?;
        let line = line.trim().to_string();

        handle.block_on(owner.run(move |controller| async move {
            apply_captured_key(&controller, slot, &line)
        }))?
    })
    .await
    .context("Key capture thread failed")??;

    match captured {
        Some(pending) => finish(&controller, pending).await,
        None => {
            println!("Recording cancelled");
            Ok(())
        }
    }
}

async fn refresh(message: BackgroundRefreshMessage) -> Result<()> {
    let bus = MessageBus::new(4);
    let mut listener = bus.subscribe();

    let delivered = bus.publish(message);
    let received = listener
        .recv()
        .await
        .context("Background refresh listener closed")?;

    info!(
        force_refresh = received.force_refresh,
        delivered, "Background refresh requested"
    );
    println!(
        "Background refresh broadcast (force: {})",
        received.force_refresh
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingValue;
    use crate::config::store::memory::MemoryStore;
    use crate::constants::keys;

    async fn recording_controller(slot: KeySlot) -> (Arc<MemoryStore>, SettingsController) {
        let store = Arc::new(MemoryStore::default());
        let controller =
            SettingsController::load(store.clone(), Arc::new(AutoClicker::new())).await;
        controller.begin_recording(slot);
        (store, controller)
    }

    #[tokio::test]
    async fn test_empty_line_cancels_recording() {
        let (store, controller) = recording_controller(KeySlot::Trigger).await;

        let captured = apply_captured_key(&controller, KeySlot::Trigger, "").unwrap();

        assert!(captured.is_none());
        assert_eq!(controller.recording_slot(), None);
        assert_eq!(controller.slot(KeySlot::Trigger).bound_key, KeyIdentifier::F8);
        tokio::task::yield_now().await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_key_cancels_and_reports() {
        let (store, controller) = recording_controller(KeySlot::Click).await;

        let err = apply_captured_key(&controller, KeySlot::Click, "NotAKey").unwrap_err();

        assert!(format!("{err:#}").contains("`keys`"));
        assert!(format!("{err:#}").contains("NotAKey"));
        assert_eq!(controller.recording_slot(), None);
        assert_eq!(controller.slot(KeySlot::Click).bound_key, KeyIdentifier::F);
        tokio::task::yield_now().await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_key_is_committed_and_saved() {
        let (store, controller) = recording_controller(KeySlot::Trigger).await;

        let pending = apply_captured_key(&controller, KeySlot::Trigger, "F9")
            .unwrap()
            .expect("a key name commits");
        pending.await.unwrap();

        assert_eq!(controller.recording_slot(), None);
        assert_eq!(controller.slot(KeySlot::Trigger).bound_key, KeyIdentifier::F9);
        assert_eq!(
            store.get(keys::AUTO_CLICKER_TRIGGER_KEY),
            Some(SettingValue::from("F9"))
        );
    }
}
