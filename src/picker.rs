//! File-picker and error-notification seams
//!
//! The controller only consumes "path selected or none" and an existence
//! check; presenting pickers and dialogs belongs to the front end.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Why a file could not be picked
#[allow(dead_code)]
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("main window is not available")]
    NoWindow,
    #[error("window handle is invalid")]
    InvalidWindowHandle,
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0}")]
    Other(String),
}

/// Asks the user for an executable
#[async_trait(?Send)]
pub trait FilePicker {
    /// `Ok(None)` when the user cancelled
    async fn pick_file(&self) -> Result<Option<PathBuf>, PickerError>;

    /// Whether the selected path is an accessible file
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Shows a modal error to the user
#[async_trait(?Send)]
pub trait ErrorNotifier {
    async fn show_error(&self, title: &str, message: &str) -> Result<()>;
}

/// Picker that "selects" a path given up front (command-line front end)
#[derive(Debug, Clone)]
pub struct PresetPicker {
    selection: Option<PathBuf>,
}

impl PresetPicker {
    pub fn new(selection: Option<PathBuf>) -> Self {
        Self { selection }
    }
}

#[async_trait(?Send)]
impl FilePicker for PresetPicker {
    async fn pick_file(&self) -> Result<Option<PathBuf>, PickerError> {
        let Some(path) = &self.selection else {
            return Ok(None);
        };

        match tokio::fs::metadata(path).await {
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(PickerError::PermissionDenied)
            }
            _ => Ok(Some(path.clone())),
        }
    }
}

/// Prints errors to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait(?Send)]
impl ErrorNotifier for ConsoleNotifier {
    async fn show_error(&self, title: &str, message: &str) -> Result<()> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{title}: {message}\n").as_bytes())
            .await?;
        stderr.flush().await?;
        Ok(())
    }
}
