//! An abstraction layer for native file dialogs to enable testing.

use std::path::PathBuf;

/// Defines a common interface for folder selection dialogs.
/// This allows for a mock implementation during tests, avoiding the need
/// to interact with actual OS dialog windows.
pub trait DialogService: Send + Sync {
    /// Opens a dialog to select a single directory. `None` means cancelled.
    fn pick_directory(&self) -> Option<PathBuf>;
}

/// The production implementation that uses the `rfd` crate to show native OS dialogs.
pub struct NativeDialogService;

impl DialogService for NativeDialogService {
    fn pick_directory(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select a project folder")
            .pick_folder()
    }
}
