//! Seam between the shell and the native toolkit.

use crate::menu::{MenuHandle, MenuItemId, MenuTemplate};
use crate::{FileDialogOpts, MessageDialogOpts, ShellError, ViewCommand, WindowOpts};
use blaster_ipc::{IpcError, OutboundMessage, WindowId};
use std::path::PathBuf;

/// Native operations the shell needs.
///
/// Every method is called from the event loop thread. Dialog methods block
/// until the user dismisses them; `None` means the user cancelled.
pub trait Platform {
    /// Create a window and start loading its document.
    fn create_window(&mut self, opts: &WindowOpts) -> Result<WindowId, ShellError>;

    fn show_window(&mut self, window: WindowId) -> Result<(), ShellError>;

    /// Install `template` as the application menu, replacing any previous one.
    fn set_app_menu(&mut self, template: &MenuTemplate) -> Result<MenuHandle, ShellError>;

    fn set_menu_item_enabled(
        &mut self,
        menu: MenuHandle,
        item: MenuItemId,
        enabled: bool,
    ) -> Result<(), ShellError>;

    fn pick_file(&mut self, opts: &FileDialogOpts) -> Option<PathBuf>;

    fn save_file(&mut self, opts: &FileDialogOpts) -> Option<PathBuf>;

    fn show_message(&mut self, opts: &MessageDialogOpts);

    /// Fire-and-forget notification to the window's document.
    fn send_to_renderer(
        &mut self,
        window: WindowId,
        message: &OutboundMessage,
    ) -> Result<(), IpcError>;

    /// Open a URL with the system's default handler.
    fn open_external(&mut self, url: &str) -> Result<(), ShellError>;

    fn apply_view_command(
        &mut self,
        window: WindowId,
        command: ViewCommand,
    ) -> Result<(), ShellError>;
}

/// Only web and mail links may leave the app.
pub fn validate_external_url(url: &str) -> Result<(), ShellError> {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("mailto:") {
        Ok(())
    } else {
        Err(ShellError::invalid_url(url))
    }
}
