//! Profanity Blaster application shell.
//!
//! Everything here is platform independent: the menu template, the dialog
//! presets, the manifest and the lifecycle state machine. Native work goes
//! through the [`Platform`] trait, which `blaster_window` implements on top of
//! tao/wry/muda/rfd and which tests replace with a recording fake.
//!
//! ```text
//! host event loop ──ShellEvent──► Shell::handle_event ──► Platform calls
//!                                        │
//!                                        └──► Flow::{Continue, Exit}
//! ```

use serde::{Deserialize, Serialize};

pub mod dialogs;
pub mod manifest;
pub mod menu;
pub mod platform;
pub mod shell;

pub use blaster_ipc::{IpcError, IpcEvent, OutboundMessage, WindowId};
pub use manifest::{AboutInfo, Manifest};
pub use menu::{MenuEntry, MenuGroup, MenuHandle, MenuItemId, MenuSelection, MenuTemplate, Role};
pub use platform::{validate_external_url, Platform};
pub use shell::{AppState, Flow, LifecyclePhase, Shell, ShellEvent};

// ============================================================================
// Error Types (6000+ range)
// ============================================================================

/// Error codes for shell operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ShellErrorCode {
    /// Generic shell error
    Generic = 6000,
    /// Window not found
    WindowNotFound = 6001,
    /// Failed to create window
    CreateFailed = 6002,
    /// A window is already open
    WindowAlreadyOpen = 6003,
    /// Menu error
    MenuError = 6004,
    /// Manifest could not be parsed
    InvalidManifest = 6006,
    /// URL rejected before opening
    InvalidUrl = 6007,
    /// System handler refused to open a URL
    OpenFailed = 6008,
    /// Native handle unavailable
    NativeHandleUnavailable = 6009,
}

/// Custom error type for shell operations
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("[{code}] {message}")]
    Generic { code: u32, message: String },

    #[error("[{code}] Window not found: {window_id}")]
    WindowNotFound { code: u32, window_id: String },

    #[error("[{code}] Failed to create window: {message}")]
    CreateFailed { code: u32, message: String },

    #[error("[{code}] Window already open: {window_id}")]
    WindowAlreadyOpen { code: u32, window_id: String },

    #[error("[{code}] Menu error: {message}")]
    MenuError { code: u32, message: String },

    #[error("[{code}] Invalid manifest: {message}")]
    InvalidManifest { code: u32, message: String },

    #[error("[{code}] Invalid URL: {url}")]
    InvalidUrl { code: u32, url: String },

    #[error("[{code}] Failed to open {url}: {message}")]
    OpenFailed {
        code: u32,
        url: String,
        message: String,
    },

    #[error("[{code}] Native handle unavailable")]
    NativeHandleUnavailable { code: u32 },
}

impl ShellError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            code: ShellErrorCode::Generic as u32,
            message: message.into(),
        }
    }

    pub fn window_not_found(window_id: WindowId) -> Self {
        Self::WindowNotFound {
            code: ShellErrorCode::WindowNotFound as u32,
            window_id: window_id.to_string(),
        }
    }

    pub fn create_failed(message: impl Into<String>) -> Self {
        Self::CreateFailed {
            code: ShellErrorCode::CreateFailed as u32,
            message: message.into(),
        }
    }

    pub fn window_already_open(window_id: WindowId) -> Self {
        Self::WindowAlreadyOpen {
            code: ShellErrorCode::WindowAlreadyOpen as u32,
            window_id: window_id.to_string(),
        }
    }

    pub fn menu_error(message: impl Into<String>) -> Self {
        Self::MenuError {
            code: ShellErrorCode::MenuError as u32,
            message: message.into(),
        }
    }

    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            code: ShellErrorCode::InvalidManifest as u32,
            message: message.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl {
            code: ShellErrorCode::InvalidUrl as u32,
            url: url.into(),
        }
    }

    pub fn open_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpenFailed {
            code: ShellErrorCode::OpenFailed as u32,
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn native_handle_unavailable() -> Self {
        Self::NativeHandleUnavailable {
            code: ShellErrorCode::NativeHandleUnavailable as u32,
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// Options for creating the main window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowOpts {
    pub title: String,
    /// Document path under the app's `web/` directory
    pub document: String,
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    /// Window starts hidden until its document reports ready
    pub visible: bool,
    /// Optional window icon, relative to the app directory
    pub icon: Option<String>,
}

/// File filter for dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Options for file dialogs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDialogOpts {
    pub title: Option<String>,
    /// Pre-filled file name (save dialogs only)
    pub default_name: Option<String>,
    pub filters: Vec<FileFilter>,
}

/// Severity shown by a message dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Info,
    Warning,
    Error,
}

/// Options for message dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDialogOpts {
    pub title: String,
    pub message: String,
    pub detail: Option<String>,
    pub kind: MessageKind,
    pub buttons: Vec<String>,
}

/// Document-level commands run by the host against a window's webview
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    Reload,
    /// Reload bypassing the cache
    ForceReload,
    ToggleDevTools,
    /// Absolute zoom factor, 1.0 is actual size
    SetZoom(f64),
    ToggleFullscreen,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ShellErrorCode::Generic as u32, 6000);
        assert_eq!(ShellErrorCode::WindowNotFound as u32, 6001);
        assert_eq!(ShellErrorCode::WindowAlreadyOpen as u32, 6003);
        assert_eq!(ShellErrorCode::InvalidUrl as u32, 6007);
        assert_eq!(ShellErrorCode::NativeHandleUnavailable as u32, 6009);
    }

    #[test]
    fn test_error_display() {
        let err = ShellError::window_not_found(WindowId(7));
        assert!(err.to_string().contains("6001"));
        assert!(err.to_string().contains("win-7"));

        let err = ShellError::open_failed("https://example.com", "no handler");
        assert!(err.to_string().contains("6008"));
        assert!(err.to_string().contains("no handler"));
    }

    #[test]
    fn test_message_kind_serialization() {
        let json = serde_json::to_string(&MessageKind::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(MessageKind::default(), MessageKind::Info);
    }
}
