//! IPC between the shell and the UI document loaded in its window.
//!
//! The document talks to the shell over named channels. Every message is a
//! JSON envelope `{"channel": ..., "payload": ...}`:
//!
//! ```text
//! renderer -> shell:  window.ipc.postMessage(envelope)  -> IpcEvent -> InboundMessage
//! shell -> renderer:  OutboundMessage -> window.__host_dispatch(envelope)
//! ```
//!
//! Delivery in both directions is fire-and-forget: at most once, never
//! acknowledged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Channel Names
// ============================================================================

/// Shell -> renderer: the user picked a media file to process.
pub const CHANNEL_FILE_SELECTED: &str = "file-selected";
/// Shell -> renderer: the user picked where the cleaned file goes.
pub const CHANNEL_EXPORT_FILE: &str = "export-file";
/// Renderer -> shell: whether a cleaned result is ready for export.
pub const CHANNEL_PROCESSING_STATUS: &str = "processing-status";

/// Inbound channels accepted when the manifest does not list any.
pub fn default_inbound_channels() -> Vec<String> {
    vec![CHANNEL_PROCESSING_STATUS.to_string()]
}

// ============================================================================
// Error Types (7000+ range - window errors use 6000)
// ============================================================================

/// Error codes for IPC operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum IpcErrorCode {
    /// Message body is not a valid envelope
    InvalidEnvelope = 7000,
    /// Channel rejected by the allowlist
    ChannelBlocked = 7001,
    /// Payload has the wrong shape for its channel
    InvalidPayload = 7002,
    /// Target window does not exist
    WindowNotFound = 7003,
    /// Channel is allowed but the shell has no handler for it
    UnknownChannel = 7004,
    /// The renderer could not be reached
    DeliveryFailed = 7005,
}

/// Custom error type for IPC operations
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("[{code}] Invalid envelope: {message}")]
    InvalidEnvelope { code: u32, message: String },

    #[error("[{code}] Channel blocked: {channel}")]
    ChannelBlocked { code: u32, channel: String },

    #[error("[{code}] Invalid payload on '{channel}': {message}")]
    InvalidPayload {
        code: u32,
        channel: String,
        message: String,
    },

    #[error("[{code}] Window not found: {window_id}")]
    WindowNotFound { code: u32, window_id: String },

    #[error("[{code}] Unknown channel: {channel}")]
    UnknownChannel { code: u32, channel: String },

    #[error("[{code}] Delivery failed: {message}")]
    DeliveryFailed { code: u32, message: String },
}

impl IpcError {
    pub fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            code: IpcErrorCode::InvalidEnvelope as u32,
            message: message.into(),
        }
    }

    pub fn channel_blocked(channel: impl Into<String>) -> Self {
        Self::ChannelBlocked {
            code: IpcErrorCode::ChannelBlocked as u32,
            channel: channel.into(),
        }
    }

    pub fn invalid_payload(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            code: IpcErrorCode::InvalidPayload as u32,
            channel: channel.into(),
            message: message.into(),
        }
    }

    pub fn window_not_found(window_id: impl fmt::Display) -> Self {
        Self::WindowNotFound {
            code: IpcErrorCode::WindowNotFound as u32,
            window_id: window_id.to_string(),
        }
    }

    pub fn unknown_channel(channel: impl Into<String>) -> Self {
        Self::UnknownChannel {
            code: IpcErrorCode::UnknownChannel as u32,
            channel: channel.into(),
        }
    }

    pub fn delivery_failed(message: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            code: IpcErrorCode::DeliveryFailed as u32,
            message: message.into(),
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// Opaque identifier of a shell window.
///
/// Assigned by the host when a window is created and never reused within a
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win-{}", self.0)
    }
}

/// Wire envelope shared by both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub channel: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Parse a raw message body posted by the renderer.
    pub fn parse(body: &str) -> Result<Self, IpcError> {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| IpcError::invalid_envelope(e.to_string()))?;
        if envelope.channel.is_empty() {
            return Err(IpcError::invalid_envelope("empty channel name"));
        }
        Ok(envelope)
    }
}

/// Event sent from a renderer (WebView) to the shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcEvent {
    pub window_id: WindowId,
    pub channel: String,
    pub payload: serde_json::Value,
}

impl IpcEvent {
    pub fn new(window_id: WindowId, envelope: Envelope) -> Self {
        Self {
            window_id,
            channel: envelope.channel,
            payload: envelope.payload,
        }
    }
}

/// Messages the shell understands from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage {
    /// `processing-status`: `true` once a cleaned result can be exported.
    ProcessingStatus(bool),
}

impl InboundMessage {
    /// Decode an event into a typed message.
    pub fn from_event(event: &IpcEvent) -> Result<Self, IpcError> {
        match event.channel.as_str() {
            CHANNEL_PROCESSING_STATUS => event
                .payload
                .as_bool()
                .map(InboundMessage::ProcessingStatus)
                .ok_or_else(|| {
                    IpcError::invalid_payload(
                        CHANNEL_PROCESSING_STATUS,
                        format!("expected a boolean, got {}", event.payload),
                    )
                }),
            other => Err(IpcError::unknown_channel(other)),
        }
    }
}

/// One-way notifications from the shell to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// The user chose a media file in the open dialog.
    FileSelected(PathBuf),
    /// The user chose a destination in the export dialog.
    ExportFile(PathBuf),
}

impl OutboundMessage {
    pub fn channel(&self) -> &'static str {
        match self {
            OutboundMessage::FileSelected(_) => CHANNEL_FILE_SELECTED,
            OutboundMessage::ExportFile(_) => CHANNEL_EXPORT_FILE,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            OutboundMessage::FileSelected(path) | OutboundMessage::ExportFile(path) => path,
        }
    }

    pub fn envelope(&self) -> Envelope {
        Envelope {
            channel: self.channel().to_string(),
            payload: serde_json::Value::String(self.path().to_string_lossy().into_owned()),
        }
    }

    /// Script that hands the envelope to the renderer's dispatcher, if the
    /// document installed one.
    pub fn dispatch_script(&self) -> Result<String, IpcError> {
        let json = serde_json::to_string(&self.envelope())
            .map_err(|e| IpcError::delivery_failed(e.to_string()))?;
        Ok(format!(
            "window.__host_dispatch && window.__host_dispatch({});",
            json
        ))
    }
}

// ============================================================================
// Channel Checker
// ============================================================================

/// Decides which inbound channels reach the shell.
pub trait ChannelChecker: Send + Sync {
    fn check_channel(&self, channel: &str) -> Result<(), IpcError>;
}

/// Permissive checker (dev mode)
pub struct PermissiveChannelChecker;

impl ChannelChecker for PermissiveChannelChecker {
    fn check_channel(&self, _channel: &str) -> Result<(), IpcError> {
        Ok(())
    }
}

/// Allowlist of channel names; `"*"` admits everything.
#[derive(Debug, Clone)]
pub struct ChannelAllowlist {
    channels: Vec<String>,
}

impl ChannelAllowlist {
    pub fn new(channels: Vec<String>) -> Self {
        Self { channels }
    }
}

impl Default for ChannelAllowlist {
    fn default() -> Self {
        Self::new(default_inbound_channels())
    }
}

impl ChannelChecker for ChannelAllowlist {
    fn check_channel(&self, channel: &str) -> Result<(), IpcError> {
        if self.channels.iter().any(|c| c == "*" || c == channel) {
            Ok(())
        } else {
            tracing::warn!(channel = %channel, "Blocked inbound IPC message - not in allowlist");
            Err(IpcError::channel_blocked(channel))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
