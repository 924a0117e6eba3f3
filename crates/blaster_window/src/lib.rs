//! Native window, webview, menu and dialog backend for the shell.
//!
//! [`WindowManager`] owns the tao windows, wry webviews and the muda menu bar.
//! The host calls it from the event loop; inside an event it borrows the
//! loop target and hands the shell a [`NativePlatform`]:
//!
//! ```text
//! tao event ─► host ─► Shell::handle_event(ev, &mut manager.platform(target))
//!                                      │
//!     webview IPC / page load ─► EventLoopProxy<U> (HostSignal) ─► host
//! ```

use blaster_ipc::{IpcEvent, WindowId};
use std::path::{Component, Path, PathBuf};

mod manager;
mod menu;

pub use manager::{NativePlatform, WindowManager, WindowManagerConfig};
pub use menu::MenuIdMap;

/// Signals raised by webviews on their own callbacks and posted back into the
/// event loop.
#[derive(Debug, Clone)]
pub enum HostSignal {
    /// The window's document finished loading
    DocumentReady(WindowId),
    /// A message the document posted with `window.ipc.postMessage`
    Ipc(IpcEvent),
}

/// Injected into every document before its own scripts run.
///
/// Exposes `window.host.send(channel, payload)` and
/// `window.host.on(channel, fn)`, and installs the `__host_dispatch` hook the
/// shell calls for outbound messages.
pub const PRELOAD_JS: &str = r#"(function () {
  const listeners = new Map();
  window.__host_dispatch = function (msg) {
    (listeners.get(msg.channel) || []).forEach(function (fn) {
      fn(msg.payload);
    });
  };
  window.host = {
    send: function (channel, payload) {
      window.ipc.postMessage(JSON.stringify({ channel: channel, payload: payload }));
    },
    on: function (channel, fn) {
      if (!listeners.has(channel)) listeners.set(channel, []);
      listeners.get(channel).push(fn);
    },
  };
})();"#;

// ============================================================================
// Assets
// ============================================================================

/// Asset provider trait - lets the host decide where `app://` content comes from
pub trait AssetProvider: Send + Sync {
    fn get_asset(&self, path: &str) -> Option<Vec<u8>>;
}

/// Serves files from the app's `web/` directory
pub struct FsAssetProvider {
    web_dir: PathBuf,
}

impl FsAssetProvider {
    pub fn new(app_dir: &Path) -> Self {
        Self {
            web_dir: app_dir.join("web"),
        }
    }
}

impl AssetProvider for FsAssetProvider {
    fn get_asset(&self, path: &str) -> Option<Vec<u8>> {
        let relative = sanitize_asset_path(path)?;
        std::fs::read(self.web_dir.join(relative)).ok()
    }
}

/// Reject absolute paths and parent traversal in request paths.
pub fn sanitize_asset_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let candidate = Path::new(trimmed);
    if candidate
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        Some(candidate.to_path_buf())
    } else {
        None
    }
}

/// URL the webview loads for a document under `web/`.
///
/// Windows and Android webviews expose custom protocols as
/// `http://<scheme>.localhost`.
pub fn document_url(document: &str) -> String {
    let document = document.trim_start_matches('/');
    if cfg!(any(target_os = "windows", target_os = "android")) {
        format!("http://app.localhost/{}", document)
    } else {
        format!("app://localhost/{}", document)
    }
}

/// Get MIME type for a file path based on extension
pub fn mime_for(path: &str) -> &'static str {
    if let Some(ext) = Path::new(path).extension().and_then(|s| s.to_str()) {
        match ext {
            "html" | "htm" => "text/html; charset=utf-8",
            "js" | "mjs" => "text/javascript; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "json" => "application/json",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "txt" => "text/plain; charset=utf-8",
            "wasm" => "application/wasm",
            "woff2" => "font/woff2",
            "mp4" => "video/mp4",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            _ => "application/octet-stream",
        }
    } else {
        "application/octet-stream"
    }
}
