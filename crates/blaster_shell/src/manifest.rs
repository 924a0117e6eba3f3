//! Application manifest (`manifest.app.toml`).
//!
//! Every table and field is optional. A missing file yields the built-in
//! Profanity Blaster configuration.

use crate::{ShellError, WindowOpts};
use serde::Deserialize;
use std::path::Path;

/// File name looked up in the app directory
pub const MANIFEST_FILE: &str = "manifest.app.toml";

/// Parsed `manifest.app.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub app: App,
    pub window: Window,
    pub lifecycle: Lifecycle,
    pub help: Help,
    pub ipc: Ipc,
}

/// Application metadata
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct App {
    /// Display name, also used for the App menu and window title
    pub name: String,
    /// Semantic version (e.g., "1.0.0")
    pub version: String,
    /// Reverse-DNS identifier
    pub identifier: String,
    /// Shown as the About dialog detail
    pub description: String,
    pub credits: String,
    pub authors: Vec<String>,
    pub website: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            name: "Profanity Blaster".to_string(),
            version: "1.0.0".to_string(),
            identifier: "com.profanityblaster.app".to_string(),
            description:
                "Clean Audio & Video Filter\nRemove Profanity & Blasphemy from your media files."
                    .to_string(),
            credits: "Built with tao and wry".to_string(),
            authors: Vec::new(),
            website: "https://github.com".to_string(),
        }
    }
}

/// Main window configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Window {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    /// Entry document under `web/`
    pub document: String,
    /// Window icon (PNG) relative to the app directory
    pub icon: Option<String>,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            min_width: 800,
            min_height: 600,
            document: "index.html".to_string(),
            icon: Some("assets/icon.png".to_string()),
        }
    }
}

/// Process lifetime policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Lifecycle {
    /// Keep running after the last window closes
    pub resident_without_windows: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            resident_without_windows: cfg!(target_os = "macos"),
        }
    }
}

/// Help menu destinations
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Help {
    pub learn_more_url: String,
    pub report_issue_url: String,
}

impl Default for Help {
    fn default() -> Self {
        Self {
            learn_more_url: "https://github.com".to_string(),
            report_issue_url: "https://github.com".to_string(),
        }
    }
}

/// Inbound IPC allowlist
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ipc {
    /// Channel names the renderer may send on; `"*"` allows all
    pub channels: Vec<String>,
}

impl Default for Ipc {
    fn default() -> Self {
        Self {
            channels: blaster_ipc::default_inbound_channels(),
        }
    }
}

impl Manifest {
    /// Parse manifest text.
    pub fn from_toml_str(text: &str) -> Result<Self, ShellError> {
        toml::from_str(text).map_err(|e| ShellError::invalid_manifest(e.to_string()))
    }

    /// Load `manifest.app.toml` from `app_dir`, falling back to defaults when
    /// the file does not exist.
    pub fn load(app_dir: &Path) -> Result<Self, ShellError> {
        let path = app_dir.join(MANIFEST_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No manifest at {}, using built-in configuration",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ShellError::invalid_manifest(format!(
                "reading {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Options for the main window. It always starts hidden.
    pub fn window_opts(&self) -> WindowOpts {
        WindowOpts {
            title: self.app.name.clone(),
            document: self.window.document.clone(),
            width: self.window.width,
            height: self.window.height,
            min_width: self.window.min_width,
            min_height: self.window.min_height,
            visible: false,
            icon: self.window.icon.clone(),
        }
    }

    pub fn about(&self) -> AboutInfo {
        AboutInfo {
            name: self.app.name.clone(),
            version: self.app.version.clone(),
            description: self.app.description.clone(),
            credits: self.app.credits.clone(),
            authors: self.app.authors.clone(),
            website: self.app.website.clone(),
        }
    }
}

/// Static application metadata for About surfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub credits: String,
    pub authors: Vec<String>,
    pub website: String,
}

impl AboutInfo {
    /// `"<name> v<version>"`
    pub fn version_line(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }

    /// Multi-line block printed for `--version`
    pub fn render(&self) -> String {
        let mut out = self.version_line();
        out.push('\n');
        out.push_str(&self.description);
        if !self.credits.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.credits);
        }
        if !self.authors.is_empty() {
            out.push_str("\nAuthors: ");
            out.push_str(&self.authors.join(", "));
        }
        if !self.website.is_empty() {
            out.push('\n');
            out.push_str(&self.website);
        }
        out
    }
}
