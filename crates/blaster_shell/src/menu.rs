//! Declarative application menu.
//!
//! The template is plain data: the host turns it into native menus, keeps a
//! handle per [`MenuItemId`] and reports clicks back as [`MenuSelection`]s.

use serde::{Deserialize, Serialize};

/// Standard actions backed by the platform or the host's webview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Hide,
    HideOthers,
    Unhide,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Reload,
    ForceReload,
    ToggleDevTools,
    ResetZoom,
    ZoomIn,
    ZoomOut,
    ToggleFullscreen,
    Minimize,
    Close,
    Front,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Hide => "Hide",
            Role::HideOthers => "Hide Others",
            Role::Unhide => "Show All",
            Role::Undo => "Undo",
            Role::Redo => "Redo",
            Role::Cut => "Cut",
            Role::Copy => "Copy",
            Role::Paste => "Paste",
            Role::SelectAll => "Select All",
            Role::Reload => "Reload",
            Role::ForceReload => "Force Reload",
            Role::ToggleDevTools => "Toggle Developer Tools",
            Role::ResetZoom => "Actual Size",
            Role::ZoomIn => "Zoom In",
            Role::ZoomOut => "Zoom Out",
            Role::ToggleFullscreen => "Toggle Fullscreen",
            Role::Minimize => "Minimize",
            Role::Close => "Close",
            Role::Front => "Bring All to Front",
        }
    }

    pub fn accelerator(self) -> Option<&'static str> {
        match self {
            Role::Hide => Some("CmdOrCtrl+H"),
            Role::HideOthers => Some("CmdOrCtrl+Alt+H"),
            Role::Undo => Some("CmdOrCtrl+Z"),
            Role::Redo => Some("Shift+CmdOrCtrl+Z"),
            Role::Cut => Some("CmdOrCtrl+X"),
            Role::Copy => Some("CmdOrCtrl+C"),
            Role::Paste => Some("CmdOrCtrl+V"),
            Role::SelectAll => Some("CmdOrCtrl+A"),
            Role::Reload => Some("CmdOrCtrl+R"),
            Role::ForceReload => Some("CmdOrCtrl+Shift+R"),
            Role::ToggleDevTools => Some("F12"),
            Role::ResetZoom => Some("CmdOrCtrl+0"),
            Role::ZoomIn => Some("CmdOrCtrl+="),
            Role::ZoomOut => Some("CmdOrCtrl+-"),
            Role::ToggleFullscreen if cfg!(target_os = "macos") => Some("Ctrl+Cmd+F"),
            Role::ToggleFullscreen => Some("F11"),
            Role::Minimize => Some("CmdOrCtrl+M"),
            Role::Close => Some("CmdOrCtrl+W"),
            Role::Unhide | Role::Front => None,
        }
    }

    /// Roles the native menu implements by itself. Every other role is
    /// reported back to the shell as a [`MenuSelection::Role`].
    pub fn is_native(self) -> bool {
        !matches!(
            self,
            Role::Reload
                | Role::ForceReload
                | Role::ToggleDevTools
                | Role::ResetZoom
                | Role::ZoomIn
                | Role::ZoomOut
                | Role::ToggleFullscreen
        )
    }
}

/// Stable identifiers of the custom menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuItemId {
    About,
    Preferences,
    Quit,
    OpenMediaFile,
    ExportCleanedFile,
    LearnMore,
    ReportIssue,
}

impl MenuItemId {
    pub fn as_str(self) -> &'static str {
        match self {
            MenuItemId::About => "about",
            MenuItemId::Preferences => "preferences",
            MenuItemId::Quit => "quit",
            MenuItemId::OpenMediaFile => "open-media-file",
            MenuItemId::ExportCleanedFile => "export-cleaned-file",
            MenuItemId::LearnMore => "learn-more",
            MenuItemId::ReportIssue => "report-issue",
        }
    }
}

/// A single menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MenuEntry {
    Role {
        role: Role,
        /// Overrides [`Role::label`]
        label: Option<String>,
    },
    Action {
        id: MenuItemId,
        label: String,
        accelerator: Option<String>,
        enabled: bool,
    },
    Separator,
}

impl MenuEntry {
    fn role(role: Role) -> Self {
        MenuEntry::Role { role, label: None }
    }

    fn action(id: MenuItemId, label: impl Into<String>, accelerator: Option<&str>) -> Self {
        MenuEntry::Action {
            id,
            label: label.into(),
            accelerator: accelerator.map(str::to_string),
            enabled: true,
        }
    }

    /// Display label, `None` for separators
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuEntry::Role { role, label } => Some(label.as_deref().unwrap_or(role.label())),
            MenuEntry::Action { label, .. } => Some(label),
            MenuEntry::Separator => None,
        }
    }
}

/// A top-level submenu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub label: String,
    pub entries: Vec<MenuEntry>,
}

/// Complete application menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTemplate {
    pub groups: Vec<MenuGroup>,
}

impl MenuTemplate {
    /// The Profanity Blaster menu bar: App, File, Edit, View, Window, Help.
    pub fn application(app_name: &str, export_enabled: bool) -> Self {
        use MenuEntry::Separator;

        let app = MenuGroup {
            label: app_name.to_string(),
            entries: vec![
                MenuEntry::action(MenuItemId::About, format!("About {}", app_name), None),
                Separator,
                MenuEntry::action(MenuItemId::Preferences, "Preferences...", Some("CmdOrCtrl+,")),
                Separator,
                MenuEntry::Role {
                    role: Role::Hide,
                    label: Some(format!("Hide {}", app_name)),
                },
                MenuEntry::role(Role::HideOthers),
                MenuEntry::role(Role::Unhide),
                Separator,
                MenuEntry::action(MenuItemId::Quit, "Quit", Some("CmdOrCtrl+Q")),
            ],
        };

        let file = MenuGroup {
            label: "File".to_string(),
            entries: vec![
                MenuEntry::action(
                    MenuItemId::OpenMediaFile,
                    "Open Media File...",
                    Some("CmdOrCtrl+O"),
                ),
                Separator,
                MenuEntry::Action {
                    id: MenuItemId::ExportCleanedFile,
                    label: "Export Cleaned File...".to_string(),
                    accelerator: Some("CmdOrCtrl+S".to_string()),
                    enabled: export_enabled,
                },
            ],
        };

        let edit = MenuGroup {
            label: "Edit".to_string(),
            entries: vec![
                MenuEntry::role(Role::Undo),
                MenuEntry::role(Role::Redo),
                Separator,
                MenuEntry::role(Role::Cut),
                MenuEntry::role(Role::Copy),
                MenuEntry::role(Role::Paste),
                MenuEntry::role(Role::SelectAll),
            ],
        };

        let view = MenuGroup {
            label: "View".to_string(),
            entries: vec![
                MenuEntry::role(Role::Reload),
                MenuEntry::role(Role::ForceReload),
                MenuEntry::role(Role::ToggleDevTools),
                Separator,
                MenuEntry::role(Role::ResetZoom),
                MenuEntry::role(Role::ZoomIn),
                MenuEntry::role(Role::ZoomOut),
                Separator,
                MenuEntry::role(Role::ToggleFullscreen),
            ],
        };

        let window = MenuGroup {
            label: "Window".to_string(),
            entries: vec![
                MenuEntry::role(Role::Minimize),
                MenuEntry::role(Role::Close),
                Separator,
                MenuEntry::role(Role::Front),
            ],
        };

        let help = MenuGroup {
            label: "Help".to_string(),
            entries: vec![
                MenuEntry::action(MenuItemId::LearnMore, "Learn More", None),
                MenuEntry::action(MenuItemId::ReportIssue, "Report Issue", None),
            ],
        };

        Self {
            groups: vec![app, file, edit, view, window, help],
        }
    }

    pub fn group(&self, label: &str) -> Option<&MenuGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Find a custom action entry by id.
    pub fn action(&self, id: MenuItemId) -> Option<&MenuEntry> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .find(|e| matches!(e, MenuEntry::Action { id: entry_id, .. } if *entry_id == id))
    }
}

/// What the user clicked, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuSelection {
    Action(MenuItemId),
    Role(Role),
}

/// Opaque handle to an installed application menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuHandle(pub u64);
