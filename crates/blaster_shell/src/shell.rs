//! Lifecycle controller and menu/IPC handlers.
//!
//! The host feeds every native event through [`Shell::handle_event`] on the
//! event loop thread. Handlers take `&mut self`, so they never overlap.

use crate::dialogs;
use crate::manifest::Manifest;
use crate::menu::{MenuHandle, MenuItemId, MenuSelection, MenuTemplate, Role};
use crate::platform::{validate_external_url, Platform};
use crate::{ShellError, ViewCommand};
use blaster_ipc::{
    ChannelAllowlist, ChannelChecker, InboundMessage, IpcEvent, OutboundMessage, WindowId,
};

/// Most zoomed-out level reachable through the View menu
pub const MIN_ZOOM_LEVEL: i32 = -7;
/// Most zoomed-in level reachable through the View menu
pub const MAX_ZOOM_LEVEL: i32 = 8;

/// Zoom factor for a level; each step scales by 1.2.
pub fn zoom_factor(level: i32) -> f64 {
    1.2f64.powi(level)
}

// ============================================================================
// Data Types
// ============================================================================

/// `NotStarted -> Ready -> {Quitting | Idle -> Ready}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecyclePhase {
    #[default]
    NotStarted,
    /// A window exists or is being created
    Ready,
    /// Resident with no windows
    Idle,
    Quitting,
}

/// Process-wide shell state
#[derive(Debug, Default)]
pub struct AppState {
    pub phase: LifecyclePhase,
    pub window: Option<WindowId>,
    /// Whether the current window has been made visible
    pub window_shown: bool,
    pub menu: Option<MenuHandle>,
    /// Mirrors the most recent `processing-status`
    pub export_enabled: bool,
    pub zoom_level: i32,
}

/// Native events translated by the host
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// The event loop is running
    Started,
    /// The window's document finished loading
    DocumentReady(WindowId),
    WindowClosed(WindowId),
    /// The user re-activated the app (dock click)
    Activate,
    Menu(MenuSelection),
    Ipc(IpcEvent),
}

/// What the host should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

// ============================================================================
// Shell
// ============================================================================

pub struct Shell {
    manifest: Manifest,
    channels: Box<dyn ChannelChecker>,
    state: AppState,
}

impl Shell {
    pub fn new(manifest: Manifest) -> Self {
        let channels = Box::new(ChannelAllowlist::new(manifest.ipc.channels.clone()));
        Self {
            manifest,
            channels,
            state: AppState::default(),
        }
    }

    /// Replace the inbound channel checker built from the manifest.
    pub fn with_channel_checker(mut self, checker: Box<dyn ChannelChecker>) -> Self {
        self.channels = checker;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn handle_event<P: Platform>(&mut self, event: ShellEvent, platform: &mut P) -> Flow {
        tracing::debug!("Shell event: {:?}", event);
        match event {
            ShellEvent::Started => self.on_started(platform),
            ShellEvent::DocumentReady(window) => {
                self.on_document_ready(window, platform);
                Flow::Continue
            }
            ShellEvent::WindowClosed(window) => self.on_window_closed(window),
            ShellEvent::Activate => {
                self.on_activate(platform);
                Flow::Continue
            }
            ShellEvent::Menu(selection) => self.on_menu(selection, platform),
            ShellEvent::Ipc(event) => {
                self.on_ipc(event, platform);
                Flow::Continue
            }
        }
    }

    // =========================================================================
    // Window Lifecycle
    // =========================================================================

    /// Create the main window hidden and install the application menu.
    ///
    /// Refused while a window is held. The menu is rebuilt on every call with
    /// Export disabled until the new document reports a cleaned file.
    pub fn create_window<P: Platform>(&mut self, platform: &mut P) -> Result<WindowId, ShellError> {
        if let Some(existing) = self.state.window {
            return Err(ShellError::window_already_open(existing));
        }

        let window = platform.create_window(&self.manifest.window_opts())?;
        self.state.window = Some(window);
        self.state.window_shown = false;
        self.state.zoom_level = 0;
        self.state.export_enabled = false;
        self.state.phase = LifecyclePhase::Ready;
        tracing::info!("Created window {}", window);

        if let Err(e) = self.create_application_menu(platform) {
            tracing::error!("Failed to install application menu: {}", e);
        }
        Ok(window)
    }

    /// Build the menu template from current state and install it.
    pub fn create_application_menu<P: Platform>(
        &mut self,
        platform: &mut P,
    ) -> Result<MenuHandle, ShellError> {
        let template = MenuTemplate::application(&self.manifest.app.name, self.state.export_enabled);
        let handle = platform.set_app_menu(&template)?;
        if self.state.menu.is_some() {
            tracing::debug!("Replaced existing application menu");
        }
        self.state.menu = Some(handle);
        Ok(handle)
    }

    fn on_started<P: Platform>(&mut self, platform: &mut P) -> Flow {
        if self.state.phase != LifecyclePhase::NotStarted {
            tracing::warn!("Ignoring duplicate start in phase {:?}", self.state.phase);
            return Flow::Continue;
        }
        self.state.phase = LifecyclePhase::Ready;
        tracing::info!("Starting {}", self.manifest.about().version_line());

        if let Err(e) = self.create_window(platform) {
            tracing::error!("Failed to create main window: {}", e);
            if !self.manifest.lifecycle.resident_without_windows {
                return self.quit();
            }
            self.state.phase = LifecyclePhase::Idle;
        }
        Flow::Continue
    }

    fn on_document_ready<P: Platform>(&mut self, window: WindowId, platform: &mut P) {
        if self.state.window != Some(window) {
            tracing::debug!("Ignoring ready signal from stale window {}", window);
            return;
        }
        if self.state.window_shown {
            return;
        }
        match platform.show_window(window) {
            Ok(()) => {
                self.state.window_shown = true;
                tracing::debug!("Window {} shown", window);
            }
            Err(e) => tracing::error!("Failed to show window {}: {}", window, e),
        }
    }

    fn on_window_closed(&mut self, window: WindowId) -> Flow {
        if self.state.window != Some(window) {
            tracing::warn!("Close reported for unknown window {}", window);
            return Flow::Continue;
        }
        self.state.window = None;
        self.state.window_shown = false;
        tracing::debug!("Window {} closed", window);

        if self.manifest.lifecycle.resident_without_windows {
            self.state.phase = LifecyclePhase::Idle;
            tracing::info!("All windows closed, staying resident");
            Flow::Continue
        } else {
            self.quit()
        }
    }

    fn on_activate<P: Platform>(&mut self, platform: &mut P) {
        match self.state.phase {
            LifecyclePhase::NotStarted | LifecyclePhase::Quitting => {
                tracing::debug!("Ignoring activate in phase {:?}", self.state.phase);
            }
            _ if self.state.window.is_some() => {}
            _ => {
                if let Err(e) = self.create_window(platform) {
                    tracing::error!("Failed to recreate window on activate: {}", e);
                }
            }
        }
    }

    fn quit(&mut self) -> Flow {
        self.state.phase = LifecyclePhase::Quitting;
        tracing::info!("Quitting");
        Flow::Exit
    }

    // =========================================================================
    // Menu Actions
    // =========================================================================

    fn on_menu<P: Platform>(&mut self, selection: MenuSelection, platform: &mut P) -> Flow {
        if self.state.phase == LifecyclePhase::Quitting {
            return Flow::Exit;
        }
        match selection {
            MenuSelection::Action(MenuItemId::Quit) => return self.quit(),
            MenuSelection::Action(MenuItemId::About) => self.show_about(platform),
            MenuSelection::Action(MenuItemId::Preferences) => {
                tracing::info!("Preferences are not available yet");
            }
            MenuSelection::Action(MenuItemId::OpenMediaFile) => self.open_media_file(platform),
            MenuSelection::Action(MenuItemId::ExportCleanedFile) => {
                self.export_cleaned_file(platform)
            }
            MenuSelection::Action(MenuItemId::LearnMore) => {
                let url = self.manifest.help.learn_more_url.clone();
                self.open_link(&url, platform);
            }
            MenuSelection::Action(MenuItemId::ReportIssue) => {
                let url = self.manifest.help.report_issue_url.clone();
                self.open_link(&url, platform);
            }
            MenuSelection::Role(role) => self.apply_role(role, platform),
        }
        Flow::Continue
    }

    fn show_about<P: Platform>(&self, platform: &mut P) {
        let opts = dialogs::about_opts(&self.manifest.about());
        dialogs::show_message_dialog(platform, &opts);
    }

    fn open_media_file<P: Platform>(&mut self, platform: &mut P) {
        if self.state.window.is_none() {
            tracing::info!("Open requested with no window, ignoring");
            return;
        }
        if let Some(path) = dialogs::show_open_dialog(platform, &dialogs::open_media_opts()) {
            tracing::info!("Media file selected: {}", path.display());
            self.notify(OutboundMessage::FileSelected(path), platform);
        }
    }

    fn export_cleaned_file<P: Platform>(&mut self, platform: &mut P) {
        if self.state.window.is_none() {
            tracing::info!("Export requested with no window, ignoring");
            return;
        }
        if !self.state.export_enabled {
            tracing::info!("Export requested before a cleaned file is ready, ignoring");
            return;
        }
        if let Some(path) = dialogs::show_save_dialog(platform, &dialogs::export_opts()) {
            tracing::info!("Export destination chosen: {}", path.display());
            self.notify(OutboundMessage::ExportFile(path), platform);
        }
    }

    fn open_link<P: Platform>(&self, url: &str, platform: &mut P) {
        let result = validate_external_url(url).and_then(|_| platform.open_external(url));
        if let Err(e) = result {
            tracing::error!("Failed to open {}: {}", url, e);
        }
    }

    fn apply_role<P: Platform>(&mut self, role: Role, platform: &mut P) {
        let Some(window) = self.state.window else {
            tracing::debug!("No window for {:?}", role);
            return;
        };

        let command = match role {
            Role::Reload => ViewCommand::Reload,
            Role::ForceReload => ViewCommand::ForceReload,
            Role::ToggleDevTools => ViewCommand::ToggleDevTools,
            Role::ToggleFullscreen => ViewCommand::ToggleFullscreen,
            Role::ResetZoom => self.set_zoom_level(0),
            Role::ZoomIn => self.set_zoom_level(self.state.zoom_level + 1),
            Role::ZoomOut => self.set_zoom_level(self.state.zoom_level - 1),
            native => {
                tracing::debug!("Role {:?} is handled by the native menu", native);
                return;
            }
        };

        if let Err(e) = platform.apply_view_command(window, command) {
            tracing::error!("Failed to apply {:?} to window {}: {}", command, window, e);
        }
    }

    fn set_zoom_level(&mut self, level: i32) -> ViewCommand {
        self.state.zoom_level = level.clamp(MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL);
        ViewCommand::SetZoom(zoom_factor(self.state.zoom_level))
    }

    // =========================================================================
    // IPC
    // =========================================================================

    fn notify<P: Platform>(&self, message: OutboundMessage, platform: &mut P) {
        let Some(window) = self.state.window else {
            tracing::warn!(
                "Dropping '{}' notification, no window is open",
                message.channel()
            );
            return;
        };
        if let Err(e) = platform.send_to_renderer(window, &message) {
            tracing::error!("Failed to deliver '{}': {}", message.channel(), e);
        }
    }

    fn on_ipc<P: Platform>(&mut self, event: IpcEvent, platform: &mut P) {
        if self.channels.check_channel(&event.channel).is_err() {
            return;
        }
        match InboundMessage::from_event(&event) {
            Ok(InboundMessage::ProcessingStatus(enabled)) => {
                self.on_processing_status(enabled, platform)
            }
            Err(e) => tracing::warn!("Dropping message from {}: {}", event.window_id, e),
        }
    }

    /// Record whether a cleaned file can be exported and mirror it on the
    /// Export menu item.
    pub fn on_processing_status<P: Platform>(&mut self, enabled: bool, platform: &mut P) {
        self.state.export_enabled = enabled;
        let Some(menu) = self.state.menu else {
            tracing::debug!("No application menu installed, export state stored only");
            return;
        };
        if let Err(e) = platform.set_menu_item_enabled(menu, MenuItemId::ExportCleanedFile, enabled)
        {
            tracing::error!("Failed to update export menu item: {}", e);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuEntry;
    use crate::{FileDialogOpts, MessageDialogOpts, WindowOpts};
    use blaster_ipc::IpcError;
    use std::path::PathBuf;

    #[derive(Default)]
    struct FakePlatform {
        next_id: u64,
        fail_create: bool,
        created: Vec<WindowOpts>,
        shown: Vec<WindowId>,
        menus: Vec<MenuTemplate>,
        enabled_calls: Vec<(MenuHandle, MenuItemId, bool)>,
        pick_result: Option<PathBuf>,
        save_result: Option<PathBuf>,
        open_dialogs: Vec<FileDialogOpts>,
        save_dialogs: Vec<FileDialogOpts>,
        messages: Vec<MessageDialogOpts>,
        sent: Vec<(WindowId, OutboundMessage)>,
        opened: Vec<String>,
        view_commands: Vec<(WindowId, ViewCommand)>,
    }

    impl Platform for FakePlatform {
        fn create_window(&mut self, opts: &WindowOpts) -> Result<WindowId, ShellError> {
            if self.fail_create {
                return Err(ShellError::create_failed("no display"));
            }
            self.next_id += 1;
            self.created.push(opts.clone());
            Ok(WindowId(self.next_id))
        }

        fn show_window(&mut self, window: WindowId) -> Result<(), ShellError> {
            self.shown.push(window);
            Ok(())
        }

        fn set_app_menu(&mut self, template: &MenuTemplate) -> Result<MenuHandle, ShellError> {
            self.next_id += 1;
            self.menus.push(template.clone());
            Ok(MenuHandle(self.next_id))
        }

        fn set_menu_item_enabled(
            &mut self,
            menu: MenuHandle,
            item: MenuItemId,
            enabled: bool,
        ) -> Result<(), ShellError> {
            self.enabled_calls.push((menu, item, enabled));
            Ok(())
        }

        fn pick_file(&mut self, opts: &FileDialogOpts) -> Option<PathBuf> {
            self.open_dialogs.push(opts.clone());
            self.pick_result.clone()
        }

        fn save_file(&mut self, opts: &FileDialogOpts) -> Option<PathBuf> {
            self.save_dialogs.push(opts.clone());
            self.save_result.clone()
        }

        fn show_message(&mut self, opts: &MessageDialogOpts) {
            self.messages.push(opts.clone());
        }

        fn send_to_renderer(
            &mut self,
            window: WindowId,
            message: &OutboundMessage,
        ) -> Result<(), IpcError> {
            self.sent.push((window, message.clone()));
            Ok(())
        }

        fn open_external(&mut self, url: &str) -> Result<(), ShellError> {
            self.opened.push(url.to_string());
            Ok(())
        }

        fn apply_view_command(
            &mut self,
            window: WindowId,
            command: ViewCommand,
        ) -> Result<(), ShellError> {
            self.view_commands.push((window, command));
            Ok(())
        }
    }

    fn manifest(resident: bool) -> Manifest {
        let mut manifest = Manifest::default();
        manifest.lifecycle.resident_without_windows = resident;
        manifest
    }

    fn started(resident: bool) -> (Shell, FakePlatform, WindowId) {
        let mut shell = Shell::new(manifest(resident));
        let mut platform = FakePlatform::default();
        assert_eq!(
            shell.handle_event(ShellEvent::Started, &mut platform),
            Flow::Continue
        );
        let window = shell.state().window.expect("window after start");
        (shell, platform, window)
    }

    fn status_event(window: WindowId, payload: serde_json::Value) -> ShellEvent {
        ShellEvent::Ipc(IpcEvent {
            window_id: window,
            channel: "processing-status".to_string(),
            payload,
        })
    }

    fn export_enabled_in(template: &MenuTemplate) -> bool {
        match template.action(MenuItemId::ExportCleanedFile) {
            Some(MenuEntry::Action { enabled, .. }) => *enabled,
            _ => panic!("export item missing"),
        }
    }

    #[test]
    fn test_start_creates_hidden_window_with_menu() {
        let (shell, platform, _) = started(false);
        assert_eq!(shell.state().phase, LifecyclePhase::Ready);
        assert_eq!(platform.created.len(), 1);
        assert!(!platform.created[0].visible);
        assert_eq!(platform.created[0].width, 1200);
        assert_eq!(platform.created[0].height, 900);
        assert_eq!(platform.menus.len(), 1);
        assert!(!export_enabled_in(&platform.menus[0]));
        assert!(platform.shown.is_empty());
    }

    #[test]
    fn test_window_shown_after_document_ready() {
        let (mut shell, mut platform, window) = started(false);
        shell.handle_event(ShellEvent::DocumentReady(window), &mut platform);
        shell.handle_event(ShellEvent::DocumentReady(window), &mut platform);
        shell.handle_event(ShellEvent::DocumentReady(WindowId(99)), &mut platform);
        assert_eq!(platform.shown, vec![window]);
        assert!(shell.state().window_shown);
    }

    #[test]
    fn test_close_quits_when_not_resident() {
        let (mut shell, mut platform, window) = started(false);
        let flow = shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);
        assert_eq!(flow, Flow::Exit);
        assert_eq!(shell.state().phase, LifecyclePhase::Quitting);
        assert!(shell.state().window.is_none());
    }

    #[test]
    fn test_close_idles_when_resident() {
        let (mut shell, mut platform, window) = started(true);
        let flow = shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(shell.state().phase, LifecyclePhase::Idle);
        assert!(shell.state().window.is_none());
    }

    #[test]
    fn test_activate_without_window_creates_one() {
        let (mut shell, mut platform, window) = started(true);
        shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);

        shell.handle_event(ShellEvent::Activate, &mut platform);
        let new_window = shell.state().window.expect("window after activate");
        assert_ne!(new_window, window);
        assert_eq!(shell.state().phase, LifecyclePhase::Ready);
        assert_eq!(platform.created.len(), 2);
        assert_eq!(platform.menus.len(), 2);
        assert_eq!(platform.shown, Vec::<WindowId>::new());

        shell.handle_event(ShellEvent::DocumentReady(new_window), &mut platform);
        assert_eq!(platform.shown, vec![new_window]);
    }

    #[test]
    fn test_activate_with_window_is_noop() {
        let (mut shell, mut platform, window) = started(true);
        shell.handle_event(ShellEvent::Activate, &mut platform);
        assert_eq!(platform.created.len(), 1);
        assert_eq!(shell.state().window, Some(window));
    }

    #[test]
    fn test_activate_before_start_is_ignored() {
        let mut shell = Shell::new(manifest(true));
        let mut platform = FakePlatform::default();
        shell.handle_event(ShellEvent::Activate, &mut platform);
        assert!(platform.created.is_empty());
        assert_eq!(shell.state().phase, LifecyclePhase::NotStarted);
    }

    #[test]
    fn test_second_window_refused() {
        let (mut shell, mut platform, window) = started(false);
        let err = shell.create_window(&mut platform).unwrap_err();
        assert!(matches!(err, ShellError::WindowAlreadyOpen { .. }));
        assert_eq!(platform.created.len(), 1);
        assert_eq!(shell.state().window, Some(window));
    }

    #[test]
    fn test_start_failure_exits_when_not_resident() {
        let mut shell = Shell::new(manifest(false));
        let mut platform = FakePlatform {
            fail_create: true,
            ..Default::default()
        };
        assert_eq!(
            shell.handle_event(ShellEvent::Started, &mut platform),
            Flow::Exit
        );

        let mut shell = Shell::new(manifest(true));
        assert_eq!(
            shell.handle_event(ShellEvent::Started, &mut platform),
            Flow::Continue
        );
        assert_eq!(shell.state().phase, LifecyclePhase::Idle);
    }

    #[test]
    fn test_open_cancelled_sends_nothing() {
        let (mut shell, mut platform, _) = started(false);
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::OpenMediaFile)),
            &mut platform,
        );
        assert_eq!(platform.open_dialogs.len(), 1);
        assert_eq!(
            platform.open_dialogs[0].title.as_deref(),
            Some("Select Media File")
        );
        assert!(platform.sent.is_empty());
    }

    #[test]
    fn test_open_selected_sends_one_notification() {
        let (mut shell, mut platform, window) = started(false);
        platform.pick_result = Some(PathBuf::from("/tmp/clip.mp4"));
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::OpenMediaFile)),
            &mut platform,
        );
        assert_eq!(
            platform.sent,
            vec![(
                window,
                OutboundMessage::FileSelected(PathBuf::from("/tmp/clip.mp4"))
            )]
        );
    }

    #[test]
    fn test_export_flow() {
        let (mut shell, mut platform, window) = started(false);
        assert!(!shell.state().export_enabled);

        shell.handle_event(status_event(window, serde_json::json!(true)), &mut platform);
        assert!(shell.state().export_enabled);
        let menu = shell.state().menu.unwrap();
        assert_eq!(
            platform.enabled_calls,
            vec![(menu, MenuItemId::ExportCleanedFile, true)]
        );

        platform.save_result = Some(PathBuf::from("/tmp/cleaned_media_file.mp4"));
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::ExportCleanedFile)),
            &mut platform,
        );
        assert_eq!(platform.save_dialogs.len(), 1);
        let opts = &platform.save_dialogs[0];
        assert_eq!(opts.default_name.as_deref(), Some("cleaned_media_file"));
        assert_eq!(opts.filters[0].extensions, vec!["mp4", "mp3", "wav"]);
        assert_eq!(
            platform.sent,
            vec![(
                window,
                OutboundMessage::ExportFile(PathBuf::from("/tmp/cleaned_media_file.mp4"))
            )]
        );
    }

    #[test]
    fn test_export_ignored_while_disabled() {
        let (mut shell, mut platform, _) = started(false);
        platform.save_result = Some(PathBuf::from("/tmp/out.mp4"));
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::ExportCleanedFile)),
            &mut platform,
        );
        assert!(platform.save_dialogs.is_empty());
        assert!(platform.sent.is_empty());
    }

    #[test]
    fn test_export_state_follows_latest_status() {
        let (mut shell, mut platform, window) = started(false);
        for flag in [true, false, true, false] {
            shell.handle_event(status_event(window, serde_json::json!(flag)), &mut platform);
            assert_eq!(shell.state().export_enabled, flag);
            assert_eq!(platform.enabled_calls.last().map(|c| c.2), Some(flag));
        }
    }

    #[test]
    fn test_status_without_menu_is_stored() {
        let mut shell = Shell::new(manifest(false));
        let mut platform = FakePlatform::default();
        shell.on_processing_status(true, &mut platform);
        assert!(shell.state().export_enabled);
        assert!(platform.enabled_calls.is_empty());

        // A menu built afterwards starts from the stored state.
        shell.handle_event(ShellEvent::Started, &mut platform);
        assert!(export_enabled_in(&platform.menus[0]));
    }

    #[test]
    fn test_non_boolean_status_is_rejected() {
        let (mut shell, mut platform, window) = started(false);
        shell.handle_event(status_event(window, serde_json::json!(true)), &mut platform);
        shell.handle_event(status_event(window, serde_json::json!("no")), &mut platform);
        assert!(shell.state().export_enabled);
        assert_eq!(platform.enabled_calls.len(), 1);
    }

    #[test]
    fn test_blocked_channel_is_dropped() {
        let (mut shell, mut platform, window) = started(false);
        shell.handle_event(
            ShellEvent::Ipc(IpcEvent {
                window_id: window,
                channel: "shell-exec".to_string(),
                payload: serde_json::json!(true),
            }),
            &mut platform,
        );
        assert!(!shell.state().export_enabled);
        assert!(platform.enabled_calls.is_empty());
    }

    #[test]
    fn test_about_dialog() {
        let (mut shell, mut platform, _) = started(false);
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::About)),
            &mut platform,
        );
        assert_eq!(platform.messages.len(), 1);
        assert_eq!(platform.messages[0].title, "About Profanity Blaster");
        assert_eq!(platform.messages[0].message, "Profanity Blaster v1.0.0");
    }

    #[test]
    fn test_help_links() {
        let mut manifest = manifest(false);
        manifest.help.report_issue_url = "file:///etc/passwd".to_string();
        let mut shell = Shell::new(manifest);
        let mut platform = FakePlatform::default();
        shell.handle_event(ShellEvent::Started, &mut platform);

        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::LearnMore)),
            &mut platform,
        );
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::ReportIssue)),
            &mut platform,
        );
        assert_eq!(platform.opened, vec!["https://github.com".to_string()]);
    }

    #[test]
    fn test_quit_exits_regardless_of_residency() {
        for resident in [false, true] {
            let (mut shell, mut platform, _) = started(resident);
            let flow = shell.handle_event(
                ShellEvent::Menu(MenuSelection::Action(MenuItemId::Quit)),
                &mut platform,
            );
            assert_eq!(flow, Flow::Exit);
            assert_eq!(shell.state().phase, LifecyclePhase::Quitting);
        }
    }

    #[test]
    fn test_preferences_is_noop() {
        let (mut shell, mut platform, _) = started(false);
        let flow = shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::Preferences)),
            &mut platform,
        );
        assert_eq!(flow, Flow::Continue);
        assert!(platform.messages.is_empty());
        assert!(platform.open_dialogs.is_empty());
    }

    #[test]
    fn test_zoom_clamps() {
        let (mut shell, mut platform, window) = started(false);
        for _ in 0..20 {
            shell.handle_event(ShellEvent::Menu(MenuSelection::Role(Role::ZoomIn)), &mut platform);
        }
        assert_eq!(shell.state().zoom_level, MAX_ZOOM_LEVEL);
        assert_eq!(
            platform.view_commands.last(),
            Some(&(window, ViewCommand::SetZoom(zoom_factor(MAX_ZOOM_LEVEL))))
        );

        for _ in 0..20 {
            shell.handle_event(ShellEvent::Menu(MenuSelection::Role(Role::ZoomOut)), &mut platform);
        }
        assert_eq!(shell.state().zoom_level, MIN_ZOOM_LEVEL);

        shell.handle_event(ShellEvent::Menu(MenuSelection::Role(Role::ResetZoom)), &mut platform);
        assert_eq!(shell.state().zoom_level, 0);
        assert_eq!(
            platform.view_commands.last(),
            Some(&(window, ViewCommand::SetZoom(1.0)))
        );
    }

    #[test]
    fn test_zoom_factor() {
        assert_eq!(zoom_factor(0), 1.0);
        assert!((zoom_factor(1) - 1.2).abs() < 1e-9);
        assert!((zoom_factor(-1) - 1.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_resets_with_new_window() {
        let (mut shell, mut platform, window) = started(true);
        shell.handle_event(ShellEvent::Menu(MenuSelection::Role(Role::ZoomIn)), &mut platform);
        assert_eq!(shell.state().zoom_level, 1);
        shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);
        shell.handle_event(ShellEvent::Activate, &mut platform);
        assert_eq!(shell.state().zoom_level, 0);
    }

    #[test]
    fn test_view_roles_map_to_commands() {
        let (mut shell, mut platform, window) = started(false);
        for role in [
            Role::Reload,
            Role::ForceReload,
            Role::ToggleDevTools,
            Role::ToggleFullscreen,
            Role::Copy,
        ] {
            shell.handle_event(ShellEvent::Menu(MenuSelection::Role(role)), &mut platform);
        }
        assert_eq!(
            platform.view_commands,
            vec![
                (window, ViewCommand::Reload),
                (window, ViewCommand::ForceReload),
                (window, ViewCommand::ToggleDevTools),
                (window, ViewCommand::ToggleFullscreen),
            ]
        );
    }

    #[test]
    fn test_new_window_starts_with_export_disabled() {
        let (mut shell, mut platform, window) = started(true);
        shell.handle_event(status_event(window, serde_json::json!(true)), &mut platform);
        shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);
        shell.handle_event(ShellEvent::Activate, &mut platform);

        assert_eq!(platform.menus.len(), 2);
        assert!(!export_enabled_in(&platform.menus[1]));
        assert!(!shell.state().export_enabled);

        platform.save_result = Some(PathBuf::from("/tmp/out.mp4"));
        shell.handle_event(
            ShellEvent::Menu(MenuSelection::Action(MenuItemId::ExportCleanedFile)),
            &mut platform,
        );
        assert!(platform.save_dialogs.is_empty());
        assert!(platform.sent.is_empty());
    }

    #[test]
    fn test_file_actions_ignored_while_idle() {
        let (mut shell, mut platform, window) = started(true);
        shell.handle_event(status_event(window, serde_json::json!(true)), &mut platform);
        shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);
        assert_eq!(shell.state().phase, LifecyclePhase::Idle);

        platform.pick_result = Some(PathBuf::from("/tmp/clip.mp4"));
        platform.save_result = Some(PathBuf::from("/tmp/out.mp4"));
        for item in [MenuItemId::OpenMediaFile, MenuItemId::ExportCleanedFile] {
            assert_eq!(
                shell.handle_event(ShellEvent::Menu(MenuSelection::Action(item)), &mut platform),
                Flow::Continue
            );
        }
        assert!(platform.open_dialogs.is_empty());
        assert!(platform.save_dialogs.is_empty());
        assert!(platform.sent.is_empty());
    }

    #[test]
    fn test_notification_without_window_is_dropped() {
        let (mut shell, mut platform, window) = started(true);
        shell.handle_event(ShellEvent::WindowClosed(window), &mut platform);
        shell.notify(
            OutboundMessage::FileSelected(PathBuf::from("/tmp/clip.mp4")),
            &mut platform,
        );
        assert!(platform.sent.is_empty());
    }
}
