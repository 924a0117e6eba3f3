//! WindowManager - tao/wry/muda/rfd implementation of the shell's `Platform`
//!
//! The host creates one WindowManager and calls into it from the event loop.
//! Webview callbacks never touch the manager; they post [`HostSignal`]s
//! through the event loop proxy instead.

use crate::menu::{build_menu, BuiltMenu, MenuIdMap};
use crate::{document_url, mime_for, AssetProvider, HostSignal, PRELOAD_JS};
use blaster_ipc::{Envelope, IpcError, IpcEvent, OutboundMessage, WindowId};
use blaster_shell::{
    validate_external_url, FileDialogOpts, MenuHandle, MenuItemId, MenuTemplate,
    MessageDialogOpts, MessageKind, Platform, ShellError, ViewCommand, WindowOpts,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tao::dpi::LogicalSize;
use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Fullscreen, Icon, Window, WindowBuilder};
use wry::http::{header, HeaderValue, Response, StatusCode};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

const CSP_DEV: &str = "default-src 'self' app:; \
     script-src 'self' app: 'unsafe-inline' 'unsafe-eval'; \
     style-src 'self' app: 'unsafe-inline'; \
     img-src 'self' app: data: blob:; \
     media-src 'self' app: data: blob:; \
     font-src 'self' app: data:; \
     connect-src 'self' app: http://127.0.0.1:* ws://127.0.0.1:*;";

const CSP_PROD: &str = "default-src 'self' app:; \
     script-src 'self' app:; \
     style-src 'self' app: 'unsafe-inline'; \
     img-src 'self' app: data: blob:; \
     media-src 'self' app: data: blob:; \
     font-src 'self' app: data:; \
     connect-src 'self' app:;";

/// Configuration for WindowManager
pub struct WindowManagerConfig {
    pub app_dir: PathBuf,
    /// Enables developer tools and a relaxed CSP
    pub dev_mode: bool,
}

/// The installed menu bar and handles to its custom items
struct InstalledMenu {
    handle: MenuHandle,
    // Keep menu alive
    _menu: muda::Menu,
    items: HashMap<MenuItemId, muda::MenuItem>,
}

/// WindowManager handles all native window, menu and dialog operations
pub struct WindowManager<U: 'static> {
    window_counter: u64,
    menu_counter: u64,
    windows: HashMap<tao::window::WindowId, WindowId>,
    tao_windows: HashMap<WindowId, Window>,
    webviews: HashMap<WindowId, WebView>,
    menu_id_map: MenuIdMap,
    app_menu: Option<InstalledMenu>,
    config: WindowManagerConfig,
    proxy: EventLoopProxy<U>,
    asset_provider: Arc<dyn AssetProvider>,
}

impl<U: From<HostSignal> + 'static> WindowManager<U> {
    pub fn new(
        config: WindowManagerConfig,
        proxy: EventLoopProxy<U>,
        asset_provider: Arc<dyn AssetProvider>,
    ) -> Self {
        Self {
            window_counter: 0,
            menu_counter: 0,
            windows: HashMap::new(),
            tao_windows: HashMap::new(),
            webviews: HashMap::new(),
            menu_id_map: Arc::new(Mutex::new(HashMap::new())),
            app_menu: None,
            config,
            proxy,
            asset_provider,
        }
    }

    /// Get the menu ID map for use in menu event thread
    pub fn menu_id_map(&self) -> MenuIdMap {
        self.menu_id_map.clone()
    }

    /// Borrow the manager as a [`Platform`] for the duration of one event.
    pub fn platform<'a>(
        &'a mut self,
        target: &'a EventLoopWindowTarget<U>,
    ) -> NativePlatform<'a, U> {
        NativePlatform {
            manager: self,
            target,
        }
    }

    // =========================================================================
    // Window Lifecycle
    // =========================================================================

    /// Create a window with its webview
    pub fn create_window(
        &mut self,
        target: &EventLoopWindowTarget<U>,
        opts: &WindowOpts,
    ) -> Result<WindowId, ShellError> {
        tracing::debug!("create_window with opts: {:?}", opts);

        let mut win_builder = WindowBuilder::new()
            .with_title(&opts.title)
            .with_inner_size(LogicalSize::new(opts.width, opts.height))
            .with_min_inner_size(LogicalSize::new(opts.min_width, opts.min_height))
            .with_visible(opts.visible);

        if let Some(icon) = opts.icon.as_deref().and_then(|p| self.load_icon(p)) {
            win_builder = win_builder.with_window_icon(Some(icon));
        }

        #[cfg(target_os = "macos")]
        {
            use tao::platform::macos::WindowBuilderExtMacOS;
            win_builder = win_builder
                .with_titlebar_transparent(true)
                .with_title_hidden(true)
                .with_fullsize_content_view(true);
        }

        let window = win_builder
            .build(target)
            .map_err(|e| ShellError::create_failed(e.to_string()))?;

        self.window_counter += 1;
        let win_id = WindowId(self.window_counter);

        let ipc_proxy = self.proxy.clone();
        let load_proxy = self.proxy.clone();
        let asset_provider = self.asset_provider.clone();
        let document = opts.document.clone();
        let csp = if self.config.dev_mode { CSP_DEV } else { CSP_PROD };
        let start_url = document_url(&opts.document);

        let wv_builder = WebViewBuilder::new()
            .with_initialization_script(PRELOAD_JS)
            .with_devtools(self.config.dev_mode)
            .with_ipc_handler(move |request| match Envelope::parse(request.body()) {
                Ok(envelope) => post(&ipc_proxy, HostSignal::Ipc(IpcEvent::new(win_id, envelope))),
                Err(e) => tracing::warn!("Dropping IPC message from {}: {}", win_id, e),
            })
            .with_on_page_load_handler(move |event, url| {
                if let PageLoadEvent::Finished = event {
                    tracing::debug!("Window {} finished loading {}", win_id, url);
                    post(&load_proxy, HostSignal::DocumentReady(win_id));
                }
            })
            .with_custom_protocol("app".into(), move |_ctx, request| {
                serve_asset(asset_provider.as_ref(), &document, request.uri().path(), csp)
            })
            .with_url(&start_url);

        #[cfg(not(target_os = "linux"))]
        let webview = wv_builder.build(&window);

        #[cfg(target_os = "linux")]
        let webview = {
            use tao::platform::unix::WindowExtUnix;
            use wry::WebViewBuilderExtUnix;
            let vbox = window
                .default_vbox()
                .ok_or_else(ShellError::native_handle_unavailable)?;
            wv_builder.build_gtk(vbox)
        };

        let webview =
            webview.map_err(|e| ShellError::create_failed(format!("webview: {}", e)))?;

        self.windows.insert(window.id(), win_id);
        self.webviews.insert(win_id, webview);
        self.tao_windows.insert(win_id, window);

        tracing::debug!("Created window {} at {}", win_id, start_url);
        Ok(win_id)
    }

    pub fn show_window(&self, window_id: WindowId) -> Result<(), ShellError> {
        let window = self
            .tao_windows
            .get(&window_id)
            .ok_or_else(|| ShellError::window_not_found(window_id))?;
        window.set_visible(true);
        window.set_focus();
        Ok(())
    }

    /// Handle window close requested event. Returns the closed window.
    pub fn handle_close_requested(&mut self, tao_id: tao::window::WindowId) -> Option<WindowId> {
        let win_id = self.windows.remove(&tao_id)?;
        self.webviews.remove(&win_id);
        self.tao_windows.remove(&win_id);
        tracing::debug!("Window {} closed", win_id);
        Some(win_id)
    }

    fn load_icon(&self, path: &str) -> Option<Icon> {
        let full_path = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.config.app_dir.join(path)
        };
        if !full_path.exists() {
            tracing::debug!("No window icon at {}", full_path.display());
            return None;
        }
        let loaded = image::open(&full_path)
            .map_err(|e| e.to_string())
            .and_then(|img| {
                let rgba = img.into_rgba8();
                let (width, height) = rgba.dimensions();
                Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| e.to_string())
            });
        match loaded {
            Ok(icon) => Some(icon),
            Err(e) => {
                tracing::warn!("Failed to load window icon {}: {}", full_path.display(), e);
                None
            }
        }
    }

    // =========================================================================
    // Menus
    // =========================================================================

    /// Set the application menu, replacing any previous one
    pub fn set_app_menu(&mut self, template: &MenuTemplate) -> Result<MenuHandle, ShellError> {
        let built = {
            let mut map = self
                .menu_id_map
                .lock()
                .map_err(|_| ShellError::menu_error("menu id map poisoned"))?;
            map.clear();
            let built = build_menu(template, &mut map)?;
            tracing::debug!("Registered {} menu items for event tracking", map.len());
            built
        };

        self.attach_menu(&built);

        if self.app_menu.is_some() {
            tracing::debug!("Replacing existing app menu");
        }
        self.menu_counter += 1;
        let handle = MenuHandle(self.menu_counter);
        self.app_menu = Some(InstalledMenu {
            handle,
            _menu: built.menu,
            items: built.items,
        });
        Ok(handle)
    }

    fn attach_menu(&self, built: &BuiltMenu) {
        let menu = &built.menu;

        #[cfg(target_os = "macos")]
        {
            menu.init_for_nsapp();
            if let Some(window_menu) = &built.window_menu {
                window_menu.set_as_windows_menu_for_nsapp();
            }
        }

        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            for window in self.tao_windows.values() {
                if let Err(e) = unsafe { menu.init_for_hwnd(window.hwnd() as isize) } {
                    tracing::error!("Failed to attach menu to window: {}", e);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            use gtk::prelude::*;
            use tao::platform::unix::WindowExtUnix;
            for window in self.tao_windows.values() {
                let gtk_win = window.gtk_window();
                let gtk_win_ref: &gtk::Window = gtk_win.upcast_ref();
                if let Err(e) = menu.init_for_gtk_window(gtk_win_ref, window.default_vbox()) {
                    tracing::error!("Failed to attach menu to window: {}", e);
                }
            }
        }
    }

    pub fn set_menu_item_enabled(
        &self,
        handle: MenuHandle,
        item: MenuItemId,
        enabled: bool,
    ) -> Result<(), ShellError> {
        let installed = self
            .app_menu
            .as_ref()
            .filter(|m| m.handle == handle)
            .ok_or_else(|| ShellError::menu_error(format!("stale menu handle {:?}", handle)))?;
        let menu_item = installed
            .items
            .get(&item)
            .ok_or_else(|| ShellError::menu_error(format!("no menu item {}", item.as_str())))?;
        menu_item.set_enabled(enabled);
        tracing::debug!("Menu item {} enabled={}", item.as_str(), enabled);
        Ok(())
    }

    // =========================================================================
    // Dialogs
    // =========================================================================

    /// Show file open dialog
    pub fn show_open_dialog(&self, opts: &FileDialogOpts) -> Option<PathBuf> {
        file_dialog(opts).pick_file()
    }

    /// Show file save dialog
    pub fn show_save_dialog(&self, opts: &FileDialogOpts) -> Option<PathBuf> {
        let mut dialog = file_dialog(opts);
        if let Some(ref name) = opts.default_name {
            dialog = dialog.set_file_name(name);
        }
        dialog.save_file()
    }

    /// Show message dialog
    pub fn show_message_dialog(&self, opts: &MessageDialogOpts) {
        let level = match opts.kind {
            MessageKind::Warning => rfd::MessageLevel::Warning,
            MessageKind::Error => rfd::MessageLevel::Error,
            MessageKind::Info => rfd::MessageLevel::Info,
        };

        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(&opts.title)
            .set_description(message_text(opts))
            .set_buttons(message_buttons(&opts.buttons))
            .show();
    }

    // =========================================================================
    // Renderer
    // =========================================================================

    /// Send message to renderer
    pub fn send_to_renderer(
        &self,
        window_id: WindowId,
        message: &OutboundMessage,
    ) -> Result<(), IpcError> {
        let webview = self
            .webviews
            .get(&window_id)
            .ok_or_else(|| IpcError::window_not_found(window_id))?;
        let script = message.dispatch_script()?;
        webview
            .evaluate_script(&script)
            .map_err(|e| IpcError::delivery_failed(e.to_string()))?;
        tracing::debug!("Sent '{}' to window {}", message.channel(), window_id);
        Ok(())
    }

    pub fn apply_view_command(
        &self,
        window_id: WindowId,
        command: ViewCommand,
    ) -> Result<(), ShellError> {
        let webview = self
            .webviews
            .get(&window_id)
            .ok_or_else(|| ShellError::window_not_found(window_id))?;

        match command {
            ViewCommand::Reload => webview.reload().map_err(webview_err),
            ViewCommand::ForceReload => {
                let url = webview.url().map_err(webview_err)?;
                webview.load_url(&url).map_err(webview_err)
            }
            ViewCommand::SetZoom(factor) => webview.zoom(factor).map_err(webview_err),
            ViewCommand::ToggleDevTools => self.toggle_devtools(webview),
            ViewCommand::ToggleFullscreen => {
                let window = self
                    .tao_windows
                    .get(&window_id)
                    .ok_or_else(|| ShellError::window_not_found(window_id))?;
                let next = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(next);
                Ok(())
            }
        }
    }

    fn toggle_devtools(&self, webview: &WebView) -> Result<(), ShellError> {
        if !self.config.dev_mode {
            tracing::info!("Developer tools are only available with --dev");
            return Ok(());
        }

        #[cfg(any(debug_assertions, feature = "devtools"))]
        {
            if webview.is_devtools_open() {
                webview.close_devtools();
            } else {
                webview.open_devtools();
            }
            Ok(())
        }

        #[cfg(not(any(debug_assertions, feature = "devtools")))]
        {
            let _ = webview;
            Err(ShellError::generic(
                "DevTools not supported on this platform/build",
            ))
        }
    }
}

/// The manager plus the loop target, usable as a [`Platform`] inside one event
pub struct NativePlatform<'a, U: 'static> {
    manager: &'a mut WindowManager<U>,
    target: &'a EventLoopWindowTarget<U>,
}

impl<U: From<HostSignal> + 'static> Platform for NativePlatform<'_, U> {
    fn create_window(&mut self, opts: &WindowOpts) -> Result<WindowId, ShellError> {
        self.manager.create_window(self.target, opts)
    }

    fn show_window(&mut self, window: WindowId) -> Result<(), ShellError> {
        self.manager.show_window(window)
    }

    fn set_app_menu(&mut self, template: &MenuTemplate) -> Result<MenuHandle, ShellError> {
        self.manager.set_app_menu(template)
    }

    fn set_menu_item_enabled(
        &mut self,
        menu: MenuHandle,
        item: MenuItemId,
        enabled: bool,
    ) -> Result<(), ShellError> {
        self.manager.set_menu_item_enabled(menu, item, enabled)
    }

    fn pick_file(&mut self, opts: &FileDialogOpts) -> Option<PathBuf> {
        self.manager.show_open_dialog(opts)
    }

    fn save_file(&mut self, opts: &FileDialogOpts) -> Option<PathBuf> {
        self.manager.show_save_dialog(opts)
    }

    fn show_message(&mut self, opts: &MessageDialogOpts) {
        self.manager.show_message_dialog(opts);
    }

    fn send_to_renderer(
        &mut self,
        window: WindowId,
        message: &OutboundMessage,
    ) -> Result<(), IpcError> {
        self.manager.send_to_renderer(window, message)
    }

    fn open_external(&mut self, url: &str) -> Result<(), ShellError> {
        validate_external_url(url)?;
        open::that(url).map_err(|e| ShellError::open_failed(url, e.to_string()))
    }

    fn apply_view_command(
        &mut self,
        window: WindowId,
        command: ViewCommand,
    ) -> Result<(), ShellError> {
        self.manager.apply_view_command(window, command)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn post<U: From<HostSignal> + 'static>(proxy: &EventLoopProxy<U>, signal: HostSignal) {
    if let Err(e) = proxy.send_event(U::from(signal)) {
        tracing::error!("Failed to post host signal: {}", e);
    }
}

fn webview_err(e: wry::Error) -> ShellError {
    ShellError::generic(format!("webview: {}", e))
}

fn file_dialog(opts: &FileDialogOpts) -> rfd::FileDialog {
    let mut dialog = rfd::FileDialog::new();
    if let Some(ref title) = opts.title {
        dialog = dialog.set_title(title);
    }
    for filter in &opts.filters {
        let exts: Vec<&str> = filter.extensions.iter().map(|s| s.as_str()).collect();
        dialog = dialog.add_filter(&filter.name, &exts);
    }
    dialog
}

/// rfd has no separate detail line, so it follows the message.
fn message_text(opts: &MessageDialogOpts) -> String {
    match opts.detail {
        Some(ref detail) => format!("{}\n\n{}", opts.message, detail),
        None => opts.message.clone(),
    }
}

fn message_buttons(buttons: &[String]) -> rfd::MessageButtons {
    match buttons {
        [] => rfd::MessageButtons::Ok,
        [only] if only == "OK" => rfd::MessageButtons::Ok,
        [only] => rfd::MessageButtons::OkCustom(only.clone()),
        [ok, cancel] => rfd::MessageButtons::OkCancelCustom(ok.clone(), cancel.clone()),
        [yes, no, cancel, rest @ ..] => {
            if !rest.is_empty() {
                tracing::warn!(
                    "Message dialog supports at most 3 buttons, got {}. Extra buttons will be ignored.",
                    buttons.len()
                );
            }
            rfd::MessageButtons::YesNoCancelCustom(yes.clone(), no.clone(), cancel.clone())
        }
    }
}

/// Answer an `app://` request from the asset provider.
fn serve_asset(
    assets: &dyn AssetProvider,
    document: &str,
    request_path: &str,
    csp: &'static str,
) -> Response<Cow<'static, [u8]>> {
    let path = match request_path.trim_matches('/') {
        "" => document,
        path => path,
    };

    match assets.get_asset(path) {
        Some(bytes) => respond(StatusCode::OK, mime_for(path), csp, bytes),
        None => {
            tracing::debug!("app:// asset not found: {}", path);
            respond(
                StatusCode::NOT_FOUND,
                "text/plain; charset=utf-8",
                csp,
                format!("Not found: {}", path).into_bytes(),
            )
        }
    }
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    csp: &'static str,
    body: Vec<u8>,
) -> Response<Cow<'static, [u8]>> {
    let mut response = Response::new(Cow::Owned(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(csp),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
