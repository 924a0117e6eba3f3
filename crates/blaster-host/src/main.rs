//! Profanity Blaster host - native shell around the media-cleaning UI
//!
//! The host owns the tao event loop and drives the platform-independent
//! [`Shell`] with native events. The UI document itself (`web/index.html`)
//! does all media processing; the host only provides the window, the menu
//! bar, file dialogs and the IPC link.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             Tao Event Loop (OS)              │
//! └──────┬──────────────────────────▲────────────┘
//!        │ ShellEvent               │ UserEvent (proxy)
//! ┌──────▼───────┐           ┌──────┴────────────────────┐
//! │    Shell     │──Platform─►  WindowManager             │
//! │ (lifecycle,  │           │  wry WebView ◄─► web/      │
//! │  menu, IPC)  │           │  muda menu ─► menu thread  │
//! └──────────────┘           └───────────────────────────┘
//! ```
//!
//! # IPC Communication
//!
//! **Renderer → Host:**
//! ```text
//! window.host.send("processing-status", true)
//!   → WebView IPC → EventLoopProxy → Shell
//! ```
//!
//! **Host → Renderer:**
//! ```text
//! OutboundMessage::FileSelected(path)
//!   → evaluate_script()
//!   → window.__host_dispatch({channel, payload})
//! ```
//!
//! # Environment Variables
//!
//! - `BLASTER_LOG` - Log filter (default: "info")

use anyhow::{Context, Result};
use blaster_ipc::PermissiveChannelChecker;
use blaster_shell::{Flow, Manifest, MenuSelection, Shell, ShellEvent};
use blaster_window::{FsAssetProvider, HostSignal, MenuIdMap, WindowManager, WindowManagerConfig};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};

const USAGE: &str = "Usage: blaster-host [--app-dir <path>] [--dev] [--version]";

/// Custom user events for the tao event loop
#[derive(Debug)]
enum UserEvent {
    /// Webview callbacks (IPC, page load)
    Host(HostSignal),
    /// Menu clicks forwarded from the muda receiver thread
    Menu(MenuSelection),
}

impl From<HostSignal> for UserEvent {
    fn from(signal: HostSignal) -> Self {
        UserEvent::Host(signal)
    }
}

/// Command line options
#[derive(Debug, PartialEq, Eq)]
struct Args {
    app_dir: Option<PathBuf>,
    dev_mode: bool,
    version: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = args.into_iter();
    let mut parsed = Args {
        app_dir: None,
        dev_mode: false,
        version: false,
    };
    while let Some(a) = args.next() {
        match a.as_str() {
            "--app-dir" => {
                let dir = args
                    .next()
                    .with_context(|| format!("--app-dir requires a path\n{}", USAGE))?;
                parsed.app_dir = Some(PathBuf::from(dir));
            }
            "--dev" => parsed.dev_mode = true,
            "--version" | "-V" => parsed.version = true,
            // macOS passes a process serial number when launched from Finder
            other if other.starts_with("-psn_") => {}
            other => anyhow::bail!("Unknown argument: {}\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    // Use BLASTER_LOG env var for log level configuration, default to "info"
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("BLASTER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = parse_args(env::args().skip(1))?;
    let app_dir = match args.app_dir {
        Some(dir) => dir,
        None => env::current_dir().context("resolving current directory")?,
    };

    let manifest = Manifest::load(&app_dir)
        .with_context(|| format!("loading manifest from {}", app_dir.display()))?;
    let about = manifest.about();

    if args.version {
        println!("{}", about.render());
        return Ok(());
    }

    tracing::info!(
        "Starting app: {} ({}, {})",
        about.version_line(),
        manifest.app.identifier,
        about.credits
    );
    tracing::debug!("App directory: {}", app_dir.display());

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let mut window_manager: WindowManager<UserEvent> = WindowManager::new(
        WindowManagerConfig {
            app_dir: app_dir.clone(),
            dev_mode: args.dev_mode,
        },
        proxy.clone(),
        Arc::new(FsAssetProvider::new(&app_dir)),
    );

    // Set up menu event receiver from muda and forward into the event loop
    let menu_id_map = window_manager.menu_id_map();
    thread::spawn(move || forward_menu_events(menu_id_map, proxy));

    let mut shell = Shell::new(manifest);
    if args.dev_mode {
        tracing::info!("Dev mode: all inbound IPC channels allowed");
        shell = shell.with_channel_checker(Box::new(PermissiveChannelChecker));
    }

    tracing::debug!("starting tao event loop");
    event_loop.run(move |event, event_loop_target, control| {
        *control = ControlFlow::Wait;

        let shell_event = match event {
            Event::NewEvents(StartCause::Init) => Some(ShellEvent::Started),
            Event::Reopen { .. } => Some(ShellEvent::Activate),

            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                window_id,
                ..
            } => match window_manager.handle_close_requested(window_id) {
                Some(win_id) => Some(ShellEvent::WindowClosed(win_id)),
                None => {
                    tracing::warn!("Close requested for unknown window: {:?}", window_id);
                    None
                }
            },

            Event::UserEvent(UserEvent::Host(HostSignal::DocumentReady(win_id))) => {
                Some(ShellEvent::DocumentReady(win_id))
            }
            Event::UserEvent(UserEvent::Host(HostSignal::Ipc(ipc_event))) => {
                Some(ShellEvent::Ipc(ipc_event))
            }
            Event::UserEvent(UserEvent::Menu(selection)) => Some(ShellEvent::Menu(selection)),

            _ => None,
        };

        if let Some(shell_event) = shell_event {
            let mut platform = window_manager.platform(event_loop_target);
            if shell.handle_event(shell_event, &mut platform) == Flow::Exit {
                *control = ControlFlow::Exit;
            }
        }
    });
}

/// Forward muda menu clicks to the event loop until either side goes away.
fn forward_menu_events(menu_id_map: MenuIdMap, proxy: EventLoopProxy<UserEvent>) {
    let receiver = muda::MenuEvent::receiver();
    loop {
        let event = match receiver.recv() {
            Ok(event) => event,
            Err(crossbeam_channel::RecvError) => {
                tracing::debug!("Menu event channel disconnected");
                break;
            }
        };

        let selection = match menu_id_map.lock() {
            Ok(map) => map.get(&event.id).copied(),
            Err(_) => {
                tracing::error!("Menu id map poisoned, stopping menu forwarding");
                break;
            }
        };

        match selection {
            Some(selection) => {
                tracing::debug!("Menu event: {:?}", selection);
                if proxy.send_event(UserEvent::Menu(selection)).is_err() {
                    tracing::debug!("Event loop closed, stopping menu forwarding");
                    break;
                }
            }
            None => tracing::warn!("Menu event for unknown MenuId: {:?}", event.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(
            args(&[]).unwrap(),
            Args {
                app_dir: None,
                dev_mode: false,
                version: false,
            }
        );
    }

    #[test]
    fn test_parse_all_flags() {
        let parsed = args(&["--app-dir", "/opt/blaster", "--dev", "--version"]).unwrap();
        assert_eq!(parsed.app_dir, Some(PathBuf::from("/opt/blaster")));
        assert!(parsed.dev_mode);
        assert!(parsed.version);
    }

    #[test]
    fn test_parse_errors() {
        let err = args(&["--app-dir"]).unwrap_err();
        assert!(err.to_string().contains("--app-dir requires a path"));

        let err = args(&["--bogus"]).unwrap_err();
        assert!(err.to_string().contains("Unknown argument: --bogus"));
    }

    #[test]
    fn test_parse_ignores_finder_serial() {
        let parsed = args(&["-psn_0_12345"]).unwrap();
        assert!(!parsed.dev_mode);
    }

    #[test]
    fn test_host_signal_into_user_event() {
        let event = UserEvent::from(HostSignal::DocumentReady(blaster_ipc::WindowId(1)));
        assert!(matches!(
            event,
            UserEvent::Host(HostSignal::DocumentReady(blaster_ipc::WindowId(1)))
        ));
    }
}
