//! Dialog Gateway: fixed dialog presets and cancellation-aware wrappers.

use crate::manifest::AboutInfo;
use crate::platform::Platform;
use crate::{FileDialogOpts, FileFilter, MessageDialogOpts, MessageKind};
use std::path::PathBuf;

/// Default file name offered by the export dialog
pub const EXPORT_DEFAULT_NAME: &str = "cleaned_media_file";

/// Filters offered when opening a media file
pub fn media_open_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::new(
            "Media Files",
            &["mp4", "avi", "mov", "mp3", "wav", "flv", "mkv", "m4a", "aac"],
        ),
        FileFilter::new("Video Files", &["mp4", "avi", "mov", "flv", "mkv"]),
        FileFilter::new("Audio Files", &["mp3", "wav", "m4a", "aac"]),
        FileFilter::new("All Files", &["*"]),
    ]
}

/// Filters offered when exporting the cleaned file
pub fn media_save_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::new("Media Files", &["mp4", "mp3", "wav"]),
        FileFilter::new("All Files", &["*"]),
    ]
}

pub fn open_media_opts() -> FileDialogOpts {
    FileDialogOpts {
        title: Some("Select Media File".to_string()),
        default_name: None,
        filters: media_open_filters(),
    }
}

pub fn export_opts() -> FileDialogOpts {
    FileDialogOpts {
        title: Some("Save Cleaned File".to_string()),
        default_name: Some(EXPORT_DEFAULT_NAME.to_string()),
        filters: media_save_filters(),
    }
}

pub fn about_opts(about: &AboutInfo) -> MessageDialogOpts {
    MessageDialogOpts {
        title: format!("About {}", about.name),
        message: about.version_line(),
        detail: Some(about.description.clone()),
        kind: MessageKind::Info,
        buttons: vec!["OK".to_string()],
    }
}

/// Show an open dialog. `None` when the user cancels.
pub fn show_open_dialog<P: Platform>(platform: &mut P, opts: &FileDialogOpts) -> Option<PathBuf> {
    let picked = platform.pick_file(opts);
    if picked.is_none() {
        tracing::debug!("Open dialog cancelled");
    }
    picked
}

/// Show a save dialog. `None` when the user cancels.
pub fn show_save_dialog<P: Platform>(platform: &mut P, opts: &FileDialogOpts) -> Option<PathBuf> {
    let picked = platform.save_file(opts);
    if picked.is_none() {
        tracing::debug!("Save dialog cancelled");
    }
    picked
}

/// Show a blocking message box.
pub fn show_message_dialog<P: Platform>(platform: &mut P, opts: &MessageDialogOpts) {
    platform.show_message(opts);
}
