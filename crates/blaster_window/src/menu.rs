//! Translate a [`MenuTemplate`] into muda menus.

use blaster_shell::{
    MenuEntry, MenuGroup, MenuItemId, MenuSelection, MenuTemplate, Role, ShellError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared between the event loop and the muda receiver thread
pub type MenuIdMap = Arc<Mutex<HashMap<muda::MenuId, MenuSelection>>>;

/// A built menu bar plus handles to its custom items
pub(crate) struct BuiltMenu {
    pub menu: muda::Menu,
    pub items: HashMap<MenuItemId, muda::MenuItem>,
    /// Submenu holding the window roles, registered as the NSApp windows menu
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub window_menu: Option<muda::Submenu>,
}

/// Build the native menu and record which muda id maps to which selection.
pub(crate) fn build_menu(
    template: &MenuTemplate,
    id_map: &mut HashMap<muda::MenuId, MenuSelection>,
) -> Result<BuiltMenu, ShellError> {
    let menu = muda::Menu::new();
    let mut items = HashMap::new();
    let mut window_menu = None;

    for group in &template.groups {
        let submenu = muda::Submenu::new(&group.label, true);
        for entry in &group.entries {
            append_entry(&submenu, entry, id_map, &mut items)?;
        }
        menu.append(&submenu).map_err(menu_err)?;
        if window_menu.is_none() && is_window_group(group) {
            window_menu = Some(submenu);
        }
    }

    Ok(BuiltMenu {
        menu,
        items,
        window_menu,
    })
}

/// The group carrying Minimize is where the OS lists open windows.
fn is_window_group(group: &MenuGroup) -> bool {
    group.entries.iter().any(|entry| {
        matches!(
            entry,
            MenuEntry::Role {
                role: Role::Minimize,
                ..
            }
        )
    })
}

fn parse_accelerator(accelerator: &str) -> Option<muda::accelerator::Accelerator> {
    match accelerator.parse() {
        Ok(accel) => Some(accel),
        Err(e) => {
            tracing::warn!("Ignoring invalid accelerator '{}': {}", accelerator, e);
            None
        }
    }
}

fn append_entry(
    submenu: &muda::Submenu,
    entry: &MenuEntry,
    id_map: &mut HashMap<muda::MenuId, MenuSelection>,
    items: &mut HashMap<MenuItemId, muda::MenuItem>,
) -> Result<(), ShellError> {
    match entry {
        MenuEntry::Separator => submenu
            .append(&muda::PredefinedMenuItem::separator())
            .map_err(menu_err),
        MenuEntry::Action {
            id,
            label,
            accelerator,
            enabled,
        } => {
            let item = muda::MenuItem::new(
                label,
                *enabled,
                accelerator.as_deref().and_then(parse_accelerator),
            );
            id_map.insert(item.id().clone(), MenuSelection::Action(*id));
            submenu.append(&item).map_err(menu_err)?;
            items.insert(*id, item);
            Ok(())
        }
        MenuEntry::Role { role, label } => {
            let text = label.as_deref().unwrap_or(role.label());
            if let Some(native) = predefined(*role, text) {
                return submenu.append(&native).map_err(menu_err);
            }
            let item = muda::MenuItem::new(
                text,
                true,
                role.accelerator().and_then(parse_accelerator),
            );
            id_map.insert(item.id().clone(), MenuSelection::Role(*role));
            submenu.append(&item).map_err(menu_err)
        }
    }
}

/// Roles the OS implements itself; `None` for roles the shell handles.
fn predefined(role: Role, text: &str) -> Option<muda::PredefinedMenuItem> {
    let text = Some(text);
    let item = match role {
        Role::Hide => muda::PredefinedMenuItem::hide(text),
        Role::HideOthers => muda::PredefinedMenuItem::hide_others(text),
        Role::Unhide => muda::PredefinedMenuItem::show_all(text),
        Role::Undo => muda::PredefinedMenuItem::undo(text),
        Role::Redo => muda::PredefinedMenuItem::redo(text),
        Role::Cut => muda::PredefinedMenuItem::cut(text),
        Role::Copy => muda::PredefinedMenuItem::copy(text),
        Role::Paste => muda::PredefinedMenuItem::paste(text),
        Role::SelectAll => muda::PredefinedMenuItem::select_all(text),
        Role::Minimize => muda::PredefinedMenuItem::minimize(text),
        Role::Close => muda::PredefinedMenuItem::close_window(text),
        Role::Front => muda::PredefinedMenuItem::bring_all_to_front(text),
        _ => return None,
    };
    debug_assert!(role.is_native());
    Some(item)
}

fn menu_err(e: muda::Error) -> ShellError {
    ShellError::menu_error(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_group_detection() {
        let template = MenuTemplate::application("Profanity Blaster", false);
        let window_groups: Vec<&str> = template
            .groups
            .iter()
            .filter(|g| is_window_group(g))
            .map(|g| g.label.as_str())
            .collect();
        assert_eq!(window_groups, vec!["Window"]);
    }

    #[test]
    fn test_parse_accelerator() {
        assert!(parse_accelerator("CmdOrCtrl+O").is_some());
        assert!(parse_accelerator("F11").is_some());
        assert!(parse_accelerator("CmdOrCtrl+Nope+Nope").is_none());
    }
}
