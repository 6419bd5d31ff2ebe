//! Turning the UI's menu description into a live tray menu.

use crate::models::{MenuItem, MenuItemKind};
use crate::shell::EventEmitter;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Event emitted with the item id when a tray entry is clicked.
pub const TRAY_MENU_CLICK_EVENT: &str = "onTrayMenuClick";

pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

/// A built tray menu, handed to [`TraySurface::set_menu`](crate::shell::TraySurface::set_menu).
#[derive(Debug, Default)]
pub struct Menu {
    pub entries: Vec<MenuEntry>,
}

pub enum MenuEntry {
    Submenu {
        label: String,
        entries: Vec<MenuEntry>,
    },
    Item {
        id: String,
        label: String,
        tooltip: String,
        checked: bool,
        on_click: ClickHandler,
    },
    Radio {
        id: String,
        label: String,
        tooltip: String,
        checked: bool,
        on_click: ClickHandler,
    },
    Separator,
}

impl MenuEntry {
    /// Run the click handler. Returns false for entries that are not clickable.
    pub fn activate(&self) -> bool {
        match self {
            MenuEntry::Item { on_click, .. } | MenuEntry::Radio { on_click, .. } => {
                on_click();
                true
            }
            MenuEntry::Submenu { .. } | MenuEntry::Separator => false,
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            MenuEntry::Item { id, .. } | MenuEntry::Radio { id, .. } => Some(id.as_str()),
            MenuEntry::Submenu { .. } | MenuEntry::Separator => None,
        }
    }
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuEntry::Submenu { label, entries } => f
                .debug_struct("Submenu")
                .field("label", label)
                .field("entries", entries)
                .finish(),
            MenuEntry::Item {
                id, label, checked, ..
            } => f
                .debug_struct("Item")
                .field("id", id)
                .field("label", label)
                .field("checked", checked)
                .finish_non_exhaustive(),
            MenuEntry::Radio {
                id, label, checked, ..
            } => f
                .debug_struct("Radio")
                .field("id", id)
                .field("label", label)
                .field("checked", checked)
                .finish_non_exhaustive(),
            MenuEntry::Separator => f.write_str("Separator"),
        }
    }
}

impl Menu {
    /// Depth-first search for a clickable entry by id.
    pub fn find(&self, id: &str) -> Option<&MenuEntry> {
        find_in(&self.entries, id)
    }
}

fn find_in<'a>(entries: &'a [MenuEntry], id: &str) -> Option<&'a MenuEntry> {
    entries.iter().find_map(|entry| match entry {
        MenuEntry::Submenu { entries, .. } => find_in(entries, id),
        _ if entry.id() == Some(id) => Some(entry),
        _ => None,
    })
}

/// How a visible description item is rendered.
enum MenuNode<'a> {
    Submenu {
        text: &'a str,
        children: &'a [MenuItem],
    },
    Leaf(&'a MenuItem),
}

fn classify(item: &MenuItem) -> Option<MenuNode<'_>> {
    if item.hidden {
        None
    } else if item.children.is_empty() {
        Some(MenuNode::Leaf(item))
    } else {
        Some(MenuNode::Submenu {
            text: &item.text,
            children: &item.children,
        })
    }
}

/// Build a fresh menu from `items`. Clicks emit [`TRAY_MENU_CLICK_EVENT`]
/// through `events`.
pub fn build_menu(items: &[MenuItem], events: &Arc<dyn EventEmitter>) -> Menu {
    let mut entries = Vec::new();
    append_items(items, events, &mut entries);
    Menu { entries }
}

fn append_items(items: &[MenuItem], events: &Arc<dyn EventEmitter>, parent: &mut Vec<MenuEntry>) {
    for item in items {
        match classify(item) {
            None => {}
            Some(MenuNode::Submenu { text, children }) => {
                let mut entries = Vec::new();
                append_items(children, events, &mut entries);
                parent.push(MenuEntry::Submenu {
                    label: text.to_string(),
                    entries,
                });
            }
            Some(MenuNode::Leaf(item)) => {
                if let Some(entry) = leaf(item, events) {
                    parent.push(entry);
                }
            }
        }
    }
}

fn leaf(item: &MenuItem, events: &Arc<dyn EventEmitter>) -> Option<MenuEntry> {
    match item.kind {
        MenuItemKind::Item => Some(MenuEntry::Item {
            id: item.id.clone(),
            label: item.text.clone(),
            tooltip: item.tooltip.clone(),
            checked: item.checked,
            on_click: click_handler(&item.id, events),
        }),
        MenuItemKind::Radio => Some(MenuEntry::Radio {
            id: item.id.clone(),
            label: item.text.clone(),
            tooltip: item.tooltip.clone(),
            checked: item.checked,
            on_click: click_handler(&item.id, events),
        }),
        MenuItemKind::Separator => Some(MenuEntry::Separator),
        MenuItemKind::Unknown => None,
    }
}

fn click_handler(id: &str, events: &Arc<dyn EventEmitter>) -> ClickHandler {
    let id = id.to_string();
    let events = Arc::clone(events);
    Arc::new(move || {
        debug!("Tray menu {} clicked", id);
        events.emit(TRAY_MENU_CLICK_EVENT, serde_json::Value::String(id.clone()));
    })
}
