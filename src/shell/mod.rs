//! Capabilities the bridge needs from the desktop toolkit.
//!
//! The tray builder and lifecycle controller only talk to these traits. A
//! toolkit binding implements them; [`HeadlessShell`] is the in-process
//! implementation used when no toolkit is attached and in tests.

mod events;
mod headless;

pub use events::{BridgeEvent, EventBus};
pub use headless::{HeadlessShell, HeadlessWindow, Shutdown, WindowSnapshot};

use crate::tray::{ClickHandler, Menu};
use std::sync::Arc;

/// Name of the primary application window.
pub const MAIN_WINDOW: &str = "Main";

/// Sends application-wide events to the UI.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, name: &str, payload: serde_json::Value);
}

pub trait Window: Send + Sync {
    fn minimise(&self);
    fn unminimise(&self);
    fn show(&self);
    fn set_title(&self, title: &str);
}

pub trait WindowManager: Send + Sync {
    fn get_window_by_name(&self, name: &str) -> Option<Arc<dyn Window>>;
}

/// The OS tray icon. `set_menu` replaces the whole menu in one step.
pub trait TraySurface: Send + Sync {
    fn set_icon(&self, icon: &[u8]);
    fn set_dark_icon(&self, icon: &[u8]);
    fn set_label(&self, label: &str);
    fn set_menu(&self, menu: Menu);
    /// Handler for clicks on the icon itself, replacing any earlier one.
    fn on_click(&self, handler: ClickHandler);
}

pub trait AppControl: Send + Sync {
    /// Ask the application to terminate.
    fn quit(&self);
}
