mod menu;

pub use menu::{build_menu, ClickHandler, Menu, MenuEntry, TRAY_MENU_CLICK_EVENT};

use crate::env::Environment;
use crate::errors::BridgeResult;
use crate::models::{MenuItem, TrayContent};
use crate::shell::{EventEmitter, TraySurface, WindowManager, MAIN_WINDOW};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Where the frontend build ships its tray icons.
const ICON_SOURCE_DIR: &str = "frontend/dist/icons";
/// Where tray icons are cached for `UpdateTray` to load by path.
pub const ICON_CACHE_DIR: &str = "data/.cache/icons";

pub const TRAY_ICONS: [&str; 6] = [
    "tray_normal_light.png",
    "tray_normal_dark.png",
    "tray_proxy_light.png",
    "tray_proxy_dark.png",
    "tray_tun_light.png",
    "tray_tun_dark.png",
];

const DEFAULT_ICON: &str = TRAY_ICONS[0];

/// Owner of the tray icon. All menu rebuilds go through here.
pub struct Tray {
    env: Arc<Environment>,
    surface: Arc<dyn TraySurface>,
    events: Arc<dyn EventEmitter>,
    windows: Arc<dyn WindowManager>,
    rebuild: Mutex<()>,
}

impl Tray {
    pub fn new(
        env: Arc<Environment>,
        surface: Arc<dyn TraySurface>,
        events: Arc<dyn EventEmitter>,
        windows: Arc<dyn WindowManager>,
    ) -> Self {
        Self {
            env,
            surface,
            events,
            windows,
            rebuild: Mutex::new(()),
        }
    }

    /// Cache the bundled tray icons, install the default one and restore
    /// the main window on icon clicks. Icon problems are logged, never fatal.
    pub fn init(&self) {
        if let Err(e) = self.install_icons() {
            warn!("Cannot cache tray icons: {}", e);
        }
        let path = self.env.get_path(ICON_CACHE_DIR).join(DEFAULT_ICON);
        match std::fs::read(&path) {
            Ok(icon) => {
                self.surface.set_dark_icon(&icon);
                self.surface.set_icon(&icon);
            }
            Err(e) => warn!("Default tray icon unavailable ({}): {}", path.display(), e),
        }

        let windows = Arc::clone(&self.windows);
        self.surface
            .on_click(Arc::new(move || restore_main_window(windows.as_ref())));
        info!("System tray initialized");
    }

    /// Copy bundled icons into the cache directory, skipping ones already there.
    pub fn install_icons(&self) -> BridgeResult<usize> {
        let src = self.env.get_path(ICON_SOURCE_DIR);
        let dst = self.env.get_path(ICON_CACHE_DIR);
        std::fs::create_dir_all(&dst)?;

        let mut copied = 0;
        for icon in TRAY_ICONS {
            let target = dst.join(icon);
            if target.exists() {
                continue;
            }
            let source = src.join(icon);
            if !source.exists() {
                warn!("Bundled tray icon missing: {}", source.display());
                continue;
            }
            info!("Caching tray icon {}", icon);
            std::fs::copy(&source, &target)?;
            copied += 1;
        }
        Ok(copied)
    }

    /// Restore the main window when the tray icon itself is clicked.
    pub fn on_icon_click(&self) {
        restore_main_window(self.windows.as_ref());
    }

    pub fn update_tray(&self, tray: &TrayContent) {
        if !tray.icon.is_empty() {
            let path = self.env.get_path(&tray.icon);
            match std::fs::read(&path) {
                Ok(icon) => {
                    self.surface.set_icon(&icon);
                    self.surface.set_dark_icon(&icon);
                }
                Err(e) => warn!("Cannot load tray icon {}: {}", path.display(), e),
            }
        }
        if !tray.title.is_empty() {
            self.surface.set_label(&tray.title);
            if let Some(window) = self.windows.get_window_by_name(MAIN_WINDOW) {
                window.set_title(&tray.title);
            }
        }
    }

    /// Discard the current tray menu and build a new one from `menus`.
    pub fn update_tray_menus(&self, menus: &[MenuItem]) {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        info!("UpdateTrayMenus");
        let menu = build_menu(menus, &self.events);
        self.surface.set_menu(menu);
    }
}

fn restore_main_window(windows: &dyn WindowManager) {
    if let Some(window) = windows.get_window_by_name(MAIN_WINDOW) {
        window.unminimise();
        window.show();
    }
}
