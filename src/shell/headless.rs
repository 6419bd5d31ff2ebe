use super::{AppControl, TraySurface, Window, WindowManager};
use crate::config::{AppConfig, WindowState};
use crate::tray::{ClickHandler, Menu};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub state: WindowState,
    pub visible: bool,
}

pub struct HeadlessWindow {
    name: String,
    snapshot: Mutex<WindowSnapshot>,
}

impl HeadlessWindow {
    pub fn snapshot(&self) -> WindowSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut WindowSnapshot)) {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut snapshot);
        debug!("Window {} -> {:?}", self.name, *snapshot);
    }
}

impl Window for HeadlessWindow {
    fn minimise(&self) {
        self.update(|w| w.state = WindowState::Minimised);
    }

    fn unminimise(&self) {
        self.update(|w| {
            if w.state == WindowState::Minimised {
                w.state = WindowState::Normal;
            }
        });
    }

    fn show(&self) {
        self.update(|w| w.visible = true);
    }

    fn set_title(&self, title: &str) {
        self.update(|w| w.title = title.to_string());
    }
}

#[derive(Default)]
struct TrayState {
    icon: Vec<u8>,
    dark_icon: Vec<u8>,
    label: String,
    menu: Option<Arc<Menu>>,
    on_click: Option<ClickHandler>,
}

/// Window and tray host that keeps everything in memory.
#[derive(Default)]
pub struct HeadlessShell {
    windows: Mutex<HashMap<String, Arc<HeadlessWindow>>>,
    tray: Mutex<TrayState>,
}

impl HeadlessShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a window sized and placed according to `config`.
    pub fn open_window(&self, name: &str, config: &AppConfig) -> Arc<HeadlessWindow> {
        let window = Arc::new(HeadlessWindow {
            name: name.to_string(),
            snapshot: Mutex::new(WindowSnapshot {
                title: String::new(),
                width: config.width,
                height: config.height,
                state: config.window_start_state,
                visible: !config.hidden,
            }),
        });
        info!(
            "Opened window {} ({}x{}, {:?}, hidden: {})",
            name, config.width, config.height, config.window_start_state, config.hidden
        );
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::clone(&window));
        window
    }

    pub fn label(&self) -> String {
        self.tray_state().label.clone()
    }

    pub fn icon(&self) -> Vec<u8> {
        self.tray_state().icon.clone()
    }

    pub fn dark_icon(&self) -> Vec<u8> {
        self.tray_state().dark_icon.clone()
    }

    /// The menu currently installed on the tray.
    pub fn menu(&self) -> Option<Arc<Menu>> {
        self.tray_state().menu.clone()
    }

    /// Activate the menu entry with `id`, as if the user clicked it.
    /// Returns false when no clickable entry has that id.
    pub fn click(&self, id: &str) -> bool {
        // Clone out of the lock so click handlers may touch the tray.
        let Some(menu) = self.menu() else {
            return false;
        };
        match menu.find(id) {
            Some(entry) => entry.activate(),
            None => false,
        }
    }

    /// Click the tray icon. Returns false when no handler is registered.
    pub fn click_icon(&self) -> bool {
        let Some(handler) = self.tray_state().on_click.clone() else {
            return false;
        };
        handler();
        true
    }

    fn tray_state(&self) -> std::sync::MutexGuard<'_, TrayState> {
        self.tray.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WindowManager for HeadlessShell {
    fn get_window_by_name(&self, name: &str) -> Option<Arc<dyn Window>> {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|w| Arc::clone(w) as Arc<dyn Window>)
    }
}

impl TraySurface for HeadlessShell {
    fn set_icon(&self, icon: &[u8]) {
        self.tray_state().icon = icon.to_vec();
    }

    fn set_dark_icon(&self, icon: &[u8]) {
        self.tray_state().dark_icon = icon.to_vec();
    }

    fn set_label(&self, label: &str) {
        self.tray_state().label = label.to_string();
    }

    fn set_menu(&self, menu: Menu) {
        debug!("Installing tray menu with {} entries", menu.entries.len());
        self.tray_state().menu = Some(Arc::new(menu));
    }

    fn on_click(&self, handler: ClickHandler) {
        self.tray_state().on_click = Some(handler);
    }
}

/// Quit signal awaited by the host server.
#[derive(Default)]
pub struct Shutdown {
    requested: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolves once [`AppControl::quit`] has been called. Any number of
    /// tasks may wait at the same time.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

impl AppControl for Shutdown {
    fn quit(&self) {
        info!("Quit requested");
        self.requested.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackgroundType, WindowState};

    fn config(state: WindowState, hidden: bool) -> AppConfig {
        AppConfig {
            width: 800,
            height: 540,
            background_type: BackgroundType::Solid,
            window_start_state: state,
            hidden,
            rolling_release: false,
            server_host: "127.0.0.1".into(),
            server_port: 0,
        }
    }

    #[test]
    fn open_window_applies_config() {
        let shell = HeadlessShell::new();
        let window = shell.open_window("Main", &config(WindowState::Minimised, true));
        let snapshot = window.snapshot();
        assert_eq!(snapshot.state, WindowState::Minimised);
        assert!(!snapshot.visible);
        assert_eq!((snapshot.width, snapshot.height), (800, 540));
    }

    #[test]
    fn lookup_by_name_returns_registered_window() {
        let shell = HeadlessShell::new();
        let window = shell.open_window("Main", &config(WindowState::Minimised, true));

        let handle = shell.get_window_by_name("Main").unwrap();
        handle.unminimise();
        handle.show();
        handle.set_title("GUI.for.Cores");

        let snapshot = window.snapshot();
        assert_eq!(snapshot.state, WindowState::Normal);
        assert!(snapshot.visible);
        assert_eq!(snapshot.title, "GUI.for.Cores");
        assert!(shell.get_window_by_name("Other").is_none());
    }

    #[test]
    fn click_without_menu_does_nothing() {
        let shell = HeadlessShell::new();
        assert!(!shell.click("anything"));
    }

    #[tokio::test]
    async fn shutdown_wait_returns_after_quit() {
        let shutdown = Arc::new(Shutdown::new());
        let waiter = {
            let shutdown = Arc::clone(&shutdown);
            tokio::spawn(async move { shutdown.wait().await })
        };
        shutdown.quit();
        waiter.await.unwrap();
        assert!(shutdown.is_requested());
    }

    #[test]
    fn click_icon_runs_registered_handler() {
        let shell = HeadlessShell::new();
        assert!(!shell.click_icon());

        let clicks = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        shell.on_click(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(shell.click_icon());
        assert!(shell.click_icon());
        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn shutdown_wakes_every_waiter() {
        let shutdown = Arc::new(Shutdown::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let shutdown = Arc::clone(&shutdown);
                tokio::spawn(async move { shutdown.wait().await })
            })
            .collect();
        tokio::task::yield_now().await;

        shutdown.quit();
        for waiter in waiters {
            tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
                .await
                .unwrap()
                .unwrap();
        }
    }

    #[tokio::test]
    async fn shutdown_wait_after_quit_is_immediate() {
        let shutdown = Shutdown::new();
        shutdown.quit();
        shutdown.wait().await;
    }
}
