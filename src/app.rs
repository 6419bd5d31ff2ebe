//! The bridge object the UI calls into.
//!
//! Every host capability exposed to the UI is a method here; the HTTP
//! middleware reaches the file operations through the same value.

use crate::config::AppConfig;
use crate::env::{EnvSnapshot, Environment};
use crate::lifecycle::Lifecycle;
use crate::models::{BridgeResponse, IoOptions, MenuItem, TrayContent};
use crate::storage::FileStore;
use crate::tray::Tray;
use std::sync::Arc;

pub struct App {
    pub env: Arc<Environment>,
    pub config: Arc<AppConfig>,
    pub files: FileStore,
    pub lifecycle: Lifecycle,
    pub tray: Tray,
}

impl App {
    pub fn new(env: Arc<Environment>, config: Arc<AppConfig>, lifecycle: Lifecycle, tray: Tray) -> Self {
        Self {
            files: FileStore::new(Arc::clone(&env)),
            env,
            config,
            lifecycle,
            tray,
        }
    }

    pub fn get_env(&self) -> EnvSnapshot {
        self.env.snapshot()
    }

    pub fn exit_app(&self) {
        self.lifecycle.exit();
    }

    pub fn restart_app(&self) -> BridgeResponse {
        self.lifecycle.restart()
    }

    pub fn is_startup(&self) -> bool {
        self.lifecycle.is_startup()
    }

    pub fn get_interfaces(&self) -> BridgeResponse {
        self.lifecycle.get_interfaces()
    }

    pub fn write_file(&self, path: &str, content: &str, options: &IoOptions) -> BridgeResponse {
        self.files.write_file(path, content, options)
    }

    pub fn read_file(&self, path: &str, options: &IoOptions) -> BridgeResponse {
        self.files.read_file(path, options)
    }

    pub fn update_tray(&self, tray: &TrayContent) {
        self.tray.update_tray(tray);
    }

    pub fn update_tray_menus(&self, menus: &[MenuItem]) {
        self.tray.update_tray_menus(menus);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::app_in;
    use crate::config::ProfileDocument;
    use crate::models::IoOptions;

    #[test]
    fn bridge_calls_share_one_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), ProfileDocument::default());

        assert!(app.write_file("data/x.txt", "1", &IoOptions::default()).success);
        assert_eq!(
            app.read_file("data/x.txt", &IoOptions::default()).data.as_deref(),
            Some("1")
        );
        assert_eq!(app.get_env().app_name, "GUI");
    }

    #[test]
    fn first_is_startup_call_wins() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), ProfileDocument::default());
        assert!(app.is_startup());
        assert!(!app.is_startup());
    }
}
