use crate::env::Environment;
use crate::errors::{BridgeError, BridgeResult};
use crate::models::BridgeResponse;
use crate::shell::AppControl;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Process-level operations exposed to the UI.
pub struct Lifecycle {
    env: Arc<Environment>,
    control: Arc<dyn AppControl>,
    startup: AtomicBool,
}

impl Lifecycle {
    pub fn new(env: Arc<Environment>, control: Arc<dyn AppControl>) -> Self {
        Self {
            env,
            control,
            startup: AtomicBool::new(true),
        }
    }

    pub fn exit(&self) {
        info!("ExitApp");
        self.control.quit();
    }

    /// Launch a fresh instance, then quit this one. If the launch fails the
    /// current process keeps running.
    pub fn restart(&self) -> BridgeResponse {
        match self.spawn_self() {
            Ok(()) => {
                self.control.quit();
                BridgeResponse::ok("Success")
            }
            Err(e) => {
                error!("Restart failed: {}", e);
                BridgeResponse::error(e.to_string())
            }
        }
    }

    fn spawn_self(&self) -> BridgeResult<()> {
        let exe_path = self.env.exe_path();
        info!("Restarting from {}", exe_path.display());

        let mut cmd = Command::new(&exe_path);
        hide_exec_window(&mut cmd);
        cmd.spawn().map_err(|e| {
            BridgeError::Process(format!("Failed to launch {}: {}", exe_path.display(), e))
        })?;
        Ok(())
    }

    /// True for the first caller in this process, false for everyone after.
    pub fn is_startup(&self) -> bool {
        self.startup.swap(false, Ordering::AcqRel)
    }

    /// Network interface names joined by `|`.
    pub fn get_interfaces(&self) -> BridgeResponse {
        info!("GetInterfaces");
        interface_names().map(|names| names.join("|")).into()
    }
}

fn interface_names() -> BridgeResult<Vec<String>> {
    let interfaces = if_addrs::get_if_addrs()
        .map_err(|e| BridgeError::Network(format!("Cannot enumerate interfaces: {}", e)))?;
    Ok(unique_names(interfaces.into_iter().map(|iface| iface.name)))
}

/// One entry per address comes back from the OS; keep each name once, in order.
fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}

#[cfg(windows)]
fn hide_exec_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x08000000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_exec_window(_cmd: &mut Command) {}
