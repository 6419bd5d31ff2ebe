use crate::env::Environment;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Location of the user profile, relative to the executable directory.
pub const USER_PROFILE: &str = "data/user.toml";

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT_LINUX: u32 = 510;
const DEFAULT_HEIGHT: u32 = 540;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Translucent,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimised,
    Hidden,
}

/// The profile as persisted. Every field is optional; anything left out is
/// filled in by [`AppConfig::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDocument {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background_type: Option<BackgroundType>,
    pub window_start_state: Option<WindowState>,
    pub rolling_release: Option<bool>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
}

/// Resolved configuration, read-only once startup completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub background_type: BackgroundType,
    pub window_start_state: WindowState,
    /// Start with the main window hidden. Derived, never loaded.
    pub hidden: bool,
    pub rolling_release: bool,
    pub server_host: String,
    pub server_port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8765
}

impl AppConfig {
    /// Load the user profile next to the executable and apply defaults.
    ///
    /// A missing or malformed profile counts as an empty one.
    pub fn load(env: &Environment) -> Self {
        let profile_path = env.get_path(USER_PROFILE);
        let document = match Self::read_profile(&profile_path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("No user profile at {}", profile_path.display());
                ProfileDocument::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable user profile {}: {}", profile_path.display(), e);
                ProfileDocument::default()
            }
        };
        Self::resolve(document, env)
    }

    fn read_profile(path: &Path) -> Result<Option<ProfileDocument>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let document: ProfileDocument = toml::from_str(&content)?;
        Ok(Some(document))
    }

    /// Fill unset fields with platform and launch dependent defaults.
    pub fn resolve(document: ProfileDocument, env: &Environment) -> Self {
        let width = document.width.filter(|w| *w > 0).unwrap_or(DEFAULT_WIDTH);
        let height = document.height.filter(|h| *h > 0).unwrap_or(if env.is_linux() {
            DEFAULT_HEIGHT_LINUX
        } else {
            DEFAULT_HEIGHT
        });
        let background_type = document.background_type.unwrap_or(if env.is_windows() {
            BackgroundType::Translucent
        } else {
            BackgroundType::Solid
        });

        let loaded_state = document.window_start_state.unwrap_or_default();

        // Derived from the loaded state before the interactive reset below.
        let hidden = env.from_task_sch && loaded_state == WindowState::Minimised;

        let window_start_state = if env.from_task_sch {
            loaded_state
        } else {
            WindowState::Normal
        };

        Self {
            width,
            height,
            background_type,
            window_start_state,
            hidden,
            rolling_release: document.rolling_release.unwrap_or(false),
            server_host: document.server_host.unwrap_or_else(default_server_host),
            server_port: document.server_port.unwrap_or_else(default_server_port),
        }
    }
}
