use crate::env::Environment;
use crate::errors::BridgeResult;
use crate::models::{BridgeResponse, IoMode, IoOptions};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::sync::Arc;
use tracing::debug;

/// Filesystem access on behalf of the UI. Relative paths are resolved
/// against the executable directory.
#[derive(Clone)]
pub struct FileStore {
    env: Arc<Environment>,
}

impl FileStore {
    pub fn new(env: Arc<Environment>) -> Self {
        Self { env }
    }

    /// Write `content` to `path`, creating missing parent directories.
    pub fn write_file(&self, path: &str, content: &str, options: &IoOptions) -> BridgeResponse {
        self.try_write(path, content, options).into()
    }

    /// Read `path` as text, or as base64 in binary mode.
    pub fn read_file(&self, path: &str, options: &IoOptions) -> BridgeResponse {
        self.try_read(path, options).into()
    }

    fn try_write(&self, path: &str, content: &str, options: &IoOptions) -> BridgeResult<String> {
        let full_path = self.env.get_path(path);
        debug!("Writing {} ({:?})", full_path.display(), options.mode);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match options.mode {
            IoMode::Text => std::fs::write(&full_path, content)?,
            IoMode::Binary => {
                let bytes = BASE64_STANDARD.decode(content)?;
                std::fs::write(&full_path, bytes)?;
            }
        }

        Ok("Success".to_string())
    }

    fn try_read(&self, path: &str, options: &IoOptions) -> BridgeResult<String> {
        let full_path = self.env.get_path(path);
        debug!("Reading {} ({:?})", full_path.display(), options.mode);

        match options.mode {
            IoMode::Text => Ok(std::fs::read_to_string(&full_path)?),
            IoMode::Binary => {
                let bytes = std::fs::read(&full_path)?;
                Ok(BASE64_STANDARD.encode(bytes))
            }
        }
    }
}
