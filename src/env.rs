//! Facts about the running process, resolved once at startup.
//!
//! The resulting [`Environment`] is wrapped in an `Arc` by `main` and never
//! mutated afterwards; every other component reads from it.

use crate::errors::{BridgeError, BridgeResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Argument passed by the OS task scheduler entry that launches the app.
pub const TASK_SCHEDULER_ARG: &str = "tasksch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Directory containing the executable.
    pub base_path: PathBuf,
    /// File name of the executable.
    pub app_name: String,
    pub os: String,
    pub arch: String,
    /// x86-64 micro-architecture level (1-4), 0 on other architectures.
    pub x64_level: u8,
    pub from_task_sch: bool,
}

/// The view of [`Environment`] handed to the UI by `GetEnv`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvSnapshot {
    pub app_name: String,
    pub base_path: String,
    pub os: String,
    pub arch: String,
    pub x64_level: u8,
}

impl Environment {
    /// Resolve the environment of the current process.
    ///
    /// An error here means the executable cannot locate itself, which the
    /// caller must treat as fatal.
    pub fn resolve() -> BridgeResult<Self> {
        let exe_path = std::env::current_exe().map_err(|e| {
            BridgeError::Environment(format!("Cannot resolve executable path: {}", e))
        })?;
        Self::from_parts(&exe_path, std::env::args())
    }

    /// Build the environment from an executable path and an argument list.
    pub fn from_parts<I, S>(exe_path: &Path, args: I) -> BridgeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base_path = exe_path
            .parent()
            .ok_or_else(|| {
                BridgeError::Environment(format!(
                    "Executable path has no parent directory: {}",
                    exe_path.display()
                ))
            })?
            .to_path_buf();
        let app_name = exe_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BridgeError::Environment(format!(
                    "Executable path has no file name: {}",
                    exe_path.display()
                ))
            })?;

        let from_task_sch = args.into_iter().any(|arg| arg.as_ref() == TASK_SCHEDULER_ARG);

        Ok(Self {
            base_path,
            app_name,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            x64_level: detect_x64_level(),
            from_task_sch,
        })
    }

    /// Resolve `path` against the executable directory. Absolute paths are
    /// returned unchanged.
    pub fn get_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Full path of the running executable.
    pub fn exe_path(&self) -> PathBuf {
        self.base_path.join(&self.app_name)
    }

    pub fn is_linux(&self) -> bool {
        self.os == "linux"
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn snapshot(&self) -> EnvSnapshot {
        EnvSnapshot {
            app_name: self.app_name.clone(),
            base_path: self.base_path.to_string_lossy().into_owned(),
            os: self.os.clone(),
            arch: self.arch.clone(),
            x64_level: self.x64_level,
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn detect_x64_level() -> u8 {
    let v2 = is_x86_feature_detected!("cmpxchg16b")
        && is_x86_feature_detected!("popcnt")
        && is_x86_feature_detected!("sse3")
        && is_x86_feature_detected!("sse4.1")
        && is_x86_feature_detected!("sse4.2")
        && is_x86_feature_detected!("ssse3");
    if !v2 {
        return 1;
    }

    let v3 = is_x86_feature_detected!("avx")
        && is_x86_feature_detected!("avx2")
        && is_x86_feature_detected!("bmi1")
        && is_x86_feature_detected!("bmi2")
        && is_x86_feature_detected!("f16c")
        && is_x86_feature_detected!("fma")
        && is_x86_feature_detected!("lzcnt")
        && is_x86_feature_detected!("xsave");
    if !v3 {
        return 2;
    }

    let v4 = is_x86_feature_detected!("avx512f")
        && is_x86_feature_detected!("avx512bw")
        && is_x86_feature_detected!("avx512cd")
        && is_x86_feature_detected!("avx512dq")
        && is_x86_feature_detected!("avx512vl");
    if v4 {
        4
    } else {
        3
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn detect_x64_level() -> u8 {
    0
}
