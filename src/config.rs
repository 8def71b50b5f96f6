use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::LaunchError;

pub const ENGINE_ENV: &str = "LINTEL_ENGINE";
pub const INIT_ENV: &str = "LINTEL_INIT";
pub const MESSAGES_ENV: &str = "LINTEL_MESSAGES_DIR";

const ENGINE_NAME: &str = "lintel-engine";

/// Where the launcher finds its collaborators. Read-only; nothing here is
/// ever persisted.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub install_dir: PathBuf,
    pub engine: PathBuf,
    pub initializer: PathBuf,
}

impl LauncherConfig {
    /// Resolves against the running executable and the process environment.
    ///
    /// # Errors
    /// Returns an error if the executable's own location cannot be determined.
    pub fn resolve() -> Result<Self> {
        let install_dir = install_dir()?;
        Ok(Self::from_parts(
            install_dir,
            env_path(ENGINE_ENV),
            env_path(INIT_ENV),
        ))
    }

    pub fn from_parts(
        install_dir: PathBuf,
        engine: Option<PathBuf>,
        initializer: Option<PathBuf>,
    ) -> Self {
        let engine = engine.unwrap_or_else(|| {
            let sibling = install_dir.join(format!("{ENGINE_NAME}{}", env::consts::EXE_SUFFIX));
            if sibling.is_file() {
                sibling
            } else {
                PathBuf::from(ENGINE_NAME)
            }
        });
        let initializer = initializer.unwrap_or_else(|| engine.clone());
        let cfg = LauncherConfig {
            install_dir,
            engine,
            initializer,
        };
        tracing::debug!(target: "lintel::config", ?cfg, "resolved launcher config");
        cfg
    }
}

/// Directory containing the running launcher executable.
///
/// # Errors
/// Returns an error if the platform cannot report the executable path.
pub fn install_dir() -> Result<PathBuf> {
    let exe = env::current_exe().map_err(LaunchError::InstallLocation)?;
    Ok(exe
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}

/// Template directory: `$LINTEL_MESSAGES_DIR`, then `messages/` beside the
/// executable, then `../share/lintel/messages`. The first existing one
/// wins; with none present the first candidate is returned so the miss is
/// reported against a real path.
pub fn messages_dir(install_dir: &Path) -> PathBuf {
    let mut candidates = Vec::with_capacity(3);
    if let Some(dir) = env_path(MESSAGES_ENV) {
        candidates.push(dir);
    }
    candidates.push(install_dir.join("messages"));
    candidates.push(install_dir.join("../share/lintel/messages"));
    first_existing_dir(candidates)
}

fn first_existing_dir(candidates: Vec<PathBuf>) -> PathBuf {
    candidates
        .iter()
        .find(|p| p.is_dir())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("messages"))
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
