//! Centralized path resolution for platform-appropriate user data directories.
//!
//! In development mode (cargo run), paths resolve to local directories.
//! In installed mode, paths resolve to platform-specific locations:
//! - Windows: `%APPDATA%\Sceneforge\`
//! - macOS: `~/Library/Application Support/Sceneforge/`
//! - Linux: `~/.config/sceneforge/` (config), `~/.local/share/sceneforge/` (data)

use std::path::{Path, PathBuf};

/// Returns true when running in development mode (cargo run).
///
/// Detection methods:
/// - `CARGO` env var is set (cargo run sets this)
/// - Debug assertions enabled (debug builds)
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

/// Platform-appropriate config directory.
///
/// - Dev mode: current directory
/// - Linux: `~/.config/sceneforge/`
/// - Windows/macOS: same as data_dir
pub fn config_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|p| p.join("sceneforge"))
    }

    #[cfg(not(target_os = "linux"))]
    {
        data_dir()
    }
}

/// Platform-appropriate data directory.
///
/// - Dev mode: current directory
/// - Windows: `%APPDATA%\Sceneforge\`
/// - macOS: `~/Library/Application Support/Sceneforge/`
/// - Linux: `~/.local/share/sceneforge/`
pub fn data_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    dirs::data_dir().map(|p| p.join("sceneforge"))
}

/// Path to the config file.
///
/// - Dev mode: `./config.json`
/// - Installed: `{config_dir}/config.json`
pub fn config_file() -> PathBuf {
    config_dir()
        .map(|p| p.join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Path to the default project directory holding the asset store.
///
/// - Dev mode: `./project/`
/// - Installed: `{data_dir}/project/`
pub fn default_project_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("project"))
        .unwrap_or_else(|| PathBuf::from("project"))
}

/// Path to the logs directory.
///
/// - Dev mode: `./logs/`
/// - Installed: `{data_dir}/logs/`
pub fn logs_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Root directory for staged model files pending import.
///
/// Lives under the OS temp directory so a crashed session leaves nothing
/// behind that a reboot won't clear.
pub fn staging_root() -> PathBuf {
    std::env::temp_dir().join("sceneforge").join("staging")
}

/// Checks that `path` resolves to a location inside `root`.
///
/// Both sides are canonicalized before comparison, so symlinks and `..`
/// segments cannot smuggle a directory outside `root` past the check.
/// Returns false whenever canonicalization fails (missing path,
/// permission error) — callers treat that as "not proven safe".
pub fn is_within_dir(root: &Path, path: &Path) -> bool {
    let Ok(canonical_root) = root.canonicalize() else {
        return false;
    };
    let Ok(canonical_path) = path.canonicalize() else {
        return false;
    };
    canonical_path.starts_with(&canonical_root)
}

/// Ensure all required directories exist.
///
/// Called early in startup to create config, data, and staging directories.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(staging_root())?;

    if is_dev_mode() {
        // In dev mode, config and data directories are local and typically exist
        return Ok(());
    }

    if let Some(config) = config_dir() {
        std::fs::create_dir_all(&config)?;
    }
    if let Some(data) = data_dir() {
        std::fs::create_dir_all(&data)?;
        std::fs::create_dir_all(data.join("logs"))?;
    }
    Ok(())
}

/// Create the default project store structure on first run.
///
/// Creates empty models/ and materials/ subdirectories.
pub fn setup_default_project(root: &Path) -> std::io::Result<()> {
    if root.exists() {
        return Ok(());
    }

    std::fs::create_dir_all(root.join("models"))?;
    std::fs::create_dir_all(root.join("materials"))?;
    Ok(())
}
