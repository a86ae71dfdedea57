//! Default paths for tactician
//!
//! Everything lives in one user-writable data directory:
//! - `$TACTICIAN_DATA_DIR` if set
//! - `$XDG_DATA_HOME/tactician` if set
//! - `~/.local/share/tactician` otherwise

use std::path::{Path, PathBuf};

/// Environment variable for overriding the data directory
pub const TACTICIAN_DATA_DIR_ENV: &str = "TACTICIAN_DATA_DIR";

/// Application settings file
pub const CONFIG_FILENAME: &str = "config.json";

/// Strategy catalog file
pub const STRATEGIES_FILENAME: &str = "strategies.json";

/// Account store file
pub const ACCOUNTS_FILENAME: &str = "accounts.json";

/// Application subdirectory name
const APP_DIR: &str = "tactician";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$TACTICIAN_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/tactician` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/tactician` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(TACTICIAN_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking TACTICIAN_DATA_DIR.
/// Used for clap defaults where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Some(data) = dirs::data_dir() {
        return data.join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR)
}

/// Resolved file locations inside a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub strategies: PathBuf,
    pub accounts: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            config: root.join(CONFIG_FILENAME),
            strategies: root.join(STRATEGIES_FILENAME),
            accounts: root.join(ACCOUNTS_FILENAME),
            root,
        }
    }
}
