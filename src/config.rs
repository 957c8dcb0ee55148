// ⚙️ Storage configuration

use std::path::PathBuf;

/// Backing file used when nothing else is configured
pub const DEFAULT_FILE_PATH: &str = "file.json";

/// Environment variable the binary reads the backing file path from
pub const FILE_PATH_ENV: &str = "HBNB_FILE_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Single JSON file holding the whole registry
    pub file_path: PathBuf,
}

impl StorageConfig {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        StorageConfig {
            file_path: file_path.into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_PATH)
    }
}
