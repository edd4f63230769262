pub mod settings;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::file_handler::DEFAULT_MAX_FILE_SIZE;

/// Name of the per-root rule file when the config does not override it.
pub const DEFAULT_RULE_FILE_NAME: &str = ".codecopierignore";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub last_directory: Option<PathBuf>,
    pub rule_file_name: String,
    pub max_file_size_bytes: u64,
    pub max_git_diff_bytes: u64,
    pub watch_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_directory: None,
            rule_file_name: DEFAULT_RULE_FILE_NAME.to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            max_git_diff_bytes: 10 * 1024 * 1024,
            watch_debounce_ms: 1000,
        }
    }
}
