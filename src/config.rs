//! Runtime configuration: where tasks live and how chatty the logs are.

use std::env;
use std::path::{Path, PathBuf};

use crate::storage::STORAGE_KEY;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TODO_DATA_DIR";
/// Environment variable overriding the storage key.
pub const STORAGE_KEY_ENV: &str = "TODO_STORAGE_KEY";
/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "TODO_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
}

impl Config {
    /// Resolve from the `--data-dir` flag, then the environment, then `~/.todo`.
    pub fn resolve(data_dir_flag: Option<&Path>) -> Self {
        Self::resolve_with(data_dir_flag, |name| env::var(name).ok())
    }

    fn resolve_with(data_dir_flag: Option<&Path>, var: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = match data_dir_flag {
            Some(dir) => dir.to_path_buf(),
            None => match var(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
                Some(dir) => PathBuf::from(dir),
                None => {
                    let home = var("HOME").unwrap_or_else(|| ".".to_string());
                    PathBuf::from(home).join(".todo")
                }
            },
        };
        let storage_key = var(STORAGE_KEY_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| STORAGE_KEY.to_string());
        Config {
            data_dir,
            storage_key,
        }
    }

    /// Key under which the TUI keeps its view state.
    pub fn view_state_key(&self) -> String {
        format!("{}-view", self.storage_key)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("todo.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_flag_beats_environment() {
        let cfg = Config::resolve_with(
            Some(Path::new("/tmp/flag")),
            env_of(&[(DATA_DIR_ENV, "/tmp/env"), ("HOME", "/home/u")]),
        );
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/flag"));
        assert_eq!(cfg.storage_key, "@todos");
    }

    #[test]
    fn test_environment_then_home() {
        let cfg = Config::resolve_with(None, env_of(&[(DATA_DIR_ENV, "/tmp/env")]));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/env"));

        let cfg = Config::resolve_with(None, env_of(&[("HOME", "/home/u"), (STORAGE_KEY_ENV, "@work")]));
        assert_eq!(cfg.data_dir, PathBuf::from("/home/u/.todo"));
        assert_eq!(cfg.storage_key, "@work");
        assert_eq!(cfg.view_state_key(), "@work-view");
        assert_eq!(cfg.log_file(), PathBuf::from("/home/u/.todo/todo.log"));
    }
}
