//! Session configuration: where the data tables live and how dice are seeded.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::StorePaths;

pub const ENV_DATA_DIR: &str = "MELEE_DATA_DIR";
pub const ENV_SEED: &str = "MELEE_SEED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MeleeConfig {
    pub data_dir: PathBuf,
    pub roster_file: String,
    pub participants_file: String,
    pub saving_throws_file: String,
    pub log_file: String,
    /// Fixed dice seed; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            roster_file: "roster.json".to_string(),
            participants_file: "participants.json".to_string(),
            saving_throws_file: "saving_throws.json".to_string(),
            log_file: "combat_log.jsonl".to_string(),
            seed: None,
        }
    }
}

impl MeleeConfig {
    /// Reads a YAML file; keys it leaves out keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config YAML: {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config YAML: {}", path.display()))
    }

    /// Defaults, then the optional YAML file, then `MELEE_DATA_DIR` / `MELEE_SEED`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| env::var(key).ok()))
    }

    /// Applies environment overrides through `lookup`; unparsable seeds are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup(ENV_SEED).and_then(|s| s.trim().parse().ok()) {
            self.seed = Some(seed);
        }
        self
    }

    pub fn store_paths(&self) -> StorePaths {
        StorePaths {
            roster: self.data_dir.join(&self.roster_file),
            participants: self.data_dir.join(&self.participants_file),
            saving_throws: self.data_dir.join(&self.saving_throws_file),
            log: self.data_dir.join(&self.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("melee.yaml");
        fs::write(&path, "data_dir: campaign\nseed: 9\n").unwrap();
        let config = MeleeConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("campaign"));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.roster_file, "roster.json");
    }

    #[test]
    fn env_lookup_beats_file_values() {
        let config = MeleeConfig { seed: Some(1), ..Default::default() }.with_env(|key| match key {
            ENV_DATA_DIR => Some("/tmp/melee".to_string()),
            ENV_SEED => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/tmp/melee"));
        assert_eq!(config.seed, Some(1));
    }

    #[test]
    fn store_paths_join_the_data_dir() {
        let paths = MeleeConfig::default().store_paths();
        assert_eq!(paths.roster, PathBuf::from("data/roster.json"));
        assert_eq!(paths.log, PathBuf::from("data/combat_log.jsonl"));
    }
}
