use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::{Difficulty, Operation};
use crate::engine::level::{
    DEFAULT_LEVEL_SECONDS, DEFAULT_PROBLEMS_PER_LEVEL, DifficultyMode, OperationMode,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_level_seconds")]
    pub level_seconds: u32,
    #[serde(default = "default_problems_per_level")]
    pub problems_per_level: usize,
    #[serde(default)]
    pub difficulty_mode: DifficultyMode,
    #[serde(default)]
    pub operation_mode: OperationMode,
    #[serde(default = "default_operation")]
    pub operation: Operation,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default = "default_player_name")]
    pub player_name: String,
}

fn default_level_seconds() -> u32 {
    DEFAULT_LEVEL_SECONDS
}
fn default_problems_per_level() -> usize {
    DEFAULT_PROBLEMS_PER_LEVEL
}
fn default_operation() -> Operation {
    Operation::Addition
}
fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_player_name() -> String {
    "player".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level_seconds: default_level_seconds(),
            problems_per_level: default_problems_per_level(),
            difficulty_mode: DifficultyMode::default(),
            operation_mode: OperationMode::default(),
            operation: default_operation(),
            difficulty: default_difficulty(),
            muted: false,
            theme: default_theme(),
            catalog_path: None,
            player_name: default_player_name(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathmatch")
            .join("config.toml")
    }

    /// Clamp numeric settings into playable ranges and fill a blank player name.
    pub fn validate(&mut self) {
        self.level_seconds = self.level_seconds.clamp(10, 600);
        self.problems_per_level = self.problems_per_level.clamp(1, 8);
        if self.player_name.trim().is_empty() {
            self.player_name = default_player_name();
        }
    }
}
