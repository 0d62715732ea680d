use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Display geometry the grid is derived from (640x480 px at 4 px per cell = 160x120 cells)
pub const WINDOW_WIDTH: usize = 640;
pub const WINDOW_HEIGHT: usize = 480;
pub const CELL_SIZE: usize = 4;

/// Edge length of the square tiles the generation sweep is partitioned into
pub const TILE_SIZE: usize = 16;

/// Default catalog file, resolved next to the config file
pub const DEFAULT_RULE_FILE: &str = "lexicon.txt";

/// Default config file name
pub const CONFIG_FILE: &str = "config.json";

/// Directory holding the bundled config and catalog
pub const ASSETS_DIR: &str = "assets";

/// Generations the headless host runs before printing the final grid
pub const DEFAULT_GENERATIONS: u64 = 100;

/// Runtime configuration read from JSON. Every field is optional.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Catalog file, relative to the config file's directory
    pub rule_file: PathBuf,
    /// Index of the pattern selected at startup (taken modulo the catalog size)
    pub rule_init: usize,
    /// Delay between generations in milliseconds
    pub delay: u64,
    pub window_width: usize,
    pub window_height: usize,
    pub cell_size: usize,
    pub tile_size: usize,
    /// Worker threads for the sweep; 0 uses rayon's global pool
    pub threads: usize,
    pub generations: u64,

    #[serde(skip)]
    pub(crate) base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rule_file: PathBuf::from(DEFAULT_RULE_FILE),
            rule_init: 0,
            delay: 0,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            cell_size: CELL_SIZE,
            tile_size: TILE_SIZE,
            threads: 0,
            generations: DEFAULT_GENERATIONS,
            base_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Parse a config from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        Ok(config)
    }

    /// Load a config file. A missing file falls back to defaults rooted at the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut config = match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.base_dir = base_dir;
        Ok(config)
    }

    /// Catalog path with relative paths resolved against the config's directory
    pub fn rule_path(&self) -> PathBuf {
        if self.rule_file.is_absolute() {
            self.rule_file.clone()
        } else {
            self.base_dir.join(&self.rule_file)
        }
    }

    /// Bundled config path, used when no path is given on the command line
    pub fn default_path() -> PathBuf {
        Path::new(ASSETS_DIR).join(CONFIG_FILE)
    }

    /// Grid dimensions in cells: (cols, rows)
    pub fn grid_size(&self) -> (usize, usize) {
        let cell = self.cell_size.max(1);
        (self.window_width / cell, self.window_height / cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grid_size(), (160, 120));
        assert_eq!(config.rule_file, PathBuf::from("lexicon.txt"));
        assert_eq!(config.tile_size, TILE_SIZE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "rule_init": 7, "delay": 30 }"#).unwrap();
        assert_eq!(config.rule_init, 7);
        assert_eq!(config.delay, 30);
        assert_eq!(config.window_width, WINDOW_WIDTH);
        assert_eq!(config.generations, DEFAULT_GENERATIONS);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = Config::from_json("{ rule_init: ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rule_path_relative_to_config_dir() {
        let dir = std::env::temp_dir().join("lifex-config-test-missing");
        let config = Config::load(&dir.join(CONFIG_FILE)).unwrap();
        assert_eq!(config.rule_path(), dir.join(DEFAULT_RULE_FILE));
    }

    #[test]
    fn test_bundled_config_resolves_catalog() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(Config::default_path());
        let config = Config::load(&path).unwrap();
        let catalog = crate::simulation::Catalog::load(&config.rule_path()).unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(config.grid_size(), (160, 120));
    }

    #[test]
    fn test_grid_size_zero_cell_size() {
        let config = Config {
            cell_size: 0,
            window_width: 10,
            window_height: 5,
            ..Config::default()
        };
        assert_eq!(config.grid_size(), (10, 5));
    }
}
