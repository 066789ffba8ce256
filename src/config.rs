//! Lab and library configuration

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const REPO_ENV: &str = "PROMPTLAB_REPO";
pub const HOME_ENV: &str = "PROMPTLAB_HOME";

/// Tunables for the genetic operators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Probability that a breeding event appends one mutant gene
    pub mutation_rate: f64,
    /// Default fraction of genes touched by `mutate`
    pub mutation_strength: f64,
    /// Default split point (fraction of the first parent) for crossover
    pub split_ratio: f64,
    /// Default depth requested when rendering lineage
    pub lineage_depth: usize,
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            mutation_strength: 0.2,
            split_ratio: 0.5,
            lineage_depth: 3,
            seed: None,
        }
    }
}

impl LabConfig {
    /// Deterministic config with mutation during breeding switched off
    pub fn deterministic(seed: u64) -> Self {
        Self {
            mutation_rate: 0.0,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Read `config.json` from the lab directory, falling back to defaults
    /// when the file is missing or malformed.
    pub fn load_or_default(lab_path: impl AsRef<Path>) -> Self {
        let path = lab_path.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path).map(|json| serde_json::from_str::<LabConfig>(&json)) {
            Ok(Ok(config)) => {
                info!("Loaded lab config from {}", path.display());
                config
            }
            Ok(Err(e)) => {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Where prompt sources and the personal genome live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root of the prompt repository (category folders live beneath it)
    pub repo_path: PathBuf,
    /// Lab state directory (personal genome, config)
    pub lab_path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            lab_path: PathBuf::from(".promptlab"),
        }
    }
}

impl LibraryConfig {
    pub fn new(repo_path: impl Into<PathBuf>, lab_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            lab_path: lab_path.into(),
        }
    }

    /// Defaults overridden by `PROMPTLAB_REPO` / `PROMPTLAB_HOME`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(repo) = std::env::var(REPO_ENV) {
            config.repo_path = PathBuf::from(repo);
        }
        if let Ok(home) = std::env::var(HOME_ENV) {
            config.lab_path = PathBuf::from(home);
        }
        config
    }
}
