use hostwatch_core::Settings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "hostwatch.yaml";

#[derive(Debug, Default, Deserialize, Clone)]
pub struct StoreConfig {
    pub location: Option<PathBuf>,
    pub default_threshold_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct SynthConfig {
    pub hosts: Option<usize>,
    pub antivirus: Option<usize>,
    pub logs: Option<usize>,
    pub cidr: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub store: Option<StoreConfig>,
    pub synth: Option<SynthConfig>,
}

impl Config {
    /// Resolve runtime settings: `--db` beats the config file, which beats built-in defaults.
    pub fn settings(&self, db_override: Option<&Path>) -> Settings {
        let defaults = Settings::default();
        let store = self.store.clone().unwrap_or_default();
        let location = db_override
            .map(Path::to_path_buf)
            .or(store.location)
            .unwrap_or(defaults.store_location);
        let days = store
            .default_threshold_days
            .unwrap_or_else(|| i64::from(defaults.default_threshold_days.days()));
        Settings::new(location, days)
    }
}

pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config not readable, using defaults");
            return None;
        }
    };
    match serde_yaml::from_str(&s) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config not valid YAML, using defaults");
            None
        }
    }
}
