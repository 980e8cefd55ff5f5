use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{errors::ConfigError, period::MonthCache};

const TMP_SUFFIX: &str = "tmp";

/// Runtime settings for the engine's ambient concerns.
///
/// Every section has defaults, so an empty JSON object is a valid file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub log_filter: String,
    pub month_cache: MonthCacheConfig,
    pub verifier: VerifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "payment_timeline=info".into(),
            month_cache: MonthCacheConfig::default(),
            verifier: VerifierConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonthCacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prewarm: Option<YearRange>,
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifierConfig {
    /// Report every diverging month rather than stopping at the first.
    pub collect_all_divergences: bool,
}

impl Config {
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }
        if let Some(range) = self.month_cache.prewarm {
            if range.from > range.to {
                return Err(ConfigError::Invalid(format!(
                    "month_cache.prewarm starts at {} but ends at {}",
                    range.from, range.to
                )));
            }
        }
        Ok(())
    }

    /// Interns the configured years in `cache`; returns how many months were touched.
    pub fn prewarm(&self, cache: &MonthCache) -> Result<usize, ConfigError> {
        match self.month_cache.prewarm {
            Some(range) => cache
                .prewarm(range.from..=range.to)
                .map_err(|err| ConfigError::Invalid(err.to_string())),
            None => Ok(0),
        }
    }
}

/// Loads and stores a [`Config`] as a JSON file.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Config::from_json_str(&data)
        } else {
            debug!(path = %self.path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
