use chrono::FixedOffset;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{errors::ReportError, operator::DecimalConfig};

const DEFAULT_DIR_NAME: &str = ".report_core";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "REPORT_CORE_HOME";
const TMP_SUFFIX: &str = "tmp";
const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// Runtime settings for a report store and its maintenance sweeps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Offset from UTC, in seconds, used to map timestamps onto calendar months.
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub decimal: DecimalConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset_seconds: 0,
            settlement: SettlementConfig::default(),
            decimal: DecimalConfig::DEFAULT,
        }
    }
}

impl ReportConfig {
    /// The configured zone, rejecting offsets outside ±18 hours.
    pub fn zone(&self) -> Result<FixedOffset, ReportError> {
        if self.utc_offset_seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(ReportError::Config(format!(
                "utc_offset_seconds {} is outside ±{}",
                self.utc_offset_seconds, MAX_OFFSET_SECONDS
            )));
        }
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            ReportError::Config(format!(
                "utc_offset_seconds {} is not a valid offset",
                self.utc_offset_seconds
            ))
        })
    }
}

/// Thresholds for policy-driven settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementConfig {
    #[serde(default = "SettlementConfig::default_pending_threshold")]
    pub pending_threshold: usize,
    #[serde(default = "SettlementConfig::default_max_age_days")]
    pub max_age_days: i64,
}

impl SettlementConfig {
    pub fn default_pending_threshold() -> usize {
        1000
    }

    pub fn default_max_age_days() -> i64 {
        30
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            pending_threshold: Self::default_pending_threshold(),
            max_age_days: Self::default_max_age_days(),
        }
    }
}

/// Returns the application data directory, defaulting to `~/.report_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`ReportConfig`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Manager for `config.json` inside `base`, creating the directory if needed.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ReportError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    /// Manager rooted at `$REPORT_CORE_HOME` or `~/.report_core`.
    pub fn default_location() -> Result<Self, ReportError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<ReportConfig, ReportError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "config file missing, using defaults");
            return Ok(ReportConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: ReportConfig = serde_json::from_str(&data)?;
        config.zone()?;
        Ok(config)
    }

    pub fn save(&self, config: &ReportConfig) -> Result<(), ReportError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "saved report config");
        Ok(())
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

fn write_atomic(path: &Path, data: &str) -> Result<(), ReportError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
