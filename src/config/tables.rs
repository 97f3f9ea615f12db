use super::defaults;
use super::models::{ActivationMode, AppConfig, LogLevel};
use serde::Deserialize;

/// On-disk layout of `config.toml`.
#[derive(Debug, Clone, Deserialize, serde::Serialize, Default)]
pub(super) struct ConfigTables {
    #[serde(default)]
    pacing: PacingConfig,
    #[serde(default)]
    reading: ReadingConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            wpm: tables.pacing.wpm,
            ramp_duration_secs: tables.pacing.ramp_duration_secs,
            paragraph_pause_enabled: tables.pacing.paragraph_pause_enabled,
            paragraph_pause_secs: tables.pacing.paragraph_pause_secs,
            paragraph_ramp_reset: tables.pacing.paragraph_ramp_reset,
            activation_mode: tables.reading.activation_mode,
            skip_seconds: tables.reading.skip_seconds,
            wpm_step: tables.reading.wpm_step,
            frame_interval_ms: tables.reading.frame_interval_ms,
            cache_dir: tables.storage.cache_dir,
            progress_retention_days: tables.storage.progress_retention_days,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            pacing: PacingConfig {
                wpm: config.wpm,
                ramp_duration_secs: config.ramp_duration_secs,
                paragraph_pause_enabled: config.paragraph_pause_enabled,
                paragraph_pause_secs: config.paragraph_pause_secs,
                paragraph_ramp_reset: config.paragraph_ramp_reset,
            },
            reading: ReadingConfig {
                activation_mode: config.activation_mode,
                skip_seconds: config.skip_seconds,
                wpm_step: config.wpm_step,
                frame_interval_ms: config.frame_interval_ms,
            },
            storage: StorageConfig {
                cache_dir: config.cache_dir.clone(),
                progress_retention_days: config.progress_retention_days,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PacingConfig {
    #[serde(default = "defaults::default_wpm")]
    wpm: u32,
    #[serde(default)]
    ramp_duration_secs: f64,
    #[serde(default)]
    paragraph_pause_enabled: bool,
    #[serde(default = "defaults::default_paragraph_pause_secs")]
    paragraph_pause_secs: f64,
    #[serde(default)]
    paragraph_ramp_reset: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            wpm: defaults::default_wpm(),
            ramp_duration_secs: 0.0,
            paragraph_pause_enabled: false,
            paragraph_pause_secs: defaults::default_paragraph_pause_secs(),
            paragraph_ramp_reset: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReadingConfig {
    #[serde(default)]
    activation_mode: ActivationMode,
    #[serde(default = "defaults::default_skip_seconds")]
    skip_seconds: f64,
    #[serde(default = "defaults::default_wpm_step")]
    wpm_step: u32,
    #[serde(default = "defaults::default_frame_interval_ms")]
    frame_interval_ms: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        ReadingConfig {
            activation_mode: ActivationMode::default(),
            skip_seconds: defaults::default_skip_seconds(),
            wpm_step: defaults::default_wpm_step(),
            frame_interval_ms: defaults::default_frame_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
    #[serde(default = "defaults::default_progress_retention_days")]
    progress_retention_days: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            cache_dir: defaults::default_cache_dir(),
            progress_retention_days: defaults::default_progress_retention_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
