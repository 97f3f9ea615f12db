use serde::Deserialize;
use speedread_core::TimingConfig;
use speedread_core::pacing::{MAX_WPM, MIN_WPM};
use speedread_core::session::SessionOptions;

/// High-level app configuration; the flattened form of the TOML tables.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_wpm")]
    pub wpm: u32,
    #[serde(default)]
    pub ramp_duration_secs: f64,
    #[serde(default)]
    pub paragraph_pause_enabled: bool,
    #[serde(default = "crate::config::defaults::default_paragraph_pause_secs")]
    pub paragraph_pause_secs: f64,
    #[serde(default)]
    pub paragraph_ramp_reset: bool,
    #[serde(default)]
    pub activation_mode: ActivationMode,
    #[serde(default = "crate::config::defaults::default_skip_seconds")]
    pub skip_seconds: f64,
    #[serde(default = "crate::config::defaults::default_wpm_step")]
    pub wpm_step: u32,
    #[serde(default = "crate::config::defaults::default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_progress_retention_days")]
    pub progress_retention_days: u64,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            wpm: crate::config::defaults::default_wpm(),
            ramp_duration_secs: 0.0,
            paragraph_pause_enabled: false,
            paragraph_pause_secs: crate::config::defaults::default_paragraph_pause_secs(),
            paragraph_ramp_reset: false,
            activation_mode: ActivationMode::default(),
            skip_seconds: crate::config::defaults::default_skip_seconds(),
            wpm_step: crate::config::defaults::default_wpm_step(),
            frame_interval_ms: crate::config::defaults::default_frame_interval_ms(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            progress_retention_days: crate::config::defaults::default_progress_retention_days(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    /// Pacing knobs, clamped into the engine's bounds.
    pub fn timing_config(&self) -> TimingConfig {
        let mut timing = TimingConfig::default();
        timing.set_target_wpm(self.wpm);
        timing.set_ramp_duration_secs(self.ramp_duration_secs);
        timing.set_paragraph_pause(self.paragraph_pause_enabled, self.paragraph_pause_secs);
        timing.set_paragraph_ramp_reset(self.paragraph_ramp_reset);
        timing
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            skip_seconds: if self.skip_seconds.is_finite() && self.skip_seconds > 0.0 {
                self.skip_seconds
            } else {
                crate::config::defaults::default_skip_seconds()
            },
            wpm_step: self.wpm_step.clamp(1, MAX_WPM - MIN_WPM),
        }
    }

    /// Keeps the settings that must never come from a cached per-document copy.
    pub fn with_base_overrides(mut self, base: &AppConfig) -> Self {
        self.log_level = base.log_level;
        self.cache_dir = base.cache_dir.clone();
        self.frame_interval_ms = base.frame_interval_ms;
        self
    }
}

/// Whether reading starts on open or waits for the user.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    Auto,
    #[default]
    Manual,
}

impl std::fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActivationMode::Auto => "auto",
            ActivationMode::Manual => "manual",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_config_clamps_out_of_range_values() {
        let config = AppConfig {
            wpm: 5_000,
            ramp_duration_secs: 600.0,
            paragraph_pause_enabled: true,
            paragraph_pause_secs: -1.0,
            ..AppConfig::default()
        };
        let timing = config.timing_config();
        assert_eq!(timing.target_wpm(), MAX_WPM);
        assert!((timing.ramp_duration_ms() - 60_000.0).abs() < 1e-9);
        assert!(timing.paragraph_pause_enabled());
        assert!(timing.paragraph_pause_ms().abs() < 1e-9);
    }

    #[test]
    fn session_options_replace_unusable_values() {
        let config = AppConfig {
            skip_seconds: f64::NAN,
            wpm_step: 0,
            ..AppConfig::default()
        };
        let options = config.session_options();
        assert!((options.skip_seconds - 10.0).abs() < 1e-9);
        assert_eq!(options.wpm_step, 1);
    }

    #[test]
    fn base_overrides_win_over_cached_copy() {
        let base = AppConfig {
            log_level: LogLevel::Warn,
            cache_dir: "/tmp/base-cache".to_string(),
            frame_interval_ms: 8,
            ..AppConfig::default()
        };
        let cached = AppConfig {
            wpm: 450,
            log_level: LogLevel::Trace,
            cache_dir: "elsewhere".to_string(),
            frame_interval_ms: 100,
            ..AppConfig::default()
        };

        let merged = cached.with_base_overrides(&base);
        assert_eq!(merged.wpm, 450);
        assert_eq!(merged.log_level, LogLevel::Warn);
        assert_eq!(merged.cache_dir, "/tmp/base-cache");
        assert_eq!(merged.frame_interval_ms, 8);
    }
}
