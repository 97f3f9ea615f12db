use speedread_core::pacing::{DEFAULT_PARAGRAPH_PAUSE_MS, DEFAULT_WPM};
use speedread_core::progress::DEFAULT_RETENTION_DAYS;
use speedread_core::session::{DEFAULT_SKIP_SECONDS, DEFAULT_WPM_STEP};

pub(crate) fn default_wpm() -> u32 {
    DEFAULT_WPM
}

pub(crate) fn default_paragraph_pause_secs() -> f64 {
    DEFAULT_PARAGRAPH_PAUSE_MS / 1000.0
}

pub(crate) fn default_skip_seconds() -> f64 {
    DEFAULT_SKIP_SECONDS
}

pub(crate) fn default_wpm_step() -> u32 {
    DEFAULT_WPM_STEP
}

/// Roughly one display refresh at 60 Hz.
pub(crate) fn default_frame_interval_ms() -> u64 {
    16
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_progress_retention_days() -> u64 {
    DEFAULT_RETENTION_DAYS
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
