//! User settings with persistence and change notification.
//!
//! Every effective change is written to the per-document config file and then
//! announced to subscribers. Setting a value to what it already is does
//! neither.

use crate::cache::save_config_file;
use crate::config::{ActivationMode, AppConfig};
use speedread_core::pacing::{MAX_PARAGRAPH_PAUSE_MS, MAX_RAMP_DURATION_MS, MAX_WPM, MIN_WPM};
use speedread_core::{Listeners, Subscription};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    Wpm(u32),
    RampDurationSecs(f64),
    ParagraphPause { enabled: bool, seconds: f64 },
    ParagraphRampReset(bool),
    ActivationMode(ActivationMode),
}

pub struct SettingsStore {
    config: AppConfig,
    persist_path: Option<PathBuf>,
    listeners: Listeners<SettingsChange>,
}

impl SettingsStore {
    pub fn new(config: AppConfig, persist_path: Option<PathBuf>) -> Self {
        Self {
            config,
            persist_path,
            listeners: Listeners::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn subscribe(&self, listener: impl FnMut(&SettingsChange) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn set_wpm(&mut self, wpm: u32) {
        let wpm = wpm.clamp(MIN_WPM, MAX_WPM);
        if self.config.wpm == wpm {
            return;
        }
        self.config.wpm = wpm;
        self.commit(SettingsChange::Wpm(wpm));
    }

    pub fn set_ramp_duration_secs(&mut self, seconds: f64) {
        let seconds = clamp_secs(seconds, MAX_RAMP_DURATION_MS);
        if self.config.ramp_duration_secs == seconds {
            return;
        }
        self.config.ramp_duration_secs = seconds;
        self.commit(SettingsChange::RampDurationSecs(seconds));
    }

    pub fn set_paragraph_pause(&mut self, enabled: bool, seconds: f64) {
        let seconds = clamp_secs(seconds, MAX_PARAGRAPH_PAUSE_MS);
        if self.config.paragraph_pause_enabled == enabled
            && self.config.paragraph_pause_secs == seconds
        {
            return;
        }
        self.config.paragraph_pause_enabled = enabled;
        self.config.paragraph_pause_secs = seconds;
        self.commit(SettingsChange::ParagraphPause { enabled, seconds });
    }

    pub fn set_paragraph_ramp_reset(&mut self, enabled: bool) {
        if self.config.paragraph_ramp_reset == enabled {
            return;
        }
        self.config.paragraph_ramp_reset = enabled;
        self.commit(SettingsChange::ParagraphRampReset(enabled));
    }

    pub fn set_activation_mode(&mut self, mode: ActivationMode) {
        if self.config.activation_mode == mode {
            return;
        }
        self.config.activation_mode = mode;
        self.commit(SettingsChange::ActivationMode(mode));
    }

    fn commit(&mut self, change: SettingsChange) {
        info!(?change, "Settings changed");
        if let Some(path) = &self.persist_path {
            save_config_file(path, &self.config);
        }
        self.listeners.emit(&change);
    }
}

fn clamp_secs(seconds: f64, max_ms: f64) -> f64 {
    if seconds.is_nan() {
        return 0.0;
    }
    seconds.clamp(0.0, max_ms / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn recording(store: &SettingsStore) -> (Rc<RefCell<Vec<SettingsChange>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = store.subscribe(move |change| sink.borrow_mut().push(*change));
        (seen, subscription)
    }

    #[test]
    fn notifies_only_on_effective_change() {
        let mut store = SettingsStore::new(AppConfig::default(), None);
        let (seen, _subscription) = recording(&store);

        store.set_wpm(300);
        store.set_wpm(350);
        store.set_wpm(2_000);
        store.set_activation_mode(ActivationMode::Manual);
        store.set_activation_mode(ActivationMode::Auto);

        assert_eq!(
            *seen.borrow(),
            vec![
                SettingsChange::Wpm(350),
                SettingsChange::Wpm(MAX_WPM),
                SettingsChange::ActivationMode(ActivationMode::Auto),
            ]
        );
    }

    #[test]
    fn durations_are_clamped_before_storing() {
        let mut store = SettingsStore::new(AppConfig::default(), None);
        store.set_ramp_duration_secs(600.0);
        store.set_paragraph_pause(true, -2.0);
        store.set_paragraph_ramp_reset(true);

        let config = store.config();
        assert!((config.ramp_duration_secs - 60.0).abs() < 1e-9);
        assert!(config.paragraph_pause_enabled);
        assert!(config.paragraph_pause_secs.abs() < 1e-9);
        assert!(config.paragraph_ramp_reset);
    }

    #[test]
    fn changes_are_persisted() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("speedread_test_settings_{nanos}"));
        let path = dir.join("config.toml");

        let mut store = SettingsStore::new(AppConfig::default(), Some(path.clone()));
        store.set_wpm(475);

        assert_eq!(load_config(&path).wpm, 475);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unsubscribed_listener_stops_hearing_changes() {
        let mut store = SettingsStore::new(AppConfig::default(), None);
        let (seen, subscription) = recording(&store);

        store.set_wpm(400);
        subscription.unsubscribe();
        store.set_wpm(450);

        assert_eq!(seen.borrow().len(), 1);
    }
}
