//! Per-word timing: rate bounds, duration modifiers and the start-up ramp.

pub const MIN_WPM: u32 = 100;
pub const MAX_WPM: u32 = 800;
pub const DEFAULT_WPM: u32 = 300;
/// Rate every ramp starts from.
pub const RAMP_START_WPM: f64 = 100.0;
pub const MAX_RAMP_DURATION_MS: f64 = 60_000.0;
pub const MAX_PARAGRAPH_PAUSE_MS: f64 = 5_000.0;
pub const DEFAULT_PARAGRAPH_PAUSE_MS: f64 = 500.0;

const LONG_WORD_CHARS: usize = 8;
const VERY_LONG_WORD_CHARS: usize = 12;
const LONG_WORD_BONUS: f64 = 0.2;
const VERY_LONG_WORD_BONUS: f64 = 0.4;
const SENTENCE_END_BONUS: f64 = 0.5;
const CLAUSE_END_BONUS: f64 = 0.25;

/// Mutable pacing knobs. Setters clamp; nothing here can be rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    target_wpm: u32,
    ramp_duration_ms: f64,
    paragraph_pause_enabled: bool,
    paragraph_pause_ms: f64,
    paragraph_ramp_reset_enabled: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            target_wpm: DEFAULT_WPM,
            ramp_duration_ms: 0.0,
            paragraph_pause_enabled: false,
            paragraph_pause_ms: DEFAULT_PARAGRAPH_PAUSE_MS,
            paragraph_ramp_reset_enabled: false,
        }
    }
}

impl TimingConfig {
    pub fn target_wpm(&self) -> u32 {
        self.target_wpm
    }

    pub fn ramp_duration_ms(&self) -> f64 {
        self.ramp_duration_ms
    }

    pub fn paragraph_pause_enabled(&self) -> bool {
        self.paragraph_pause_enabled
    }

    pub fn paragraph_pause_ms(&self) -> f64 {
        self.paragraph_pause_ms
    }

    pub fn paragraph_ramp_reset_enabled(&self) -> bool {
        self.paragraph_ramp_reset_enabled
    }

    pub fn set_target_wpm(&mut self, wpm: u32) {
        self.target_wpm = wpm.clamp(MIN_WPM, MAX_WPM);
    }

    pub fn set_ramp_duration_secs(&mut self, seconds: f64) {
        self.ramp_duration_ms = clamp_ms(seconds * 1000.0, MAX_RAMP_DURATION_MS);
    }

    pub fn set_paragraph_pause(&mut self, enabled: bool, seconds: f64) {
        self.paragraph_pause_enabled = enabled;
        self.paragraph_pause_ms = clamp_ms(seconds * 1000.0, MAX_PARAGRAPH_PAUSE_MS);
    }

    pub fn set_paragraph_ramp_reset(&mut self, enabled: bool) {
        self.paragraph_ramp_reset_enabled = enabled;
    }

    /// Rate in effect `elapsed_ms` after the ramp started.
    ///
    /// Eases out quadratically from [`RAMP_START_WPM`] to the target.
    pub fn effective_wpm(&self, elapsed_ms: f64) -> f64 {
        let target = f64::from(self.target_wpm);
        if self.ramp_duration_ms <= 0.0 || elapsed_ms >= self.ramp_duration_ms {
            return target;
        }
        let progress = (elapsed_ms / self.ramp_duration_ms).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - progress).powi(2);
        RAMP_START_WPM + (target - RAMP_START_WPM) * eased
    }

    /// Milliseconds the word `text` stays on screen.
    ///
    /// `ends_paragraph` is true when the following word opens a paragraph or
    /// `text` is the final word.
    pub fn word_interval_ms(&self, text: &str, elapsed_ms: f64, ends_paragraph: bool) -> f64 {
        let base = 60_000.0 / self.effective_wpm(elapsed_ms);
        let mut interval = base * word_duration_modifier(text);
        if self.paragraph_pause_enabled && ends_paragraph {
            interval += self.paragraph_pause_ms;
        }
        interval
    }
}

fn clamp_ms(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

/// Display-time multiplier for a word; always at least 1.0.
///
/// Only one length band applies. Punctuation bonuses add on top.
pub fn word_duration_modifier(word: &str) -> f64 {
    let mut modifier = 1.0;

    let length = word.chars().count();
    if length > VERY_LONG_WORD_CHARS {
        modifier += VERY_LONG_WORD_BONUS;
    } else if length > LONG_WORD_CHARS {
        modifier += LONG_WORD_BONUS;
    }

    match word.chars().last() {
        Some('.' | '!' | '?') => modifier += SENTENCE_END_BONUS,
        Some(',' | ';' | ':') => modifier += CLAUSE_END_BONUS,
        _ => {}
    }

    modifier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn modifier_applies_single_length_band() {
        assert!(approx(word_duration_modifier("hello"), 1.0));
        assert!(approx(word_duration_modifier("beautiful."), 1.7));
        assert!(approx(word_duration_modifier("abcdefghi"), 1.2));
        assert!(approx(word_duration_modifier("extraordinarily"), 1.4));
        assert!(approx(word_duration_modifier("extraordinarily,"), 1.65));
    }

    #[test]
    fn modifier_distinguishes_sentence_and_clause_endings() {
        assert!(approx(word_duration_modifier("stop!"), 1.5));
        assert!(approx(word_duration_modifier("why?"), 1.5));
        assert!(approx(word_duration_modifier("then;"), 1.25));
        assert!(approx(word_duration_modifier("note:"), 1.25));
        assert!(approx(word_duration_modifier(""), 1.0));
    }

    #[test]
    fn ramp_eases_from_start_rate_to_target() {
        let mut config = TimingConfig::default();
        config.set_target_wpm(300);
        config.set_ramp_duration_secs(10.0);

        assert!(approx(config.effective_wpm(0.0), RAMP_START_WPM));
        assert!(approx(config.effective_wpm(5_000.0), 100.0 + 200.0 * 0.75));
        assert!(approx(config.effective_wpm(10_000.0), 300.0));
        assert!(approx(config.effective_wpm(25_000.0), 300.0));
    }

    #[test]
    fn zero_ramp_uses_target_directly() {
        let mut config = TimingConfig::default();
        config.set_target_wpm(600);
        assert!(approx(config.effective_wpm(0.0), 600.0));
        assert!(approx(config.word_interval_ms("a", 0.0, false), 100.0));
        assert!(approx(config.word_interval_ms("c.", 0.0, false), 150.0));
    }

    #[test]
    fn setters_clamp_out_of_range_values() {
        let mut config = TimingConfig::default();
        config.set_target_wpm(50);
        assert_eq!(config.target_wpm(), MIN_WPM);
        config.set_target_wpm(1000);
        assert_eq!(config.target_wpm(), MAX_WPM);

        config.set_ramp_duration_secs(-3.0);
        assert!(approx(config.ramp_duration_ms(), 0.0));
        config.set_ramp_duration_secs(f64::NAN);
        assert!(approx(config.ramp_duration_ms(), 0.0));

        config.set_paragraph_pause(true, 60.0);
        assert!(config.paragraph_pause_enabled());
        assert!(approx(config.paragraph_pause_ms(), MAX_PARAGRAPH_PAUSE_MS));
    }

    #[test]
    fn paragraph_pause_only_added_when_enabled() {
        let mut config = TimingConfig::default();
        config.set_target_wpm(600);
        assert!(approx(config.word_interval_ms("end", 0.0, true), 100.0));

        config.set_paragraph_pause(true, 0.4);
        assert!(approx(config.word_interval_ms("end", 0.0, true), 500.0));
        assert!(approx(config.word_interval_ms("mid", 0.0, false), 100.0));
    }
}
