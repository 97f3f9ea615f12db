//! Index arithmetic for skipping and paragraph navigation.
//!
//! Everything here is pure. Out-of-range input is clamped rather than
//! rejected, so callers racing a document reload can never fault.

/// Number of words covering `seconds` of reading at `wpm`.
pub fn skip_word_count(wpm: u32, seconds: f64) -> usize {
    let words = (f64::from(wpm) / 60.0 * seconds).round();
    if words.is_finite() && words > 0.0 {
        words as usize
    } else {
        0
    }
}

pub fn clamp_forward(current: usize, total: usize, skip: usize) -> usize {
    current
        .saturating_add(skip)
        .min(total.saturating_sub(1))
}

pub fn clamp_backward(current: usize, skip: usize) -> usize {
    current.saturating_sub(skip)
}

/// Smallest boundary strictly after `current`; `current` itself when there is none.
pub fn next_paragraph_boundary(current: usize, boundaries: &[usize]) -> usize {
    let after = boundaries.partition_point(|start| *start <= current);
    boundaries.get(after).copied().unwrap_or(current)
}

/// Largest boundary strictly before `current`, defaulting to the document start.
pub fn previous_paragraph_boundary(current: usize, boundaries: &[usize]) -> usize {
    let before = boundaries.partition_point(|start| *start < current);
    before
        .checked_sub(1)
        .and_then(|idx| boundaries.get(idx).copied())
        .unwrap_or(0)
}

/// Start of the paragraph containing `index`. This is the position worth
/// persisting: resuming re-reads the whole paragraph.
pub fn paragraph_start_for(index: usize, boundaries: &[usize]) -> usize {
    let upto = boundaries.partition_point(|start| *start <= index);
    upto.checked_sub(1)
        .and_then(|idx| boundaries.get(idx).copied())
        .unwrap_or(0)
}

pub fn remaining_time_secs(remaining_words: usize, wpm: u32) -> f64 {
    if wpm == 0 {
        return 0.0;
    }
    remaining_words as f64 / f64::from(wpm) * 60.0
}

/// `m:ss`, truncating fractional seconds.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
