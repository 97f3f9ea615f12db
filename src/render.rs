//! Single-line terminal renderer.
//!
//! Each word replaces the previous one in place, with its ORP character
//! bracketed so the eye has a fixed anchor.

use speedread_core::tokenizer::split_at_orp;
use speedread_core::{PlaybackObserver, WordRecord};
use std::io::{self, Write};
use tracing::warn;

const CLEAR_LINE: &str = "\r\x1b[2K";

pub struct TerminalRenderer<W: Write> {
    out: W,
    last_word: String,
    write_failed: bool,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_word: String::new(),
            write_failed: false,
        }
    }

    /// Prints a full line below the word display, e.g. a status message.
    pub fn message(&mut self, text: &str) {
        let result = writeln!(self.out, "{CLEAR_LINE}{text}").and_then(|_| self.out.flush());
        self.check(result);
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn check(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if !self.write_failed {
                warn!("Terminal write failed: {err}");
            }
            self.write_failed = true;
        }
    }
}

pub fn format_word(word: &str) -> String {
    let (before, orp, after) = split_at_orp(word);
    format!("{before}[{orp}]{after}")
}

impl<W: Write> PlaybackObserver for TerminalRenderer<W> {
    fn word_changed(&mut self, word: &WordRecord, _index: usize) {
        self.last_word = format_word(&word.text);
    }

    fn progress(&mut self, current: usize, total: usize) {
        let result = write!(
            self.out,
            "{CLEAR_LINE}  {:<28} {current}/{total}",
            self.last_word
        )
        .and_then(|_| self.out.flush());
        self.check(result);
    }

    fn completed(&mut self) {
        self.message("");
        self.message("Finished.");
    }
}
