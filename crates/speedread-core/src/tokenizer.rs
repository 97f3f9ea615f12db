//! Whitespace tokenizer and plain-text extractor.
//!
//! Punctuation stays glued to its word; the pacing modifiers depend on it.

use crate::word::{Extraction, ParagraphBoundaries, SourceAnchor, WordRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

static RE_ZERO_WIDTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{200B}-\u{200D}\u{FEFF}]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());
static RE_PUNCTUATION_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\w\s]+$").unwrap());
static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+(?P<title>.*?)\s*#*\s*$").unwrap());

/// Collapses whitespace runs, strips zero-width characters and trims.
pub fn clean_text(text: &str) -> String {
    let visible = RE_ZERO_WIDTH.replace_all(text, "");
    let composed: String = visible.chars().nfc().collect();
    RE_WHITESPACE.replace_all(&composed, " ").trim().to_string()
}

/// Splits one paragraph into word records numbered from `start_index`.
pub fn tokenize_text(text: &str, paragraph_index: usize, start_index: usize) -> Vec<WordRecord> {
    clean_text(text)
        .split(' ')
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(offset, word)| WordRecord {
            text: word.to_string(),
            sequence_index: start_index + offset,
            paragraph_index,
            is_paragraph_start: offset == 0,
            source_anchor: SourceAnchor::default(),
            heading_context: None,
        })
        .collect()
}

pub fn is_punctuation_only(word: &str) -> bool {
    RE_PUNCTUATION_ONLY.is_match(word)
}

/// Character position the eye should fixate on for a word of `char_len` characters.
pub fn orp_index(char_len: usize) -> usize {
    match char_len {
        0..=3 => 0,
        4..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// Splits `word` into the text before the ORP character, the character itself
/// and the rest. The middle part is empty only for an empty word.
pub fn split_at_orp(word: &str) -> (&str, &str, &str) {
    let orp = orp_index(word.chars().count());
    let mut boundaries = word
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(word.len()))
        .skip(orp);
    let start = boundaries.next().unwrap_or(word.len());
    let end = boundaries.next().unwrap_or(word.len());
    (&word[..start], &word[start..end], &word[end..])
}

/// Extracts words from plain or lightly marked-up text.
///
/// Blank lines separate paragraphs. A `#`-style heading line is a paragraph of
/// its own, and its title becomes the heading context of every word up to the
/// next heading.
pub fn extract_plain_text(source: &str) -> Extraction {
    let mut builder = ExtractionBuilder::default();
    let mut line_start = 0;

    for line in source.split_inclusive('\n') {
        let offset = line_start;
        line_start += line.len();

        if line.trim().is_empty() {
            builder.close_paragraph();
            continue;
        }

        if let Some(title) = heading_title(line) {
            builder.close_paragraph();
            builder.heading = Some(title);
            builder.push_line(line, offset, true);
            builder.close_paragraph();
            continue;
        }

        builder.push_line(line, offset, false);
    }
    builder.close_paragraph();

    let extraction = builder.finish();
    debug!(
        words = extraction.total_words(),
        paragraphs = extraction.paragraph_count(),
        "Extracted plain text"
    );
    extraction
}

#[derive(Default)]
struct ExtractionBuilder {
    words: Vec<WordRecord>,
    starts: Vec<usize>,
    paragraph_index: usize,
    paragraph_open: bool,
    heading: Option<String>,
}

impl ExtractionBuilder {
    /// On heading lines the `#` markers around the title are not words.
    fn push_line(&mut self, line: &str, line_offset: usize, heading: bool) {
        for token in RE_TOKEN.find_iter(line) {
            let text = clean_text(token.as_str());
            if text.is_empty() {
                continue;
            }
            if heading && is_heading_marker(&text) {
                continue;
            }
            let sequence_index = self.words.len();
            let is_paragraph_start = !self.paragraph_open;
            if is_paragraph_start {
                self.starts.push(sequence_index);
                self.paragraph_open = true;
            }
            self.words.push(WordRecord {
                text,
                sequence_index,
                paragraph_index: self.paragraph_index,
                is_paragraph_start,
                source_anchor: SourceAnchor {
                    start: line_offset + token.start(),
                    end: line_offset + token.end(),
                },
                heading_context: self.heading.clone(),
            });
        }
    }

    fn close_paragraph(&mut self) {
        if self.paragraph_open {
            self.paragraph_open = false;
            self.paragraph_index += 1;
        }
    }

    fn finish(self) -> Extraction {
        Extraction {
            words: self.words,
            boundaries: ParagraphBoundaries::from_indices(self.starts),
        }
    }
}

/// Title of a `#` heading line. A line of bare markers is not a heading.
fn heading_title(line: &str) -> Option<String> {
    let caps = RE_HEADING.captures(line)?;
    let title = clean_text(caps.name("title")?.as_str());
    (!title.is_empty() && !is_heading_marker(&title)).then_some(title)
}

fn is_heading_marker(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == '#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_space_and_drops_zero_width() {
        assert_eq!(clean_text("  hello\u{200B}   big\n\tworld\u{FEFF} "), "hello big world");
        assert_eq!(clean_text("cafe\u{0301}"), "caf\u{e9}");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn tokenize_marks_first_word_and_numbers_from_offset() {
        let words = tokenize_text("The quick, brown fox.", 2, 10);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "quick,", "brown", "fox."]);
        assert_eq!(words[0].sequence_index, 10);
        assert_eq!(words[3].sequence_index, 13);
        assert!(words[0].is_paragraph_start);
        assert!(!words[1].is_paragraph_start);
        assert!(words.iter().all(|w| w.paragraph_index == 2));
        assert!(tokenize_text(" \u{200B} ", 0, 0).is_empty());
    }

    #[test]
    fn punctuation_only_tokens_are_detected() {
        assert!(is_punctuation_only("--"));
        assert!(is_punctuation_only("…"));
        assert!(!is_punctuation_only("a."));
        assert!(!is_punctuation_only(""));
    }

    #[test]
    fn orp_follows_length_bands() {
        assert_eq!(orp_index(1), 0);
        assert_eq!(orp_index(3), 0);
        assert_eq!(orp_index(4), 1);
        assert_eq!(orp_index(5), 1);
        assert_eq!(orp_index(9), 2);
        assert_eq!(orp_index(13), 3);
        assert_eq!(orp_index(14), 4);
    }

    #[test]
    fn split_at_orp_is_char_aware() {
        assert_eq!(split_at_orp("reading"), ("re", "a", "ding"));
        assert_eq!(split_at_orp("a"), ("", "a", ""));
        assert_eq!(split_at_orp("über"), ("ü", "b", "er"));
        assert_eq!(split_at_orp(""), ("", "", ""));
    }

    #[test]
    fn extract_splits_paragraphs_on_blank_lines() {
        let source = "One two\nthree.\n\n\nFour five.\n";
        let extraction = extract_plain_text(source);

        let texts: Vec<&str> = extraction.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["One", "two", "three.", "Four", "five."]);
        assert_eq!(extraction.boundaries.as_slice(), &[0, 3]);
        assert_eq!(extraction.paragraph_count(), 2);
        assert_eq!(extraction.words[3].paragraph_index, 1);
        assert!(extraction.words[3].is_paragraph_start);
        assert!(!extraction.words[2].is_paragraph_start);
    }

    #[test]
    fn extract_records_byte_anchors() {
        let source = "alpha beta\n\ngamma";
        let extraction = extract_plain_text(source);
        for word in &extraction.words {
            let anchor = word.source_anchor;
            assert_eq!(&source[anchor.start..anchor.end], word.text);
        }
        assert_eq!(extraction.words[2].source_anchor.start, 12);
    }

    #[test]
    fn headings_stand_alone_and_label_following_words() {
        let source = "Intro line\n# Chapter One\nBody text here\n\n## Next ##\nMore";
        let extraction = extract_plain_text(source);

        let texts: Vec<&str> = extraction.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Intro", "line", "Chapter", "One", "Body", "text", "here", "Next", "More"]
        );
        assert_eq!(extraction.boundaries.as_slice(), &[0, 2, 4, 7, 8]);
        assert_eq!(extraction.words[0].heading_context, None);
        assert_eq!(
            extraction.words[5].heading_context.as_deref(),
            Some("Chapter One")
        );
        assert_eq!(extraction.words[8].heading_context.as_deref(), Some("Next"));
    }

    #[test]
    fn hash_words_in_body_text_are_kept() {
        let source = "Press # now.\n\n#\nafter";
        let extraction = extract_plain_text(source);

        let texts: Vec<&str> = extraction.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Press", "#", "now.", "#", "after"]);
        assert_eq!(extraction.boundaries.as_slice(), &[0, 3]);
        assert_eq!(extraction.words[1].source_anchor.start, 6);
        assert!(extraction.words.iter().all(|w| w.heading_context.is_none()));
    }

    #[test]
    fn empty_source_yields_empty_extraction() {
        let extraction = extract_plain_text("\n\n  \n");
        assert_eq!(extraction.total_words(), 0);
        assert_eq!(extraction.boundaries.as_slice(), &[0]);
    }
}
