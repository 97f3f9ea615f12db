use std::ops::Deref;

/// Byte range of a word inside the document it was extracted from.
///
/// The scheduler never inspects it; renderers use it to place highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceAnchor {
    pub start: usize,
    pub end: usize,
}

/// One displayable word, as produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub text: String,
    pub sequence_index: usize,
    pub paragraph_index: usize,
    pub is_paragraph_start: bool,
    pub source_anchor: SourceAnchor,
    pub heading_context: Option<String>,
}

impl WordRecord {
    pub fn new(text: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            text: text.into(),
            sequence_index,
            paragraph_index: 0,
            is_paragraph_start: sequence_index == 0,
            source_anchor: SourceAnchor::default(),
            heading_context: None,
        }
    }
}

/// Strictly increasing word indices, each the first word of a paragraph.
///
/// Index 0 is a boundary whether or not it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParagraphBoundaries(Vec<usize>);

impl ParagraphBoundaries {
    /// Builds the set from arbitrary indices; duplicates and ordering are fixed up.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut starts: Vec<usize> = indices.into_iter().collect();
        starts.push(0);
        starts.sort_unstable();
        starts.dedup();
        Self(starts)
    }

    pub fn is_boundary(&self, index: usize) -> bool {
        index == 0 || self.0.binary_search(&index).is_ok()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Drops boundaries that point past the end of a `word_count`-long sequence.
    pub fn truncated(mut self, word_count: usize) -> Self {
        self.0.retain(|idx| *idx == 0 || *idx < word_count);
        self
    }
}

impl Deref for ParagraphBoundaries {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// Output of an extractor: ordered words plus their paragraph starts.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub words: Vec<WordRecord>,
    pub boundaries: ParagraphBoundaries,
}

impl Extraction {
    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    pub fn paragraph_count(&self) -> usize {
        if self.words.is_empty() {
            0
        } else {
            self.boundaries.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_always_include_zero_and_are_sorted() {
        let boundaries = ParagraphBoundaries::from_indices([60, 25, 25, 100]);
        assert_eq!(boundaries.as_slice(), &[0, 25, 60, 100]);
        assert!(boundaries.is_boundary(0));
        assert!(boundaries.is_boundary(60));
        assert!(!boundaries.is_boundary(61));
    }

    #[test]
    fn truncation_keeps_zero_even_for_empty_sequence() {
        let boundaries = ParagraphBoundaries::from_indices([10, 40]).truncated(0);
        assert_eq!(boundaries.as_slice(), &[0]);
    }
}
