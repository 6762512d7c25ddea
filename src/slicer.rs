/*!
 * Text slicing for token-bounded translation units.
 *
 * This module splits raw document text into slice groups that each fit a
 * configured token budget while preserving paragraph order and blank-line
 * structure, so the translated output can be reassembled verbatim.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraph boundary: a newline, optional whitespace, then another newline
static PARAGRAPH_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").unwrap()
});

/// Sentence boundary: terminal punctuation plus optional closing quotes,
/// followed by whitespace; CJK sentence enders need no trailing space
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…]["')\]»”’]*\s+|[。！？][」』”’]*"#).unwrap()
});

/// Estimate the token count of a text unit.
///
/// Counts UTF-8 bytes and treats every 4 bytes as one token. The estimate is
/// monotonic with byte length, not linguistically exact.
pub fn count_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Split text into paragraphs on blank-line boundaries.
pub fn split_into_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BOUNDARY.split(text).collect()
}

/// Split a paragraph into sentences at punctuation boundaries.
pub fn split_into_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(paragraph) {
        let sentence = paragraph[start..boundary.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = boundary.end();
    }

    let tail = paragraph[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Slice an over-budget paragraph into sentence-bounded pieces.
///
/// Sentences accumulate greedily up to `target_tokens`; a single sentence
/// that alone exceeds the budget becomes its own oversized slice, unsplit.
pub fn slice_long_paragraph(paragraph: &str, target_tokens: usize) -> Vec<String> {
    let sentences = split_into_sentences(paragraph);
    let mut slices = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for sentence in sentences {
        let sentence_len = count_tokens(&sentence);
        if sentence_len > target_tokens {
            if !current.is_empty() {
                slices.push(current.join(" "));
                current.clear();
                current_len = 0;
            }
            slices.push(sentence);
            continue;
        }

        if current_len + sentence_len > target_tokens && !current.is_empty() {
            slices.push(current.join(" "));
            current.clear();
            current_len = 0;
        }

        current.push(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        slices.push(current.join(" "));
    }

    slices
}

/// A unit of text dispatched to the model as one translation request,
/// or a structural placeholder requiring no request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceGroup {
    /// A single blank paragraph; reproduced as a blank-line pair in the output
    Empty,

    /// One sentence-bounded sub-span of a paragraph whose own token count
    /// exceeds the budget. `paragraph` identifies the originating paragraph
    /// so consecutive sibling slices can be reassembled into one block.
    LongParagraphSlice {
        /// Index of the originating paragraph in the source document
        paragraph: usize,
        /// The sub-span text
        text: String,
    },

    /// Whole paragraphs whose combined token count fits the budget;
    /// translated as one separator-joined unit and re-split afterwards
    Normal(Vec<String>),
}

impl SliceGroup {
    /// Whether this group requires a model call
    pub fn needs_translation(&self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// Text slicer that turns a document into an ordered sequence of slice groups
#[derive(Debug, Clone)]
pub struct TextSlicer {
    /// Per-unit token budget
    target_tokens: usize,
    /// Sentinel inserted between paragraphs joined into one request
    para_separator: String,
}

impl TextSlicer {
    /// Create a slicer with the given token budget and paragraph separator
    pub fn new(target_tokens: usize, para_separator: impl Into<String>) -> Self {
        Self {
            target_tokens,
            para_separator: para_separator.into(),
        }
    }

    /// The configured per-unit token budget
    pub fn target_tokens(&self) -> usize {
        self.target_tokens
    }

    /// The configured paragraph separator sentinel
    pub fn para_separator(&self) -> &str {
        &self.para_separator
    }

    /// Process a document into an ordered sequence of slice groups.
    ///
    /// Paragraphs are grouped greedily, left to right, under the token
    /// budget. A blank paragraph flushes the pending group and becomes an
    /// `Empty` group. A paragraph that alone exceeds the budget flushes the
    /// pending group and is expanded into `LongParagraphSlice` entries at
    /// sentence boundaries. Empty input produces zero groups.
    pub fn process(&self, text: &str) -> Vec<SliceGroup> {
        if text.is_empty() {
            return Vec::new();
        }

        let paragraphs = split_into_paragraphs(text);
        let mut groups = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut pending_len = 0;

        let flush = |pending: &mut Vec<String>, pending_len: &mut usize, groups: &mut Vec<SliceGroup>| {
            if !pending.is_empty() {
                groups.push(SliceGroup::Normal(std::mem::take(pending)));
                *pending_len = 0;
            }
        };

        for (index, paragraph) in paragraphs.iter().enumerate() {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                flush(&mut pending, &mut pending_len, &mut groups);
                groups.push(SliceGroup::Empty);
                continue;
            }

            let paragraph_len = count_tokens(paragraph);
            if paragraph_len > self.target_tokens {
                flush(&mut pending, &mut pending_len, &mut groups);
                for text in slice_long_paragraph(paragraph, self.target_tokens) {
                    groups.push(SliceGroup::LongParagraphSlice {
                        paragraph: index,
                        text,
                    });
                }
                continue;
            }

            if pending_len + paragraph_len > self.target_tokens && !pending.is_empty() {
                flush(&mut pending, &mut pending_len, &mut groups);
            }

            pending.push(paragraph.to_string());
            pending_len += paragraph_len;
        }

        flush(&mut pending, &mut pending_len, &mut groups);

        groups
    }

    /// Join paragraphs into one request unit with the separator sentinel
    /// on its own line between them
    pub fn join_with_separator(&self, paragraphs: &[String]) -> String {
        paragraphs.join(&format!("\n{}\n", self.para_separator))
    }

    /// Split a translated unit back into paragraphs on the separator
    /// sentinel, trimming surrounding whitespace from each piece
    pub fn split_by_separator(&self, text: &str) -> Vec<String> {
        text.split(&self.para_separator)
            .map(|piece| piece.trim().to_string())
            .collect()
    }
}
