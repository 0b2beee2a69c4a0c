//! Sentence-aware chunker
//!
//! Bodies are cut into windows of at most `max_chars` characters. Inside a
//! window the cut goes to the last sentence or paragraph boundary, else to
//! the last whitespace, else hard at the window end. The next window
//! restarts up to `overlap` characters before the cut, snapped to a word
//! start.

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::chunking::{Chunk, ChunkStream, ChunkingConfig, ChunkingStrategy};
use crate::domain::knowledge::KnowledgeRow;
use crate::domain::DomainError;

/// Splits rows on sentence boundaries with overlapping windows
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    config: ChunkingConfig,
}

impl SentenceChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Lazy chunk sequence for one row
    pub fn chunks<'a>(&self, row: &'a KnowledgeRow) -> SentenceChunks<'a> {
        SentenceChunks {
            row,
            max_chars: self.config.max_chars,
            overlap: self.config.overlap,
            start: 0,
            start_char: 0,
            position: 0,
            done: false,
        }
    }
}

impl ChunkingStrategy for SentenceChunker {
    fn chunk<'a>(&self, row: &'a KnowledgeRow) -> ChunkStream<'a> {
        Box::new(self.chunks(row))
    }

    fn name(&self) -> &'static str {
        "sentence"
    }
}

/// Iterator over the chunks of one row
///
/// Cloning the iterator restarts nothing: the clone continues from the same
/// point. Call `SentenceChunker::chunks` again to start over.
#[derive(Debug, Clone)]
pub struct SentenceChunks<'a> {
    row: &'a KnowledgeRow,
    max_chars: usize,
    overlap: usize,
    /// Byte offset of the current window in the body
    start: usize,
    /// Character offset matching `start`
    start_char: usize,
    position: usize,
    done: bool,
}

impl SentenceChunks<'_> {
    /// Byte index inside `rest` where the current window is cut
    fn cut_point(rest: &str, window_end: usize) -> usize {
        let mut last_bound = None;
        for (idx, _) in rest.split_sentence_bound_indices() {
            if idx > window_end {
                break;
            }
            if idx > 0 {
                last_bound = Some(idx);
            }
        }

        if let Some(bound) = last_bound {
            return bound;
        }

        rest[..window_end]
            .char_indices()
            .filter(|(idx, c)| *idx > 0 && c.is_whitespace())
            .map(|(idx, _)| idx)
            .last()
            .unwrap_or(window_end)
    }

    /// Byte index inside `rest` where the next window starts
    ///
    /// Always past `text_begin`, so chunk offsets strictly increase.
    fn next_start(&self, rest: &str, cut: usize, text_begin: usize) -> usize {
        if self.overlap == 0 {
            return cut;
        }

        let back = rest[..cut]
            .char_indices()
            .rev()
            .nth(self.overlap - 1)
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        let at_word_start = rest[..back]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);

        let snapped = if at_word_start {
            back
        } else {
            rest[back..cut]
                .char_indices()
                .find(|(_, c)| c.is_whitespace())
                .map(|(idx, c)| back + idx + c.len_utf8())
                .unwrap_or(back)
        };

        if snapped > text_begin && snapped < cut {
            snapped
        } else {
            cut
        }
    }
}

impl Iterator for SentenceChunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let body = self.row.body.as_str();

        while !self.done {
            let rest = &body[self.start..];

            if rest.trim().is_empty() {
                self.done = true;
                break;
            }

            let window_end = rest
                .char_indices()
                .nth(self.max_chars)
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len());

            let is_last = window_end == rest.len();
            let cut = if is_last {
                rest.len()
            } else {
                Self::cut_point(rest, window_end)
            };

            let piece = &rest[..cut];
            let text_begin = piece.len() - piece.trim_start().len();
            let text = piece.trim();
            let offset = self.start_char + rest[..text_begin].chars().count();

            if is_last {
                self.done = true;
            } else {
                let next = self.next_start(rest, cut, text_begin);
                self.start_char += rest[..next].chars().count();
                self.start += next;
            }

            if text.is_empty() {
                continue;
            }

            let chunk = Chunk::new(
                self.row.id.clone(),
                self.row.title.clone(),
                text,
                self.position,
                offset,
            );
            self.position += 1;

            return Some(chunk);
        }

        None
    }
}

impl std::iter::FusedIterator for SentenceChunks<'_> {}
