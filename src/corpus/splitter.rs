//! Character-budget text splitting with overlap
//!
//! Splits section text into overlapping windows of at most `chunk_size`
//! characters, preferring to break at paragraph, newline, sentence, and word
//! boundaries, in that order. Offsets are byte positions into the source
//! text, always on UTF-8 character boundaries.

/// A half-open byte span into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Text splitter with configurable size and overlap
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

/// Boundary preference, strongest first
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

impl TextSplitter {
    /// Create a new splitter
    ///
    /// The overlap is clamped to half the chunk size, so each window
    /// advances by at least `chunk_size / 2` even when a boundary cut
    /// shortens it.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(2);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size / 2),
        }
    }

    /// Split text into spans of at most `chunk_size` bytes, consecutive
    /// spans overlapping by `overlap` bytes unless a boundary cut shifted
    /// the window
    pub fn split(&self, text: &str) -> Vec<Span> {
        let len = text.len();
        let mut spans = Vec::new();

        if text.trim().is_empty() {
            return spans;
        }
        if len <= self.chunk_size {
            spans.push(Span { start: 0, end: len });
            return spans;
        }

        let mut start = 0usize;
        loop {
            let hard_end = floor_char_boundary(text, (start + self.chunk_size).min(len));

            if hard_end >= len {
                if !text[start..].trim().is_empty() {
                    spans.push(Span { start, end: len });
                }
                break;
            }

            let end = self.break_point(text, start, hard_end);
            if !text[start..end].trim().is_empty() {
                spans.push(Span { start, end });
            }

            let mut next = ceil_char_boundary(text, end.saturating_sub(self.overlap));
            if next <= start {
                // Guarantee forward progress even for degenerate overlaps
                next = end;
            }
            start = next;
        }

        spans
    }

    /// Find the best break position in `[start, hard_end]`, preferring the
    /// strongest separator in the second half of the window
    fn break_point(&self, text: &str, start: usize, hard_end: usize) -> usize {
        let floor = start + self.chunk_size / 2;
        let window = &text[start..hard_end];

        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                let cut = start + pos + sep.len();
                if cut > floor && cut <= hard_end {
                    return cut;
                }
            }
        }

        hard_end
    }
}

fn floor_char_boundary(text: &str, mut pos: usize) -> usize {
    pos = pos.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn ceil_char_boundary(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::new(100, 20);
        let spans = splitter.split("hello world");
        assert_eq!(spans, vec![Span { start: 0, end: 11 }]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        let splitter = TextSplitter::new(100, 20);
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn separator_free_text_matches_count_formula() {
        // L=100, C=30, O=10: ceil((L-O)/(C-O)) = ceil(90/20) = 5 chunks
        let text = "a".repeat(100);
        let splitter = TextSplitter::new(30, 10);
        let spans = splitter.split(&text);

        assert_eq!(spans.len(), 5);
        for span in &spans {
            assert!(span.end - span.start <= 30);
        }
        // Consecutive chunks share exactly the overlap
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 10);
        }
        assert_eq!(spans.last().unwrap().end, 100);
    }

    #[test]
    fn oversized_overlap_is_clamped_to_half_the_chunk() {
        // Overlap 600 of 1000 clamps to 500
        let text = "a".repeat(3000);
        let splitter = TextSplitter::new(1000, 600);
        let spans = splitter.split(&text);

        for pair in spans.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 500);
            assert!(pair[1].start > pair[0].start);
        }
        assert_eq!(spans.last().unwrap().end, 3000);
    }

    #[test]
    fn prefers_sentence_boundary() {
        // The ". " at byte 20 falls in the second half of the 30-byte window
        let text = "First sentence here. Second sentence continues for a while longer.";
        let splitter = TextSplitter::new(30, 5);
        let spans = splitter.split(text);

        assert_eq!(spans[0], Span { start: 0, end: 21 });
        assert!(text[spans[0].start..spans[0].end].ends_with(". "));
    }

    #[test]
    fn prefers_paragraph_boundary_over_word() {
        let text = format!("{}\n\n{}", "a".repeat(20), "b".repeat(40));
        let splitter = TextSplitter::new(30, 5);
        let spans = splitter.split(&text);

        // First chunk ends right after the paragraph break at byte 22
        assert_eq!(spans[0].end, 22);
    }

    #[test]
    fn multibyte_text_stays_on_char_boundaries() {
        let text = "é".repeat(50); // 100 bytes, 2 bytes per char
        let splitter = TextSplitter::new(33, 10);
        let spans = splitter.split(&text);

        for span in &spans {
            assert!(text.is_char_boundary(span.start));
            assert!(text.is_char_boundary(span.end));
            assert!(span.end - span.start <= 33);
        }
        assert_eq!(spans.last().unwrap().end, text.len());
    }

    #[test]
    fn split_is_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let splitter = TextSplitter::new(120, 30);
        assert_eq!(splitter.split(&text), splitter.split(&text));
    }
}
