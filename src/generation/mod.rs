//! Answer generation: prompt assembly and citation formatting

mod prompt;

pub use prompt::PromptBuilder;

use crate::types::{Citation, SearchHit};

/// Build citations from search hits, highlighting the query terms in
/// each snippet
pub fn citations_from_hits(hits: &[SearchHit], question: &str) -> Vec<Citation> {
    let terms: Vec<&str> = question.split_whitespace().collect();

    hits.iter()
        .map(|hit| {
            let mut citation = Citation::from_chunk(&hit.chunk, hit.similarity);
            citation.highlight_terms(&terms);
            citation
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};
    use uuid::Uuid;

    #[test]
    fn citations_carry_highlighted_terms() {
        let source = ChunkSource::text("p1".to_string(), "Paper".to_string(), 0);
        let chunk = Chunk::new(
            Uuid::new_v4(),
            "Neural networks learn representations.".to_string(),
            source,
            0,
            38,
            0,
        );
        let hits = vec![SearchHit {
            chunk,
            similarity: 0.8,
        }];

        let citations = citations_from_hits(&hits, "neural representations");
        assert_eq!(citations.len(), 1);
        assert!(citations[0].snippet_highlighted.contains("<mark>Neural</mark>"));
        assert!(citations[0]
            .snippet_highlighted
            .contains("<mark>representations</mark>"));
    }
}
