//! Prompt templates for RAG generation

use crate::types::{ChunkSource, Citation, SearchHit};

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search results
    pub fn build_context(hits: &[SearchHit]) -> String {
        let mut context = String::new();

        for (i, hit) in hits.iter().enumerate() {
            let source_ref = Self::format_source_ref(&hit.chunk.source);

            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                source_ref,
                hit.chunk.text
            ));
        }

        context
    }

    /// Format source reference for context
    fn format_source_ref(source: &ChunkSource) -> String {
        let mut parts = vec![
            source.title.clone(),
            format!("Section {}", source.section_index),
        ];

        if let Some(table) = &source.table_id {
            parts.push(format!("Table {}", table));
        }
        if let Some(image) = &source.image_id {
            parts.push(format!("Image {}", image));
        }

        parts.push(format!("({})", source.content_type));
        parts.join(", ")
    }

    /// Build the full RAG prompt with strict grounding
    pub fn build_rag_prompt(question: &str, context: &str, citations: &[Citation]) -> String {
        format!(
            r#"You are a research assistant that ONLY uses information from provided papers.

GROUNDING RULES - FOLLOW THESE EXACTLY:
1. ONLY use information that is EXPLICITLY stated in the CONTEXT below
2. If the answer is not in the context: respond with "This information is not available in the provided documents."
3. NEVER use external knowledge, general knowledge, or training data
4. NEVER make inferences or educated guesses beyond what is explicitly stated
5. Every claim MUST have a citation in this format: [Source: title, Section X]
6. Do NOT paraphrase in ways that change meaning - stay close to the source text

RESPONSE STRUCTURE:
- Provide a clear, well-organized answer using ONLY information from the context
- Cite sources inline with each claim: [Source: title, Section X]
- If multiple sources support a point, cite all of them

CONTEXT FROM PAPERS:
{context}

AVAILABLE SOURCES:
{sources}

QUESTION: {question}

Provide a grounded answer using ONLY the paper content above:"#,
            context = context,
            sources = Self::format_sources_list(citations),
            question = question
        )
    }

    /// Format sources list for the prompt
    fn format_sources_list(citations: &[Citation]) -> String {
        citations
            .iter()
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "[{}] {}, Section {} ({})",
                    i + 1,
                    c.title,
                    c.section_index,
                    c.content_type
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};
    use uuid::Uuid;

    fn hit(text: &str, section: usize) -> SearchHit {
        let source = ChunkSource::text("p1".to_string(), "Paper One".to_string(), section);
        SearchHit {
            chunk: Chunk::new(Uuid::new_v4(), text.to_string(), source, 0, text.len(), 0),
            similarity: 0.9,
        }
    }

    #[test]
    fn context_numbers_hits_in_order() {
        let hits = vec![hit("first chunk", 0), hit("second chunk", 1)];
        let context = PromptBuilder::build_context(&hits);

        assert!(context.contains("[1] Paper One, Section 0, (text)"));
        assert!(context.contains("[2] Paper One, Section 1, (text)"));
        assert!(context.find("first chunk").unwrap() < context.find("second chunk").unwrap());
    }

    #[test]
    fn rag_prompt_includes_question_context_and_sources() {
        let hits = vec![hit("some content", 2)];
        let context = PromptBuilder::build_context(&hits);
        let citations: Vec<Citation> = hits
            .iter()
            .map(|h| Citation::from_chunk(&h.chunk, h.similarity))
            .collect();

        let prompt = PromptBuilder::build_rag_prompt("What is X?", &context, &citations);
        assert!(prompt.contains("QUESTION: What is X?"));
        assert!(prompt.contains("some content"));
        assert!(prompt.contains("[1] Paper One, Section 2 (text)"));
    }
}
