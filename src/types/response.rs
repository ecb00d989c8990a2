//! Response types for retrieval and question answering

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Chunk, ContentType};

/// A single retrieval result: a chunk with its similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Similarity score (0.0-1.0, higher is more similar)
    pub similarity: f32,
}

/// Citation from a source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Chunk ID
    pub chunk_id: Uuid,
    /// Document ID
    pub document_id: Uuid,
    /// Corpus identifier of the paper
    pub paper_id: String,
    /// Paper title
    pub title: String,
    /// Section index within the paper
    pub section_index: usize,
    /// Content type of the cited chunk
    pub content_type: ContentType,
    /// Exact snippet from the source
    pub snippet: String,
    /// Snippet with highlighted query terms (<mark> tags)
    pub snippet_highlighted: String,
    /// Similarity score (0.0-1.0)
    pub similarity_score: f32,
}

impl Citation {
    /// Create a citation from a chunk and similarity score
    pub fn from_chunk(chunk: &Chunk, similarity_score: f32) -> Self {
        Self {
            chunk_id: chunk.id,
            document_id: chunk.document_id,
            paper_id: chunk.source.paper_id.clone(),
            title: chunk.source.title.clone(),
            section_index: chunk.source.section_index,
            content_type: chunk.content_type,
            snippet: chunk.text.clone(),
            snippet_highlighted: chunk.text.clone(),
            similarity_score,
        }
    }

    /// Format citation for display in text
    pub fn format_inline(&self) -> String {
        format!(
            "[Source: {}, Section {} ({})]",
            self.title, self.section_index, self.content_type
        )
    }

    /// Highlight query terms in the snippet with <mark> tags
    pub fn highlight_terms(&mut self, terms: &[&str]) {
        let mut highlighted = self.snippet.clone();
        for term in terms {
            if term.len() < 3 {
                continue; // Skip very short terms
            }
            let re = regex::RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build();
            if let Ok(re) = re {
                highlighted = re
                    .replace_all(&highlighted, |caps: &regex::Captures| {
                        format!("<mark>{}</mark>", &caps[0])
                    })
                    .to_string();
            }
        }
        self.snippet_highlighted = highlighted;
    }
}

/// Answer to a question, produced per query and not persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text
    pub text: String,
    /// Citations for the chunks that grounded the answer
    pub cited_chunks: Vec<Citation>,
    /// Model that produced the answer, if generation ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Number of chunks retrieved for context
    pub chunks_retrieved: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Raw chunks (if `include_chunks` was requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_chunks: Option<Vec<Chunk>>,
}

impl Answer {
    /// Create an answer from generated text and its citations
    pub fn new(text: String, cited_chunks: Vec<Citation>, processing_time_ms: u64) -> Self {
        let chunks_retrieved = cited_chunks.len();
        Self {
            text,
            cited_chunks,
            model: None,
            chunks_retrieved,
            processing_time_ms,
            raw_chunks: None,
        }
    }

    /// Answer used when retrieval finds nothing relevant
    pub fn not_found(processing_time_ms: u64) -> Self {
        Self {
            text: "No relevant documents found to answer your question.".to_string(),
            cited_chunks: Vec::new(),
            model: None,
            chunks_retrieved: 0,
            processing_time_ms,
            raw_chunks: None,
        }
    }
}

/// Collection information for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name
    pub collection_name: String,
    /// Number of chunks stored
    pub chunk_count: usize,
    /// Number of distinct documents
    pub document_count: usize,
    /// Embedding model in use
    pub embedding_model: String,
    /// On-disk location of the index
    pub persist_path: String,
}

/// System statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    /// Vector collection info
    pub collection: CollectionInfo,
    /// Chunking parameters in effect
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Default top-K
    pub top_k: usize,
    /// Generation model
    pub llm_model: String,
    /// Whether generation is available (API key configured)
    pub llm_configured: bool,
}
