//! Query request types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::ContentType;

/// Query request for RAG search and question answering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question or search phrase
    pub question: String,

    /// Number of chunks to retrieve (default: config `search.top_k`)
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Restrict results to a single content type
    #[serde(default)]
    pub content_type: Option<ContentType>,

    /// Minimum similarity (0.0-1.0, default: config `search.similarity_threshold`)
    #[serde(default)]
    pub similarity_threshold: Option<f32>,

    /// Filter by specific document IDs
    #[serde(default)]
    pub document_filter: Option<Vec<Uuid>>,

    /// Include raw chunks in the response (default: false)
    #[serde(default)]
    pub include_chunks: bool,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            content_type: None,
            similarity_threshold: None,
            document_filter: None,
            include_chunks: false,
        }
    }

    /// Set the number of results to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Restrict to a content type
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Set the similarity threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Filter by document IDs
    pub fn with_documents(mut self, doc_ids: Vec<Uuid>) -> Self {
        self.document_filter = Some(doc_ids);
        self
    }
}
