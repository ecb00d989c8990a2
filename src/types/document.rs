//! Document and chunk types with source tracking for citations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Content type of a chunk, used for retrieval filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Prose text from a paper section or plain file
    Text,
    /// Table rendered as text
    Table,
    /// Image caption or description
    Image,
}

impl ContentType {
    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document that has been ingested into the index
///
/// Created at load time and replaced wholesale on corpus refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Corpus identifier from the source record (e.g. "sample_001")
    pub paper_id: String,
    /// Path of the source file within the corpus
    pub source_path: String,
    /// Paper title
    pub title: String,
    /// Authors
    #[serde(default)]
    pub authors: Vec<String>,
    /// Subject categories (e.g. "cs.LG")
    #[serde(default)]
    pub categories: Vec<String>,
    /// Abstract text
    #[serde(default)]
    pub summary: String,
    /// Publication date as given by the source
    #[serde(default)]
    pub published: Option<String>,
    /// Content hash for change detection across corpus refreshes
    pub content_hash: String,
    /// Total number of chunks created
    pub total_chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Source information for a chunk (used for citations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Corpus identifier of the paper
    pub paper_id: String,
    /// Paper title
    pub title: String,
    /// Section index within the paper (0-based)
    pub section_index: usize,
    /// Content type of the chunk
    pub content_type: ContentType,
    /// Table identifier (for table chunks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Image identifier (for image chunks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}

impl ChunkSource {
    /// Create source info for a text chunk
    pub fn text(paper_id: String, title: String, section_index: usize) -> Self {
        Self {
            paper_id,
            title,
            section_index,
            content_type: ContentType::Text,
            table_id: None,
            image_id: None,
        }
    }

    /// Create source info for a table chunk
    pub fn table(paper_id: String, title: String, section_index: usize, table_id: String) -> Self {
        Self {
            paper_id,
            title,
            section_index,
            content_type: ContentType::Table,
            table_id: Some(table_id),
            image_id: None,
        }
    }

    /// Create source info for an image chunk
    pub fn image(paper_id: String, title: String, section_index: usize, image_id: String) -> Self {
        Self {
            paper_id,
            title,
            section_index,
            content_type: ContentType::Image,
            table_id: None,
            image_id: Some(image_id),
        }
    }

    /// Format source for display
    pub fn format_citation(&self) -> String {
        let mut parts = vec![self.title.clone(), format!("Section {}", self.section_index)];

        if let Some(table) = &self.table_id {
            parts.push(format!("Table {}", table));
        }
        if let Some(image) = &self.image_id {
            parts.push(format!("Image {}", image));
        }

        parts.join(", ")
    }
}

/// A chunk of text from a document, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub text: String,
    /// Content type
    pub content_type: ContentType,
    /// Embedding vector, produced by the external provider and treated
    /// as opaque by this system
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    /// Source information for citations
    pub source: ChunkSource,
    /// Character offset of the chunk start within its section
    pub start_offset: usize,
    /// Character offset of the chunk end within its section
    pub end_offset: usize,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Chunk {
    /// Create a new chunk without an embedding
    pub fn new(
        document_id: Uuid,
        text: String,
        source: ChunkSource,
        start_offset: usize,
        end_offset: usize,
        chunk_index: u32,
    ) -> Self {
        let content_type = source.content_type;
        Self {
            id: Uuid::new_v4(),
            document_id,
            text,
            content_type,
            embedding: Vec::new(),
            source,
            start_offset,
            end_offset,
            chunk_index,
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_lists_title_section_and_ids() {
        let text = ChunkSource::text("p1".into(), "Attention Is All You Need".into(), 3);
        assert_eq!(text.format_citation(), "Attention Is All You Need, Section 3");

        let table = ChunkSource::table("p1".into(), "Results".into(), 5, "2".into());
        assert_eq!(table.format_citation(), "Results, Section 5, Table 2");

        let image = ChunkSource::image("p1".into(), "Results".into(), 6, "fig4".into());
        assert_eq!(image.format_citation(), "Results, Section 6, Image fig4");
    }
}
