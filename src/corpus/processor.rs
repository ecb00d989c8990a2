//! Turns loaded papers into documents and embedding-ready chunks

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, ChunkSource, Document};

use super::loader::LoadedPaper;
use super::splitter::TextSplitter;

/// Processes papers into chunks: section prose is split with overlap,
/// tables and image captions become one chunk each
pub struct DocumentProcessor {
    splitter: TextSplitter,
    min_chunk_size: usize,
}

impl DocumentProcessor {
    /// Create a processor from chunking configuration
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            splitter: TextSplitter::new(config.chunk_size, config.chunk_overlap),
            min_chunk_size: config.min_chunk_size,
        }
    }

    /// Process one loaded paper into a document record and its chunks
    pub fn process(&self, loaded: &LoadedPaper) -> (Document, Vec<Chunk>) {
        let paper = &loaded.paper;
        let document_id = Uuid::new_v4();
        let mut chunks = Vec::new();
        let mut chunk_index: u32 = 0;

        for (section_index, section) in paper.sections.iter().enumerate() {
            for span in self.splitter.split(&section.text) {
                let text = section.text[span.start..span.end].to_string();
                if text.trim().len() < self.min_chunk_size {
                    continue;
                }
                let source =
                    ChunkSource::text(paper.id.clone(), paper.title.clone(), section_index);
                chunks.push(Chunk::new(
                    document_id,
                    text,
                    source,
                    span.start,
                    span.end,
                    chunk_index,
                ));
                chunk_index += 1;
            }

            // Deterministic chunk order for the keyed table and image maps
            let mut table_ids: Vec<&String> = section.tables.keys().collect();
            table_ids.sort();
            for table_id in table_ids {
                let content = &section.tables[table_id];
                if content.trim().is_empty() {
                    continue;
                }
                let text = format!("Table {}:\n{}", table_id, content);
                let end = text.len();
                let source = ChunkSource::table(
                    paper.id.clone(),
                    paper.title.clone(),
                    section_index,
                    table_id.clone(),
                );
                chunks.push(Chunk::new(document_id, text, source, 0, end, chunk_index));
                chunk_index += 1;
            }

            let mut image_ids: Vec<&String> = section.images.keys().collect();
            image_ids.sort();
            for image_id in image_ids {
                let caption = &section.images[image_id];
                if caption.trim().is_empty() {
                    continue;
                }
                let text = format!("Image {}: {}", image_id, caption);
                let end = text.len();
                let source = ChunkSource::image(
                    paper.id.clone(),
                    paper.title.clone(),
                    section_index,
                    image_id.clone(),
                );
                chunks.push(Chunk::new(document_id, text, source, 0, end, chunk_index));
                chunk_index += 1;
            }
        }

        let document = Document {
            id: document_id,
            paper_id: paper.id.clone(),
            source_path: loaded.source_path.clone(),
            title: paper.title.clone(),
            authors: paper.authors.clone(),
            categories: paper.categories.clone(),
            summary: paper.summary.clone(),
            published: paper.published.clone(),
            content_hash: loaded.content_hash.clone(),
            total_chunks: chunks.len() as u32,
            ingested_at: Utc::now(),
            metadata: HashMap::new(),
        };

        (document, chunks)
    }

    /// Process a batch of papers
    pub fn process_all(&self, papers: &[LoadedPaper]) -> Vec<(Document, Vec<Chunk>)> {
        papers.iter().map(|p| self.process(p)).collect()
    }
}

/// Aggregate statistics over a processed corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of papers processed
    pub papers_count: usize,
    /// Total chunks across all papers
    pub total_chunks: usize,
    /// Chunk counts per content type name
    pub content_types: HashMap<String, usize>,
    /// Mean chunk length in bytes
    pub avg_chunk_length: f64,
}

impl CorpusStats {
    /// Compute statistics from processed output
    pub fn compute(processed: &[(Document, Vec<Chunk>)]) -> Self {
        let mut content_types: HashMap<String, usize> = HashMap::new();
        let mut total_chunks = 0usize;
        let mut total_length = 0usize;

        for (_, chunks) in processed {
            for chunk in chunks {
                *content_types
                    .entry(chunk.content_type.as_str().to_string())
                    .or_insert(0) += 1;
                total_length += chunk.text.len();
                total_chunks += 1;
            }
        }

        let avg_chunk_length = if total_chunks > 0 {
            total_length as f64 / total_chunks as f64
        } else {
            0.0
        };

        Self {
            papers_count: processed.len(),
            total_chunks,
            content_types,
            avg_chunk_length,
        }
    }
}
