//! End-to-end pipeline tests: corpus loading through retrieval
//!
//! Uses a deterministic in-process embedding provider so no external
//! services are needed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use openrag::config::{ChunkingConfig, RagConfig};
use openrag::corpus::{CorpusLoader, DocumentProcessor, TextSplitter};
use openrag::error::Result;
use openrag::index::{SearchFilter, VectorIndex};
use openrag::providers::EmbeddingProvider;
use openrag::types::ContentType;

/// Embeds text as normalized term-frequency over a fixed vocabulary
struct VocabEmbedder;

const VOCAB: [&str; 6] = [
    "machine",
    "learning",
    "neural",
    "supervised",
    "convolutional",
    "table",
];

#[async_trait]
impl EmbeddingProvider for VocabEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(VOCAB
            .iter()
            .map(|term| lower.matches(term).count() as f32 + 0.001)
            .collect())
    }

    fn dimensions(&self) -> usize {
        VOCAB.len()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "vocab-test"
    }
}

fn default_filter(top_k: usize) -> SearchFilter {
    SearchFilter {
        top_k,
        similarity_threshold: 0.0,
        content_type: None,
        document_filter: None,
    }
}

async fn indexed_sample_corpus(dir: &TempDir) -> VectorIndex {
    let corpus_dir = dir.path().join("corpus");
    let loader = CorpusLoader::new(&corpus_dir);
    let papers = loader.load_corpus().unwrap();
    assert!(!papers.is_empty());

    let processor = DocumentProcessor::new(&ChunkingConfig::default());
    let index = VectorIndex::open(
        Arc::new(VocabEmbedder),
        "test_papers",
        dir.path().join("vector_db"),
        16,
    )
    .unwrap();

    for (document, chunks) in processor.process_all(&papers) {
        index.add_chunks(document, chunks).await.unwrap();
    }
    index
}

#[test]
fn chunk_count_follows_size_and_overlap() {
    // Separator-free text of length L with chunk size C and overlap O
    // yields ceil((L - O) / (C - O)) chunks, each at most C long,
    // consecutive chunks sharing O characters.
    let (l, c, o) = (5000usize, 1000usize, 200usize);
    let text = "a".repeat(l);
    let spans = TextSplitter::new(c, o).split(&text);

    let expected = (l - o + (c - o) - 1) / (c - o);
    assert_eq!(spans.len(), expected);
    for span in &spans {
        assert!(span.end - span.start <= c);
    }
    for pair in spans.windows(2) {
        assert_eq!(pair[0].end - pair[1].start, o);
    }
}

#[tokio::test]
async fn retrieval_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let index = indexed_sample_corpus(&dir).await;

    let first = index
        .search("supervised machine learning", &default_filter(5))
        .await
        .unwrap();
    assert!(!first.is_empty());

    for _ in 0..3 {
        let again = index
            .search("supervised machine learning", &default_filter(5))
            .await
            .unwrap();
        let ids_first: Vec<_> = first.iter().map(|h| h.chunk.id).collect();
        let ids_again: Vec<_> = again.iter().map(|h| h.chunk.id).collect();
        assert_eq!(ids_first, ids_again);
    }
}

#[tokio::test]
async fn hits_are_sorted_by_similarity() {
    let dir = TempDir::new().unwrap();
    let index = indexed_sample_corpus(&dir).await;

    let hits = index
        .search("convolutional neural networks", &default_filter(5))
        .await
        .unwrap();
    assert!(!hits.is_empty());
    for pair in hits.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    // The CNN section should outrank the rest of the sample corpus
    assert!(hits[0].chunk.text.contains("Convolutional"));
}

#[tokio::test]
async fn content_type_filter_excludes_other_types() {
    let dir = TempDir::new().unwrap();
    let corpus_dir = dir.path().join("corpus");
    std::fs::create_dir_all(&corpus_dir).unwrap();

    // One paper with prose, a table, and an image caption
    let paper = serde_json::json!({
        "id": "mixed_001",
        "title": "Mixed Content Paper",
        "abstract": "Prose, tables, and figures.",
        "sections": [{
            "text": "Machine learning models require training data.",
            "tables": { "1": "model | accuracy\ncnn | 0.95" },
            "images": { "fig1": "Diagram of a neural network" }
        }]
    });
    std::fs::write(
        corpus_dir.join("mixed_001.json"),
        serde_json::to_string_pretty(&paper).unwrap(),
    )
    .unwrap();

    let loader = CorpusLoader::new(&corpus_dir);
    let papers = loader.load_corpus().unwrap();
    let processor = DocumentProcessor::new(&ChunkingConfig::default());
    let index = VectorIndex::open(
        Arc::new(VocabEmbedder),
        "mixed",
        dir.path().join("vector_db"),
        16,
    )
    .unwrap();
    for (document, chunks) in processor.process_all(&papers) {
        index.add_chunks(document, chunks).await.unwrap();
    }

    for content_type in [ContentType::Text, ContentType::Table, ContentType::Image] {
        let mut filter = default_filter(10);
        filter.content_type = Some(content_type);
        let hits = index.search("machine learning", &filter).await.unwrap();
        assert!(!hits.is_empty(), "no hits for {}", content_type);
        assert!(hits.iter().all(|h| h.chunk.content_type == content_type));
    }
}

#[tokio::test]
async fn empty_index_returns_no_results() {
    let dir = TempDir::new().unwrap();
    let index = VectorIndex::open(
        Arc::new(VocabEmbedder),
        "empty",
        dir.path().join("vector_db"),
        16,
    )
    .unwrap();

    let hits = index.search("anything at all", &default_filter(5)).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn document_counts_survive_reload() {
    let dir = TempDir::new().unwrap();
    let chunk_count;
    {
        let index = indexed_sample_corpus(&dir).await;
        chunk_count = index.len();
        assert!(chunk_count > 0);
    }

    let reopened = VectorIndex::open(
        Arc::new(VocabEmbedder),
        "test_papers",
        dir.path().join("vector_db"),
        16,
    )
    .unwrap();
    assert_eq!(reopened.len(), chunk_count);

    let info = reopened.info();
    assert_eq!(info.chunk_count, chunk_count);
    assert_eq!(info.document_count, 2);
    assert_eq!(info.collection_name, "test_papers");
}

#[test]
fn content_hashes_map_papers_to_hashes() {
    let dir = TempDir::new().unwrap();
    let loader = CorpusLoader::new(dir.path().join("corpus"));
    let papers = loader.load_corpus().unwrap();

    let hashes: HashMap<String, String> = papers
        .iter()
        .map(|p| (p.paper.id.clone(), p.content_hash.clone()))
        .collect();
    assert_eq!(hashes.len(), papers.len());
    // Reloading the same files gives the same hashes
    let reloaded = loader.load_corpus().unwrap();
    for paper in &reloaded {
        assert_eq!(hashes.get(&paper.paper.id), Some(&paper.content_hash));
    }
}

#[test]
fn query_defaults_come_from_config() {
    let config = RagConfig::default();
    assert_eq!(config.search.top_k, 5);
    assert!((config.search.similarity_threshold - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.chunking.chunk_size, 1000);
    assert_eq!(config.chunking.chunk_overlap, 200);
}
