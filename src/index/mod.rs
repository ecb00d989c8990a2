//! In-process vector index with cosine similarity search
//!
//! Chunks and their embeddings live in memory behind a read-write lock and
//! are persisted as JSON under the vector database directory, one file per
//! collection. Result order is deterministic: score descending, chunk id
//! ascending on ties.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, CollectionInfo, ContentType, Document, SearchHit};

/// Filter parameters for a search
#[derive(Debug, Clone)]
pub struct SearchFilter {
    /// Maximum number of hits to return
    pub top_k: usize,
    /// Minimum similarity for a hit to qualify
    pub similarity_threshold: f32,
    /// Restrict to a single content type
    pub content_type: Option<ContentType>,
    /// Restrict to specific documents
    pub document_filter: Option<Vec<Uuid>>,
}

#[derive(Default, Serialize, Deserialize)]
struct IndexState {
    documents: HashMap<Uuid, Document>,
    chunks: Vec<Chunk>,
}

/// Vector index over chunk embeddings
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    collection_name: String,
    persist_dir: PathBuf,
    batch_size: usize,
    state: RwLock<IndexState>,
}

impl VectorIndex {
    /// Open a collection, loading any persisted state from disk
    pub fn open(
        embedder: Arc<dyn EmbeddingProvider>,
        collection_name: impl Into<String>,
        persist_dir: impl Into<PathBuf>,
        batch_size: usize,
    ) -> Result<Self> {
        let collection_name = collection_name.into();
        let persist_dir = persist_dir.into();

        let index = Self {
            embedder,
            collection_name,
            persist_dir,
            batch_size: batch_size.max(1),
            state: RwLock::new(IndexState::default()),
        };

        let path = index.persist_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let loaded: IndexState = serde_json::from_str(&content)
                .map_err(|e| Error::index(format!("Corrupt index file {}: {}", path.display(), e)))?;
            tracing::info!(
                "Loaded {} chunks from collection '{}'",
                loaded.chunks.len(),
                index.collection_name
            );
            *index.state.write() = loaded;
        }

        Ok(index)
    }

    /// On-disk location of this collection
    pub fn persist_path(&self) -> PathBuf {
        self.persist_dir
            .join(format!("{}.json", self.collection_name))
    }

    /// Add a document and its chunks, embedding any chunk that does not
    /// already carry an embedding
    pub async fn add_chunks(&self, document: Document, mut chunks: Vec<Chunk>) -> Result<usize> {
        let pending: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_empty())
            .map(|(i, _)| i)
            .collect();

        for batch in pending.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|&i| chunks[i].text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            for (&i, embedding) in batch.iter().zip(embeddings) {
                if embedding.len() != self.embedder.dimensions() {
                    tracing::warn!(
                        "Embedding for chunk {} has {} dimensions, expected {}",
                        chunks[i].id,
                        embedding.len(),
                        self.embedder.dimensions()
                    );
                }
                chunks[i].embedding = embedding;
            }
        }

        let added = chunks.len();
        {
            let mut state = self.state.write();
            state.documents.insert(document.id, document);
            state.chunks.extend(chunks);
        }
        self.save()?;
        Ok(added)
    }

    /// Embed the question and search the index
    pub async fn search(&self, question: &str, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(question).await?;
        Ok(self.search_embedding(&query, filter))
    }

    /// Search with a precomputed query embedding
    ///
    /// Ties on score break by chunk id so results are stable across runs.
    pub fn search_embedding(&self, query: &[f32], filter: &SearchFilter) -> Vec<SearchHit> {
        let state = self.state.read();

        let mut hits: Vec<SearchHit> = state
            .chunks
            .iter()
            .filter(|chunk| match filter.content_type {
                Some(ct) => chunk.content_type == ct,
                None => true,
            })
            .filter(|chunk| match &filter.document_filter {
                Some(ids) => ids.contains(&chunk.document_id),
                None => true,
            })
            .map(|chunk| {
                let similarity = cosine_similarity(query, &chunk.embedding);
                // Vectors are internal; hits go out on the wire without them
                let mut chunk = chunk.clone();
                chunk.embedding = Vec::new();
                SearchHit { similarity, chunk }
            })
            .filter(|hit| hit.similarity >= filter.similarity_threshold)
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(filter.top_k);
        hits
    }

    /// Number of chunks in the index
    pub fn len(&self) -> usize {
        self.state.read().chunks.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.state.read().chunks.is_empty()
    }

    /// All documents currently indexed
    pub fn documents(&self) -> Vec<Document> {
        let state = self.state.read();
        let mut docs: Vec<Document> = state.documents.values().cloned().collect();
        docs.sort_by(|a, b| a.paper_id.cmp(&b.paper_id));
        docs
    }

    /// Content hash per paper id, for change detection on refresh
    pub fn content_hashes(&self) -> HashMap<String, String> {
        self.state
            .read()
            .documents
            .values()
            .map(|d| (d.paper_id.clone(), d.content_hash.clone()))
            .collect()
    }

    /// Remove a paper and all of its chunks, returning the chunk count
    pub fn remove_paper(&self, paper_id: &str) -> Result<usize> {
        let removed = {
            let mut state = self.state.write();
            let doc_ids: Vec<Uuid> = state
                .documents
                .values()
                .filter(|d| d.paper_id == paper_id)
                .map(|d| d.id)
                .collect();
            if doc_ids.is_empty() {
                return Ok(0);
            }
            for id in &doc_ids {
                state.documents.remove(id);
            }
            let before = state.chunks.len();
            state.chunks.retain(|c| !doc_ids.contains(&c.document_id));
            before - state.chunks.len()
        };
        self.save()?;
        Ok(removed)
    }

    /// Chunks belonging to one document, in chunk order
    pub fn chunks_by_document(&self, document_id: Uuid) -> Vec<Chunk> {
        let state = self.state.read();
        let mut chunks: Vec<Chunk> = state
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.chunk_index);
        chunks
    }

    /// Chunks of a given content type
    pub fn chunks_by_content_type(&self, content_type: ContentType) -> Vec<Chunk> {
        self.state
            .read()
            .chunks
            .iter()
            .filter(|c| c.content_type == content_type)
            .cloned()
            .collect()
    }

    /// Collection info for the stats endpoint
    pub fn info(&self) -> CollectionInfo {
        let state = self.state.read();
        CollectionInfo {
            collection_name: self.collection_name.clone(),
            chunk_count: state.chunks.len(),
            document_count: state.documents.len(),
            embedding_model: self.embedder.name().to_string(),
            persist_path: self.persist_path().display().to_string(),
        }
    }

    /// Drop all documents and chunks and remove the persisted file
    pub fn reset(&self) -> Result<()> {
        *self.state.write() = IndexState::default();
        let path = self.persist_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        tracing::info!("Reset collection '{}'", self.collection_name);
        Ok(())
    }

    fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.persist_dir)?;
        let content = {
            let state = self.state.read();
            serde_json::to_string(&*state)?
        };
        write_atomic(&self.persist_path(), content.as_bytes())?;
        Ok(())
    }
}

/// Write via a temp file and rename so a crash never leaves a truncated index
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Cosine similarity of two vectors, 0.0 when either has zero norm or
/// the dimensions disagree
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkSource;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Deterministic embedder: one dimension per tracked keyword
    struct KeywordEmbedder;

    const KEYWORDS: [&str; 4] = ["neural", "table", "image", "training"];

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(KEYWORDS
                .iter()
                .map(|kw| lower.matches(kw).count() as f32 + 0.01)
                .collect())
        }

        fn dimensions(&self) -> usize {
            KEYWORDS.len()
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "keyword-test"
        }
    }

    fn test_index(dir: &TempDir) -> VectorIndex {
        VectorIndex::open(Arc::new(KeywordEmbedder), "test", dir.path(), 8).unwrap()
    }

    fn chunk(document_id: Uuid, text: &str, content_type: ContentType, index: u32) -> Chunk {
        let source = match content_type {
            ContentType::Text => ChunkSource::text("p1".into(), "Paper".into(), 0),
            ContentType::Table => {
                ChunkSource::table("p1".into(), "Paper".into(), 0, index.to_string())
            }
            ContentType::Image => {
                ChunkSource::image("p1".into(), "Paper".into(), 0, index.to_string())
            }
        };
        Chunk::new(document_id, text.to_string(), source, 0, text.len(), index)
    }

    fn document(paper_id: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            paper_id: paper_id.to_string(),
            source_path: format!("{}.json", paper_id),
            title: "Paper".to_string(),
            authors: vec![],
            categories: vec![],
            summary: String::new(),
            published: None,
            content_hash: "hash".to_string(),
            total_chunks: 0,
            ingested_at: chrono::Utc::now(),
            metadata: HashMap::new(),
        }
    }

    fn filter(top_k: usize) -> SearchFilter {
        SearchFilter {
            top_k,
            similarity_threshold: 0.0,
            content_type: None,
            document_filter: None,
        }
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        let sim = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn empty_index_returns_no_hits() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let hits = index.search("anything", &filter(5)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_ranks_by_similarity_and_respects_top_k() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let doc = document("p1");
        let doc_id = doc.id;

        index
            .add_chunks(
                doc,
                vec![
                    chunk(doc_id, "neural neural neural networks", ContentType::Text, 0),
                    chunk(doc_id, "training data preparation", ContentType::Text, 1),
                    chunk(doc_id, "neural training mix", ContentType::Text, 2),
                ],
            )
            .await
            .unwrap();

        let hits = index.search("neural networks", &filter(2)).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].similarity >= hits[1].similarity);
        assert!(hits[0].chunk.text.contains("neural neural neural"));
    }

    #[tokio::test]
    async fn hits_do_not_carry_embeddings() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let doc = document("p1");
        let doc_id = doc.id;

        index
            .add_chunks(doc, vec![chunk(doc_id, "neural nets", ContentType::Text, 0)])
            .await
            .unwrap();

        let hits = index.search("neural", &filter(5)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].chunk.embedding.is_empty());
        // And the serialized hit omits the field entirely
        let wire = serde_json::to_value(&hits[0]).unwrap();
        assert!(wire["chunk"].get("embedding").is_none());
        // While the stored copy keeps its vector
        assert!(!index.chunks_by_document(doc_id)[0].embedding.is_empty());
    }

    #[tokio::test]
    async fn content_type_filter_restricts_results() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let doc = document("p1");
        let doc_id = doc.id;

        index
            .add_chunks(
                doc,
                vec![
                    chunk(doc_id, "neural prose", ContentType::Text, 0),
                    chunk(doc_id, "neural table data", ContentType::Table, 1),
                    chunk(doc_id, "neural image caption", ContentType::Image, 2),
                ],
            )
            .await
            .unwrap();

        let mut f = filter(10);
        f.content_type = Some(ContentType::Table);
        let hits = index.search("neural", &f).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.content_type, ContentType::Table);

        // Direct type lookup agrees with the filtered search
        assert_eq!(index.chunks_by_content_type(ContentType::Table).len(), 1);
        assert_eq!(index.chunks_by_content_type(ContentType::Image).len(), 1);
        assert_eq!(index.chunks_by_content_type(ContentType::Text).len(), 1);
    }

    #[tokio::test]
    async fn threshold_drops_weak_hits() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let doc = document("p1");
        let doc_id = doc.id;

        index
            .add_chunks(
                doc,
                vec![
                    chunk(doc_id, "neural networks everywhere", ContentType::Text, 0),
                    chunk(doc_id, "unrelated content entirely", ContentType::Text, 1),
                ],
            )
            .await
            .unwrap();

        let mut f = filter(10);
        f.similarity_threshold = 0.9;
        let hits = index.search("neural", &f).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert!(hits[0].similarity >= 0.9);
    }

    #[tokio::test]
    async fn tied_scores_order_by_chunk_id() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let doc = document("p1");
        let doc_id = doc.id;

        // Identical text gives identical scores
        let chunks = vec![
            chunk(doc_id, "neural", ContentType::Text, 0),
            chunk(doc_id, "neural", ContentType::Text, 1),
            chunk(doc_id, "neural", ContentType::Text, 2),
        ];
        let mut expected: Vec<Uuid> = chunks.iter().map(|c| c.id).collect();
        expected.sort();

        index.add_chunks(doc, chunks).await.unwrap();

        let hits = index.search("neural", &filter(3)).await.unwrap();
        let got: Vec<Uuid> = hits.iter().map(|h| h.chunk.id).collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let doc = document("p1");
        let doc_id = doc.id;

        {
            let index = test_index(&dir);
            index
                .add_chunks(doc, vec![chunk(doc_id, "neural nets", ContentType::Text, 0)])
                .await
                .unwrap();
        }

        let reopened = test_index(&dir);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.documents().len(), 1);
        assert_eq!(
            reopened.content_hashes().get("p1").map(String::as_str),
            Some("hash")
        );
    }

    #[tokio::test]
    async fn reset_clears_state_and_file() {
        let dir = TempDir::new().unwrap();
        let index = test_index(&dir);
        let doc = document("p1");
        let doc_id = doc.id;

        index
            .add_chunks(doc, vec![chunk(doc_id, "neural", ContentType::Text, 0)])
            .await
            .unwrap();
        assert!(index.persist_path().exists());

        index.reset().unwrap();
        assert!(index.is_empty());
        assert!(!index.persist_path().exists());
    }
}
